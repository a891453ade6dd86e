//! # Violations — The Reporting Contract
//!
//! Every failed check, whether in a schema or in a form, is reported as a
//! [`Violation`]: a `(path, rule, parameters)` triple.
//!
//! - `path` addresses the offending node (`data.code[1]`,
//!   `attributes[0].lookupCode`).
//! - `rule` is a stable, machine-readable [`ViolationCode`]. It is not a
//!   user-facing message; rendering and localization belong to the caller.
//! - `parameters` carries interpolation values (the failing operand, the
//!   offending raw value, the referenced code).
//!
//! Violations are accumulated, never thrown. Their order is the traversal
//! order of the validator that produced them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::path::PropertyPath;

/// The two disjoint classes of violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationClass {
    /// The schema is self-inconsistent. An authoring-time error.
    Schema,
    /// The form does not satisfy the schema. Correctable by the end user.
    Data,
}

/// Stable identifiers of every check the engine performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationCode {
    /// A required text field of the schema is blank.
    SchemaBlank,
    /// A required field of the schema is absent.
    SchemaMissing,
    /// A collection of the schema that must be non-empty is empty.
    SchemaEmpty,
    /// Two siblings in the schema share a code.
    SchemaDuplicateCode,
    /// LOOKUP attribute without `lookupCode`.
    AttributeNoLookupCode,
    /// `lookupCode` set on an attribute whose type does not extend LOOKUP.
    AttributeNotLookupType,
    /// COMPOSITE attribute without `compositeCode`.
    AttributeNoCompositeCode,
    /// `compositeCode` set on an attribute whose type does not extend COMPOSITE.
    AttributeNotCompositeType,
    /// `validateItems` declared on an attribute that is not a list.
    AttributeValidateItemsNotList,
    /// Validator `field` set on a non-composite attribute.
    AttributeValidatorFieldNotComposite,
    /// Item validator `field` set on a non-composite attribute.
    AttributeValidateItemFieldNotComposite,
    /// `defaultValue` does not coerce to the attribute's type.
    AttributeInvalidDefaultValue,
    /// Comparison or size rule without an operand.
    ValidatorNoValue,
    /// Operand supplied to a rule that takes none.
    ValidatorValueSet,
    /// `lookupCode` does not name a declared lookup config.
    ConfigUnknownLookupCode,
    /// `compositeCode` does not name a declared composite type config.
    ConfigUnknownCompositeCode,
    /// Validator `field` does not resolve within the composite.
    ConfigUnknownValidatorField,
    /// Item validator `field` does not resolve within the composite.
    ConfigUnknownValidateItemField,
    /// Dependency on an attribute code that is not a top-level attribute.
    ConfigInvalidDependentReference,
    /// Lookup config declared but never referenced.
    ConfigLookupConfigUnused,
    /// Composite type config declared but never referenced.
    ConfigCompositeTypeConfigUnused,
    /// Composite type configs reference each other in a cycle.
    ConfigCyclicComposite,
    /// The form carries no data mapping.
    FormDataMissing,
    /// The form's data is not a mapping.
    FormDataNotMapping,
    /// Required attribute absent from the data.
    DataMissingRequired,
    /// Value not coercible to the attribute's type.
    DataInvalidType,
    /// Value is not a code of the referenced lookup config.
    DataInvalidLookupValue,
    /// Whole value rejected by a validator.
    DataInvalid,
    /// List element rejected by an item validator.
    DataInvalidItem,
    /// Attribute supplied while its dependency is not met.
    DataUnmetDependency,
    /// Data key that no attribute of the schema declares.
    DataUnknownKey,
}

impl ViolationCode {
    /// Returns all codes, schema codes first.
    pub fn all() -> &'static [ViolationCode] {
        &[
            Self::SchemaBlank,
            Self::SchemaMissing,
            Self::SchemaEmpty,
            Self::SchemaDuplicateCode,
            Self::AttributeNoLookupCode,
            Self::AttributeNotLookupType,
            Self::AttributeNoCompositeCode,
            Self::AttributeNotCompositeType,
            Self::AttributeValidateItemsNotList,
            Self::AttributeValidatorFieldNotComposite,
            Self::AttributeValidateItemFieldNotComposite,
            Self::AttributeInvalidDefaultValue,
            Self::ValidatorNoValue,
            Self::ValidatorValueSet,
            Self::ConfigUnknownLookupCode,
            Self::ConfigUnknownCompositeCode,
            Self::ConfigUnknownValidatorField,
            Self::ConfigUnknownValidateItemField,
            Self::ConfigInvalidDependentReference,
            Self::ConfigLookupConfigUnused,
            Self::ConfigCompositeTypeConfigUnused,
            Self::ConfigCyclicComposite,
            Self::FormDataMissing,
            Self::FormDataNotMapping,
            Self::DataMissingRequired,
            Self::DataInvalidType,
            Self::DataInvalidLookupValue,
            Self::DataInvalid,
            Self::DataInvalidItem,
            Self::DataUnmetDependency,
            Self::DataUnknownKey,
        ]
    }

    /// The stable rule identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SchemaBlank => "schema.blank",
            Self::SchemaMissing => "schema.missing",
            Self::SchemaEmpty => "schema.empty",
            Self::SchemaDuplicateCode => "schema.duplicate_code",
            Self::AttributeNoLookupCode => "attribute.no_lookup_code",
            Self::AttributeNotLookupType => "attribute.not_lookup_type",
            Self::AttributeNoCompositeCode => "attribute.no_composite_code",
            Self::AttributeNotCompositeType => "attribute.not_composite_type",
            Self::AttributeValidateItemsNotList => "attribute.validate_items_not_list",
            Self::AttributeValidatorFieldNotComposite => "attribute.validator_field_not_composite",
            Self::AttributeValidateItemFieldNotComposite => {
                "attribute.validate_item_field_not_composite"
            }
            Self::AttributeInvalidDefaultValue => "attribute.invalid_default_value",
            Self::ValidatorNoValue => "validator.no_value",
            Self::ValidatorValueSet => "validator.value_set",
            Self::ConfigUnknownLookupCode => "config.unknown_lookup_code",
            Self::ConfigUnknownCompositeCode => "config.unknown_composite_code",
            Self::ConfigUnknownValidatorField => "config.unknown_validator_field",
            Self::ConfigUnknownValidateItemField => "config.unknown_validate_item_field",
            Self::ConfigInvalidDependentReference => "config.invalid_dependent_reference",
            Self::ConfigLookupConfigUnused => "config.lookup_config_unused",
            Self::ConfigCompositeTypeConfigUnused => "config.composite_type_config_unused",
            Self::ConfigCyclicComposite => "config.cyclic_composite",
            Self::FormDataMissing => "form.data_missing",
            Self::FormDataNotMapping => "form.data_not_mapping",
            Self::DataMissingRequired => "data.missing_required",
            Self::DataInvalidType => "data.invalid_type",
            Self::DataInvalidLookupValue => "data.invalid_lookup_value",
            Self::DataInvalid => "data.invalid",
            Self::DataInvalidItem => "data.invalid_item",
            Self::DataUnmetDependency => "data.unmet_dependency",
            Self::DataUnknownKey => "data.unknown_key",
        }
    }

    /// The class a violation with this code belongs to.
    pub fn class(&self) -> ViolationClass {
        match self {
            Self::FormDataMissing
            | Self::FormDataNotMapping
            | Self::DataMissingRequired
            | Self::DataInvalidType
            | Self::DataInvalidLookupValue
            | Self::DataInvalid
            | Self::DataInvalidItem
            | Self::DataUnmetDependency
            | Self::DataUnknownKey => ViolationClass::Data,
            _ => ViolationClass::Schema,
        }
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ViolationCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Which class of check failed.
    pub class: ViolationClass,
    /// Rendered path of the offending node.
    pub path: String,
    /// Stable rule identifier.
    pub rule: ViolationCode,
    /// Interpolation values for message rendering.
    pub parameters: BTreeMap<String, String>,
}

impl Violation {
    /// Create a violation of `rule` at `path` with no parameters.
    pub fn new(rule: ViolationCode, path: &PropertyPath) -> Self {
        Self {
            class: rule.class(),
            path: path.to_string(),
            rule,
            parameters: BTreeMap::new(),
        }
    }

    /// Add an interpolation parameter.
    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }

    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "  (root): {}", self.rule)?;
        } else {
            write!(f, "  {}: {}", self.path, self.rule)?;
        }
        if !self.parameters.is_empty() {
            let rendered: Vec<String> = self
                .parameters
                .iter()
                .map(|(k, v)| format!("{k}={v:?}"))
                .collect();
            write!(f, " ({})", rendered.join(", "))?;
        }
        Ok(())
    }
}

/// Collection of violations produced by one validation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ViolationReport {
    violations: Vec<Violation>,
}

impl ViolationReport {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Number of violations of the given class.
    pub fn count_class(&self, class: ViolationClass) -> usize {
        self.violations.iter().filter(|v| v.class == class).count()
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl From<Vec<Violation>> for ViolationReport {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl fmt::Display for ViolationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_unique() {
        let mut seen = std::collections::HashSet::new();
        for code in ViolationCode::all() {
            assert!(seen.insert(code.as_str()), "duplicate rule id: {code}");
        }
    }

    #[test]
    fn test_code_classes() {
        assert_eq!(ViolationCode::DataUnknownKey.class(), ViolationClass::Data);
        assert_eq!(ViolationCode::FormDataMissing.class(), ViolationClass::Data);
        assert_eq!(ViolationCode::ConfigCyclicComposite.class(), ViolationClass::Schema);
        assert_eq!(ViolationCode::ValidatorNoValue.class(), ViolationClass::Schema);
    }

    #[test]
    fn test_rule_ids_prefixed_by_class() {
        for code in ViolationCode::all() {
            let id = code.as_str();
            match code.class() {
                ViolationClass::Data => {
                    assert!(id.starts_with("data.") || id.starts_with("form."), "{id}")
                }
                ViolationClass::Schema => {
                    assert!(!id.starts_with("data.") && !id.starts_with("form."), "{id}")
                }
            }
        }
    }

    #[test]
    fn test_violation_carries_path_and_params() {
        let path = PropertyPath::root().property("data").property("code").index(1);
        let v = Violation::new(ViolationCode::DataInvalidItem, &path)
            .with_param("validator_type", "Max")
            .with_param("operand", "5");
        assert_eq!(v.path, "data.code[1]");
        assert_eq!(v.class, ViolationClass::Data);
        assert_eq!(v.param("operand"), Some("5"));
        assert_eq!(v.param("missing"), None);
    }

    #[test]
    fn test_violation_display_format() {
        let path = PropertyPath::root().property("data");
        let v = Violation::new(ViolationCode::DataUnknownKey, &path).with_param("key", "unknown");
        let display = v.to_string();
        assert!(display.contains("data: data.unknown_key"));
        assert!(display.contains("key=\"unknown\""));
    }

    #[test]
    fn test_violation_display_root() {
        let v = Violation::new(ViolationCode::SchemaEmpty, &PropertyPath::root());
        assert!(v.to_string().contains("(root)"));
    }

    #[test]
    fn test_violation_serializes_rule_as_string() {
        let path = PropertyPath::root().property("data").property("c2");
        let v = Violation::new(ViolationCode::DataUnmetDependency, &path).with_param("dependee", "c1");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["class"], "data");
        assert_eq!(json["path"], "data.c2");
        assert_eq!(json["rule"], "data.unmet_dependency");
        assert_eq!(json["parameters"]["dependee"], "c1");
    }

    #[test]
    fn test_report_counts() {
        let report = ViolationReport::from(vec![
            Violation::new(ViolationCode::SchemaBlank, &PropertyPath::root().property("code")),
            Violation::new(ViolationCode::DataInvalid, &PropertyPath::root().property("data")),
        ]);
        assert_eq!(report.len(), 2);
        assert_eq!(report.count_class(ViolationClass::Schema), 1);
        assert_eq!(report.count_class(ViolationClass::Data), 1);
        assert_eq!(report.to_string().lines().count(), 2);
    }
}
