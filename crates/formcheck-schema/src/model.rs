//! # Schema Model
//!
//! The declarative schema a form is validated against. A [`Config`] owns
//! three collections:
//!
//! - `lookupConfigs`: closed sets of permissible codes for LOOKUP attributes,
//! - `compositeTypeConfigs`: reusable nested attribute groups for COMPOSITE
//!   attributes,
//! - `attributes`: the ordered top-level fields of the form.
//!
//! Attributes reference lookups and composites by code, and may depend on
//! other top-level attributes. None of these references are checked on
//! deserialization; [`validate_schema`](crate::validate::validate_schema)
//! reports every inconsistency at once.
//!
//! ## Serialization
//!
//! Field names are camelCase. Every collection defaults to empty and every
//! text field to `""`, so that an incomplete document still loads and its
//! gaps surface as violations rather than as a parse failure. Validator
//! operands are read from JSON numbers or numeric strings without passing
//! through binary floating point, and written back as strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use bigdecimal::BigDecimal;
use formcheck_core::Type;

use crate::rules::ValidatorType;

/// The complete schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Lookup configs referenced by LOOKUP attributes.
    #[serde(default)]
    pub lookup_configs: Vec<LookupConfig>,
    /// Composite type configs referenced by COMPOSITE attributes.
    #[serde(default)]
    pub composite_type_configs: Vec<CompositeTypeConfig>,
    /// Top-level attributes, in declaration order.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl Config {
    /// A config with the given top-level attributes and no lookups or composites.
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self {
            attributes,
            ..Self::default()
        }
    }

    pub fn with_lookup_config(mut self, lookup: LookupConfig) -> Self {
        self.lookup_configs.push(lookup);
        self
    }

    pub fn with_composite_type_config(mut self, composite: CompositeTypeConfig) -> Self {
        self.composite_type_configs.push(composite);
        self
    }
}

/// A named, typed field definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    /// Key of the attribute in form data. Unique within its attribute set.
    #[serde(default)]
    pub code: String,
    /// Human-readable question or ask.
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// Declared type. Unset is a schema violation, never a parse error.
    #[serde(rename = "type", default)]
    pub ty: Option<Type>,
    /// Lookup config reference; required iff `ty` extends LOOKUP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_code: Option<String>,
    /// Composite config reference; required iff `ty` extends COMPOSITE.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite_code: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// The value is a sequence of `ty`.
    #[serde(default)]
    pub list: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Rules applied to the whole value.
    #[serde(default)]
    pub validators: Vec<Validator>,
    /// Rules applied to each element of a list value.
    #[serde(default)]
    pub validate_items: Vec<Validator>,
    /// Conditions under which the attribute may be supplied.
    #[serde(default)]
    pub dependencies: Vec<Dependent>,
}

impl Attribute {
    pub fn new(code: impl Into<String>, label: impl Into<String>, ty: Type) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            ty: Some(ty),
            ..Self::default()
        }
    }

    pub fn with_lookup_code(mut self, code: impl Into<String>) -> Self {
        self.lookup_code = Some(code.into());
        self
    }

    pub fn with_composite_code(mut self, code: impl Into<String>) -> Self {
        self.composite_code = Some(code.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn list(mut self) -> Self {
        self.list = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_item_validator(mut self, validator: Validator) -> Self {
        self.validate_items.push(validator);
        self
    }

    pub fn with_dependency(mut self, dependent: Dependent) -> Self {
        self.dependencies.push(dependent);
        self
    }

    /// The lookup code, if set to something other than blank.
    pub fn lookup_ref(&self) -> Option<&str> {
        non_blank(self.lookup_code.as_deref())
    }

    /// The composite code, if set to something other than blank.
    pub fn composite_ref(&self) -> Option<&str> {
        non_blank(self.composite_code.as_deref())
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

/// One rule applied to an attribute value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
    #[serde(rename = "type", default)]
    pub ty: Option<ValidatorType>,
    /// Comparison operand of numeric and size rules.
    #[serde(default, with = "operand", skip_serializing_if = "Option::is_none")]
    pub value: Option<BigDecimal>,
    /// Dot path selecting a member of a composite value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Validator {
    pub fn new(ty: ValidatorType) -> Self {
        Self {
            ty: Some(ty),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<BigDecimal>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// The field selector, if set to something other than blank.
    pub fn field_ref(&self) -> Option<&str> {
        non_blank(self.field.as_deref())
    }
}

/// Makes an attribute active only while another top-level attribute holds
/// one of `values`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependent {
    /// Code of the top-level attribute depended on.
    #[serde(default)]
    pub attribute_code: String,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl Dependent {
    pub fn new(attribute_code: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            attribute_code: attribute_code.into(),
            values,
        }
    }
}

/// A closed set of codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupConfig {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub lookup_items: Vec<LookupItem>,
}

impl LookupConfig {
    pub fn new(code: impl Into<String>, lookup_items: Vec<LookupItem>) -> Self {
        Self {
            code: code.into(),
            lookup_items,
        }
    }

    /// Whether `code` is one of this lookup's item codes.
    pub fn contains(&self, code: &str) -> bool {
        self.lookup_items.iter().any(|item| item.code == code)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupItem {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub label: String,
}

impl LookupItem {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

/// A reusable nested attribute group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeTypeConfig {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl CompositeTypeConfig {
    pub fn new(code: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            code: code.into(),
            attributes,
        }
    }
}

/// Serde adapter for validator operands.
mod operand {
    use bigdecimal::BigDecimal;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    use formcheck_core::{number_to_decimal, parse_decimal};

    pub fn serialize<S: Serializer>(
        value: &Option<BigDecimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<BigDecimal>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::Number(n) => number_to_decimal(&n)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid operand: {n}"))),
            Value::String(s) => parse_decimal(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid operand {s:?}"))),
            other => Err(D::Error::custom(format!(
                "operand must be a number, got {other}"
            ))),
        }
    }
}
