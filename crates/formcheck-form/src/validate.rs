//! # Data Validation
//!
//! Walks a schema's attribute tree against a form's data tree and reports
//! every mismatch as a data-class [`Violation`].
//!
//! ## Algorithm
//!
//! For each attribute set (top level, then each composite value reached):
//!
//! 1. Copy the data node into a working mapping. Keys are removed from it as
//!    attributes claim them; whatever remains at the end is unknown to the
//!    schema and reported at the node's own path.
//! 2. Visit attributes in declaration order. An absent key is only a problem
//!    for a `required` attribute. A present value is coerced to the
//!    attribute's type; if that fails, nothing else is checked for that
//!    attribute.
//! 3. Apply `validators` to the whole value and `validateItems` to each
//!    element of a list, at `path[i]`.
//! 4. LOOKUP values must be item codes of their lookup config. COMPOSITE
//!    values are validated recursively against their composite's
//!    attributes, per element for lists.
//! 5. Each dependency must hold against the node's sibling values as
//!    submitted, before any key was claimed from the working mapping.
//!
//! ## Preconditions
//!
//! The config has passed [`validate_schema`](formcheck_schema::validate_schema)
//! and the form has passed [`validate_structure`](crate::form::validate_structure).
//! Use [`validate_form`](crate::service::validate_form) to get both checks
//! and the precedence between them. When the preconditions do not hold the
//! walk still terminates (recursion follows the finite data tree) but
//! unresolvable references are skipped silently.

use std::borrow::Cow;

use serde_json::{Map, Value};

use formcheck_core::{coerce, number_to_decimal, PropertyPath, TypedValue, Violation, ViolationCode};
use formcheck_schema::{Attribute, CompositeTypeConfig, Config, LookupConfig, SchemaIndex, Validator};

use crate::form::Form;

static NULL: Value = Value::Null;

/// Validate a form's data against a schema.
///
/// Returns no violations when the form has no data mapping; that case
/// belongs to [`validate_structure`](crate::form::validate_structure).
pub fn validate_data(config: &Config, form: &Form) -> Vec<Violation> {
    let Some(data) = form.data_map() else {
        return Vec::new();
    };
    let mut validator = DataValidator {
        index: SchemaIndex::new(config),
        violations: Vec::new(),
    };
    validator.validate_attributes(&config.attributes, data, &PropertyPath::root().property("data"));
    tracing::debug!(
        keys = data.len(),
        violations = validator.violations.len(),
        "form data validated"
    );
    validator.violations
}

struct DataValidator<'a> {
    index: SchemaIndex<'a>,
    violations: Vec<Violation>,
}

impl<'a> DataValidator<'a> {
    fn report(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    fn validate_attributes(
        &mut self,
        attributes: &'a [Attribute],
        node: &Map<String, Value>,
        path: &PropertyPath,
    ) {
        // `node` stays untouched and serves as the dependency snapshot.
        let mut working = node.clone();
        for attribute in attributes {
            let attribute_path = path.property(&attribute.code);
            let Some(raw) = working.remove(&attribute.code) else {
                if attribute.required {
                    self.report(Violation::new(
                        ViolationCode::DataMissingRequired,
                        &attribute_path,
                    ));
                }
                continue;
            };
            let Some(ty) = attribute.ty else {
                continue;
            };
            let value = match coerce(&raw, ty, attribute.list) {
                Ok(value) => value,
                Err(err) => {
                    tracing::trace!(path = %attribute_path, error = %err, "coercion failed");
                    self.report(
                        Violation::new(ViolationCode::DataInvalidType, &attribute_path)
                            .with_param("attribute_type", ty.as_str())
                            .with_param("value", render(&raw)),
                    );
                    continue;
                }
            };

            self.apply_validators(attribute, &value, &attribute_path);

            if let Some(lookup) = attribute.lookup_ref().and_then(|code| self.index.lookup(code)) {
                self.check_lookup(attribute, lookup, &value, &attribute_path);
            } else if let Some(composite) = attribute
                .composite_ref()
                .and_then(|code| self.index.composite(code))
            {
                self.validate_composite(attribute, composite, &value, &attribute_path);
            }

            self.check_dependencies(attribute, node, &attribute_path);
        }

        for key in working.keys() {
            self.report(Violation::new(ViolationCode::DataUnknownKey, path).with_param("key", key));
        }
    }

    fn apply_validators(&mut self, attribute: &Attribute, value: &TypedValue, path: &PropertyPath) {
        for validator in &attribute.validators {
            if !self.holds(attribute, validator, value) {
                let violation = failure(ViolationCode::DataInvalid, validator, path);
                self.report(violation);
            }
        }
        if !attribute.list {
            return;
        }
        for (i, element) in value.elements().iter().enumerate() {
            for validator in &attribute.validate_items {
                if !self.holds(attribute, validator, element) {
                    let violation = failure(ViolationCode::DataInvalidItem, validator, &path.index(i));
                    self.report(violation);
                }
            }
        }
    }

    /// Evaluate one validator, applying its field selector first.
    fn holds(&self, attribute: &Attribute, validator: &Validator, value: &TypedValue) -> bool {
        let Some(ty) = validator.ty else {
            return true;
        };
        let subject = match validator.field_ref() {
            None => Some(Cow::Borrowed(value)),
            Some(field) => attribute
                .composite_ref()
                .and_then(|code| self.select_field(code, field, value))
                .map(Cow::Owned),
        };
        subject.is_some_and(|subject| ty.evaluate(validator.value.as_ref(), &subject))
    }

    /// The member `field` of a composite value, coerced with the type of
    /// the attribute it names. Lists select element-wise.
    ///
    /// `None` when the selected member does not coerce.
    fn select_field(&self, composite_code: &str, field: &str, value: &TypedValue) -> Option<TypedValue> {
        match value {
            TypedValue::Composite(map) => {
                let target = self.index.resolve_field(composite_code, field)?;
                let ty = target.ty?;
                coerce(walk(map, field), ty, target.list).ok()
            }
            TypedValue::List(items) => items
                .iter()
                .map(|item| self.select_field(composite_code, field, item))
                .collect::<Option<Vec<_>>>()
                .map(TypedValue::List),
            _ => Some(TypedValue::Null),
        }
    }

    fn check_lookup(
        &mut self,
        attribute: &Attribute,
        lookup: &LookupConfig,
        value: &TypedValue,
        path: &PropertyPath,
    ) {
        if attribute.list {
            for (i, element) in value.elements().iter().enumerate() {
                self.check_lookup_member(lookup, element, &path.index(i));
            }
        } else {
            self.check_lookup_member(lookup, value, path);
        }
    }

    fn check_lookup_member(&mut self, lookup: &LookupConfig, value: &TypedValue, path: &PropertyPath) {
        let Some(code) = value.as_text() else {
            return;
        };
        if !lookup.contains(code) {
            self.report(
                Violation::new(ViolationCode::DataInvalidLookupValue, path)
                    .with_param("value", code)
                    .with_param("lookup_code", &lookup.code),
            );
        }
    }

    fn validate_composite(
        &mut self,
        attribute: &Attribute,
        composite: &'a CompositeTypeConfig,
        value: &TypedValue,
        path: &PropertyPath,
    ) {
        if attribute.list {
            for (i, element) in value.elements().iter().enumerate() {
                if let Some(map) = element.as_composite() {
                    self.validate_attributes(&composite.attributes, map, &path.index(i));
                }
            }
        } else if let Some(map) = value.as_composite() {
            self.validate_attributes(&composite.attributes, map, path);
        }
    }

    fn check_dependencies(
        &mut self,
        attribute: &Attribute,
        siblings: &Map<String, Value>,
        path: &PropertyPath,
    ) {
        for dependent in &attribute.dependencies {
            let current = siblings.get(&dependent.attribute_code).unwrap_or(&NULL);
            if !dependent.values.iter().any(|v| values_equal(v, current)) {
                self.report(
                    Violation::new(ViolationCode::DataUnmetDependency, path)
                        .with_param("dependee", &dependent.attribute_code),
                );
            }
        }
    }
}

fn failure(rule: ViolationCode, validator: &Validator, path: &PropertyPath) -> Violation {
    let mut violation = Violation::new(rule, path);
    if let Some(ty) = validator.ty {
        violation = violation
            .with_param("validator_type", ty.as_str())
            .with_param("condition", ty.condition(validator.value.as_ref()));
    }
    if let Some(operand) = &validator.value {
        violation = violation.with_param("operand", operand.to_string());
    }
    if let Some(field) = validator.field_ref() {
        violation = violation.with_param("field", field);
    }
    violation
}

/// Follow a dot path through nested mappings. Anything missing is null.
fn walk<'v>(map: &'v Map<String, Value>, field: &str) -> &'v Value {
    let mut segments = field.split('.');
    let Some(first) = segments.next() else {
        return &NULL;
    };
    let mut current = map.get(first).unwrap_or(&NULL);
    for segment in segments {
        current = current
            .as_object()
            .and_then(|m| m.get(segment))
            .unwrap_or(&NULL);
    }
    current
}

/// JSON equality, with numbers compared by decimal value so `1`, `1.0`
/// and `1.00` are the same dependency value.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            match (number_to_decimal(x), number_to_decimal(y)) {
                (Some(x), Some(y)) => x == y,
                _ => x == y,
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcheck_core::Type;
    use formcheck_schema::{Dependent, LookupItem, ValidatorType};
    use serde_json::json;

    fn form(data: Value) -> Form {
        Form::from_value(data)
    }

    fn pairs(violations: &[Violation]) -> Vec<(&str, &str)> {
        violations
            .iter()
            .map(|v| (v.path.as_str(), v.rule.as_str()))
            .collect()
    }

    #[test]
    fn test_missing_required() {
        let config = Config::new(vec![
            Attribute::new("a", "A", Type::String).required(),
            Attribute::new("b", "B", Type::String),
        ]);
        let violations = validate_data(&config, &form(json!({})));
        assert_eq!(pairs(&violations), vec![("data.a", "data.missing_required")]);
    }

    #[test]
    fn test_invalid_type_skips_further_checks() {
        let config = Config::new(vec![
            Attribute::new("n", "N", Type::Integer)
                .with_validator(Validator::new(ValidatorType::Min).with_value(10)),
            Attribute::new("m", "M", Type::Integer)
                .with_validator(Validator::new(ValidatorType::Min).with_value(10)),
        ]);
        let violations = validate_data(&config, &form(json!({"n": "ten", "m": 9})));
        assert_eq!(
            pairs(&violations),
            vec![("data.n", "data.invalid_type"), ("data.m", "data.invalid")]
        );
        assert_eq!(violations[0].param("attribute_type"), Some("INTEGER"));
        assert_eq!(violations[0].param("value"), Some("ten"));
        assert_eq!(violations[1].param("condition"), Some(">=10"));
        assert_eq!(violations[1].param("operand"), Some("10"));
    }

    #[test]
    fn test_invalid_type_still_consumes_key() {
        let config = Config::new(vec![Attribute::new("n", "N", Type::Integer)]);
        let violations = validate_data(&config, &form(json!({"n": [1]})));
        assert_eq!(pairs(&violations), vec![("data.n", "data.invalid_type")]);
    }

    #[test]
    fn test_null_value_skips_lookup_membership() {
        let config = Config::new(vec![
            Attribute::new("l", "L", Type::Lookup).with_lookup_code("colours"),
        ])
        .with_lookup_config(LookupConfig::new("colours", vec![LookupItem::new("red", "Red")]));
        assert!(validate_data(&config, &form(json!({"l": null}))).is_empty());
    }

    #[test]
    fn test_field_selector_on_composite() {
        let config = Config::new(vec![Attribute::new("p", "P", Type::Composite)
            .with_composite_code("person")
            .with_validator(
                Validator::new(ValidatorType::Min)
                    .with_value(18)
                    .with_field("age"),
            )])
        .with_composite_type_config(formcheck_schema::CompositeTypeConfig::new(
            "person",
            vec![Attribute::new("age", "Age", Type::Integer)],
        ));
        assert!(validate_data(&config, &form(json!({"p": {"age": "21"}}))).is_empty());

        let violations = validate_data(&config, &form(json!({"p": {"age": 12}})));
        assert_eq!(pairs(&violations), vec![("data.p", "data.invalid")]);
        assert_eq!(violations[0].param("field"), Some("age"));
    }

    #[test]
    fn test_field_selector_missing_member_is_null() {
        let config = Config::new(vec![Attribute::new("p", "P", Type::Composite)
            .with_composite_code("person")
            .with_validator(Validator::new(ValidatorType::NotNull).with_field("name"))])
        .with_composite_type_config(formcheck_schema::CompositeTypeConfig::new(
            "person",
            vec![Attribute::new("name", "Name", Type::String)],
        ));
        let violations = validate_data(&config, &form(json!({"p": {}})));
        assert_eq!(pairs(&violations), vec![("data.p", "data.invalid")]);
    }

    #[test]
    fn test_dependency_reads_submitted_sibling_data() {
        let config = Config::new(vec![
            Attribute::new("c2", "C2", Type::String)
                .with_dependency(Dependent::new("c1", vec![json!(1)])),
            Attribute::new("c1", "C1", Type::Integer),
        ]);
        assert!(validate_data(&config, &form(json!({"c1": 1.0, "c2": "x"}))).is_empty());
        let violations = validate_data(&config, &form(json!({"c1": 2, "c2": "x"})));
        assert_eq!(pairs(&violations), vec![("data.c2", "data.unmet_dependency")]);
        assert_eq!(violations[0].param("dependee"), Some("c1"));
    }

    #[test]
    fn test_dependency_on_absent_dependee() {
        let config = Config::new(vec![
            Attribute::new("c1", "C1", Type::Boolean),
            Attribute::new("c2", "C2", Type::String)
                .with_dependency(Dependent::new("c1", vec![json!(true)])),
        ]);
        let violations = validate_data(&config, &form(json!({"c2": "x"})));
        assert_eq!(pairs(&violations), vec![("data.c2", "data.unmet_dependency")]);
        assert!(validate_data(&config, &form(json!({"c1": true}))).is_empty());
    }

    #[test]
    fn test_dependency_inside_composite_reads_its_siblings() {
        let config = Config::new(vec![
            Attribute::new("c1", "C1", Type::Boolean),
            Attribute::new("p", "P", Type::Composite).with_composite_code("person"),
        ])
        .with_composite_type_config(CompositeTypeConfig::new(
            "person",
            vec![
                Attribute::new("c1", "C1", Type::Boolean),
                Attribute::new("c2", "C2", Type::String)
                    .with_dependency(Dependent::new("c1", vec![json!(true)])),
            ],
        ));
        let satisfied = json!({"c1": false, "p": {"c1": true, "c2": "x"}});
        assert!(validate_data(&config, &form(satisfied)).is_empty());

        let unmet = json!({"c1": true, "p": {"c1": false, "c2": "x"}});
        let violations = validate_data(&config, &form(unmet));
        assert_eq!(pairs(&violations), vec![("data.p.c2", "data.unmet_dependency")]);
    }

    #[test]
    fn test_no_data_mapping_yields_nothing() {
        let config = Config::new(vec![Attribute::new("a", "A", Type::String).required()]);
        assert!(validate_data(&config, &Form::default()).is_empty());
    }

    #[test]
    fn test_values_equal() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(values_equal(&json!([1, "a"]), &json!([1.0, "a"])));
        assert!(values_equal(&json!({"k": 2}), &json!({"k": 2.00})));
        assert!(!values_equal(&json!("1"), &json!(1)));
        assert!(!values_equal(&json!(true), &json!("true")));
        assert!(values_equal(&json!(null), &json!(null)));
    }

    #[test]
    fn test_walk() {
        let data = json!({"a": {"b": {"c": 3}}, "x": 1});
        let map = data.as_object().unwrap();
        assert_eq!(walk(map, "a.b.c"), &json!(3));
        assert_eq!(walk(map, "x"), &json!(1));
        assert_eq!(walk(map, "x.y"), &Value::Null);
        assert_eq!(walk(map, "missing"), &Value::Null);
    }
}
