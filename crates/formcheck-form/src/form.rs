//! The form document: a mapping from attribute code to untyped value.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use formcheck_core::{PropertyPath, Violation, ViolationCode};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Form {
    /// The data under validation. Must be a mapping.
    #[serde(default)]
    pub data: Option<Value>,
}

impl Form {
    pub fn new(data: Map<String, Value>) -> Self {
        Self {
            data: Some(Value::Object(data)),
        }
    }

    /// Build a form from any JSON value, mapping or not.
    pub fn from_value(data: Value) -> Self {
        Self { data: Some(data) }
    }

    /// The data mapping, if the form has one.
    pub fn data_map(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref().and_then(Value::as_object)
    }
}

/// Structural checks on the form itself, independent of any schema.
///
/// An empty mapping is a valid form.
pub fn validate_structure(form: &Form) -> Vec<Violation> {
    let path = PropertyPath::root().property("data");
    match &form.data {
        None | Some(Value::Null) => vec![Violation::new(ViolationCode::FormDataMissing, &path)],
        Some(Value::Object(_)) => Vec::new(),
        Some(other) => vec![Violation::new(ViolationCode::FormDataNotMapping, &path)
            .with_param("value", other.to_string())],
    }
}
