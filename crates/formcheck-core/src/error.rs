//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared by the formcheck crates. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Problems in user data or in a schema are never errors: they are
//!   accumulated as [`Violation`](crate::violation::Violation)s.
//! - Errors are reserved for inputs the engine itself cannot work with
//!   (unparsable identifiers, unreadable documents) and fail loudly.
//! - [`CoercionError`] is the one recoverable error: validators turn it
//!   into a violation at the offending path.

use serde_json::Value;
use thiserror::Error;

use crate::types::Type;

/// Top-level error type for formcheck.
#[derive(Error, Debug)]
pub enum FormcheckError {
    /// A type name did not match any known [`Type`].
    #[error("unknown attribute type: {0:?}")]
    UnknownType(String),

    /// A rule name did not match any entry of the rule catalog.
    #[error("unknown validator type: {0:?}")]
    UnknownValidatorType(String),
}

/// A value could not be converted into the canonical representation of a type.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{} is not coercible to type '{target}'{}", render_value(.value), render_index(.index))]
pub struct CoercionError {
    /// The offending input value (the element, for list coercion).
    pub value: Value,
    /// The type the value was being coerced into.
    pub target: Type,
    /// Position of the failing element when coercing a list.
    pub index: Option<usize>,
}

impl CoercionError {
    /// Create an error for a single (non-list) value.
    pub fn new(value: &Value, target: Type) -> Self {
        Self {
            value: value.clone(),
            target,
            index: None,
        }
    }

    /// Attach the list position of the failing element.
    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

fn render_index(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" (list element {i})"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coercion_error_display() {
        let err = CoercionError::new(&json!("one"), Type::Integer);
        assert_eq!(err.to_string(), "\"one\" is not coercible to type 'INTEGER'");
    }

    #[test]
    fn test_coercion_error_display_with_index() {
        let err = CoercionError::new(&json!({"k": 1}), Type::String).at_index(2);
        let display = err.to_string();
        assert!(display.contains("STRING"));
        assert!(display.contains("list element 2"));
    }

    #[test]
    fn test_unknown_name_display() {
        let err = FormcheckError::UnknownType("TEXT".into());
        assert_eq!(err.to_string(), "unknown attribute type: \"TEXT\"");
    }
}
