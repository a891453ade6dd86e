//! # Typed Values
//!
//! `TypedValue` is the result of coercing an untyped input into the
//! canonical representation of a [`Type`](crate::types::Type). Rules in the
//! validator catalog are evaluated against typed values, never against raw
//! JSON, so that `"10"`, `10` and `10.0` compare identically for a DECIMAL
//! attribute.

use bigdecimal::BigDecimal;
use chrono::{DateTime, SecondsFormat, Utc};
use num_bigint::BigInt;
use serde_json::{Map, Value};

/// A value in the canonical representation of its attribute type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// Explicit `null` in the input.
    Null,
    /// STRING, URL and LOOKUP values.
    Text(String),
    /// DATE values, normalized to UTC.
    Date(DateTime<Utc>),
    /// DECIMAL and PERCENTAGE values.
    Decimal(BigDecimal),
    /// INTEGER values.
    Integer(BigInt),
    /// BOOLEAN values.
    Boolean(bool),
    /// COMPOSITE values. Members stay untyped until the nested schema is applied.
    Composite(Map<String, Value>),
    /// Any type with `list = true`.
    List(Vec<TypedValue>),
}

impl TypedValue {
    /// Returns `true` for [`TypedValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The value as a decimal, for numeric comparison rules.
    ///
    /// Integers are widened losslessly; every other shape yields `None`.
    pub fn as_decimal(&self) -> Option<BigDecimal> {
        match self {
            Self::Decimal(d) => Some(d.clone()),
            Self::Integer(i) => Some(BigDecimal::new(i.clone(), 0)),
            _ => None,
        }
    }

    /// The value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The members of a composite value.
    pub fn as_composite(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Composite(map) => Some(map),
            _ => None,
        }
    }

    /// The elements of a list value; empty for every other shape.
    pub fn elements(&self) -> &[TypedValue] {
        match self {
            Self::List(items) => items,
            _ => &[],
        }
    }

    /// Size for the size rules: characters of text, elements of a list,
    /// keys of a composite. Other shapes have no size.
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Text(s) => Some(s.chars().count()),
            Self::List(items) => Some(items.len()),
            Self::Composite(map) => Some(map.len()),
            _ => None,
        }
    }

    /// Emptiness as understood by the `NotEmpty` rule: null, empty text,
    /// empty list and empty composite are empty; scalars never are.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Composite(map) => map.is_empty(),
            Self::Date(_) | Self::Decimal(_) | Self::Integer(_) | Self::Boolean(_) => false,
        }
    }

    /// Convert back into an untyped JSON value.
    ///
    /// Numbers are emitted as strings to keep their full precision.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Text(s) => Value::String(s.clone()),
            Self::Date(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::Decimal(d) => Value::String(d.to_string()),
            Self::Integer(i) => Value::String(i.to_string()),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Composite(map) => Value::Object(map.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

impl std::fmt::Display for TypedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Text(s) => f.write_str(s),
            Self::Date(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Composite(map) => write!(f, "{}", Value::Object(map.clone())),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}
