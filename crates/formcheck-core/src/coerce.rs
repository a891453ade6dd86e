//! # Value Coercion
//!
//! Converts untyped input (JSON values as supplied in a form or as a schema
//! default) into the canonical representation of a [`Type`].
//!
//! Conversions are permissive in the conventional way: numeric-looking
//! strings become numbers, any scalar becomes text, ISO-8601 strings become
//! dates. Shapes that have no sensible conversion (a mapping into STRING, a
//! fraction into INTEGER) fail with a [`CoercionError`] naming the value and
//! the target type.
//!
//! `null` coerces to [`TypedValue::Null`] for every type; whether null is
//! acceptable is decided by the `NotNull`/`NotEmpty` rules, not here.
//!
//! Decimal literals are bounded: a power-of-ten exponent beyond
//! [`MAX_DECIMAL_EXPONENT`] in either direction is not a number. `1e200000000`
//! would otherwise expand into two hundred million digits on the first
//! rescale or comparison.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use num_bigint::BigInt;
use serde_json::{Number, Value};

use crate::error::CoercionError;
use crate::types::Type;
use crate::value::TypedValue;

/// Largest power-of-ten exponent, positive or negative, a decimal may carry.
pub const MAX_DECIMAL_EXPONENT: u64 = 4096;

/// Coerce `value` into the canonical representation of `ty`.
///
/// With `as_list`, the input must be a sequence and every element is coerced
/// individually; the first failing element fails the whole operation and the
/// error carries its index.
///
/// # Errors
///
/// Returns [`CoercionError`] if the value (or any list element) cannot be
/// represented as `ty`.
pub fn coerce(value: &Value, ty: Type, as_list: bool) -> Result<TypedValue, CoercionError> {
    if value.is_null() {
        return Ok(TypedValue::Null);
    }
    if !as_list {
        return coerce_scalar(value, ty);
    }
    let items = value
        .as_array()
        .ok_or_else(|| CoercionError::new(value, ty))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| coerce_scalar(item, ty).map_err(|e| e.at_index(i)))
        .collect::<Result<Vec<_>, _>>()
        .map(TypedValue::List)
}

/// Coerce a single (non-list) value.
fn coerce_scalar(value: &Value, ty: Type) -> Result<TypedValue, CoercionError> {
    if value.is_null() {
        return Ok(TypedValue::Null);
    }
    let coerced = match ty {
        Type::String | Type::Url | Type::Lookup => to_text(value).map(TypedValue::Text),
        Type::Decimal | Type::Percentage => to_decimal(value).map(TypedValue::Decimal),
        Type::Integer => to_integer(value).map(TypedValue::Integer),
        Type::Boolean => to_boolean(value).map(TypedValue::Boolean),
        Type::Date => to_date(value).map(TypedValue::Date),
        Type::Composite => value.as_object().cloned().map(TypedValue::Composite),
    };
    coerced.ok_or_else(|| CoercionError::new(value, ty))
}

fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parse a JSON number through its textual form so no binary floating-point
/// rounding leaks into the decimal.
pub fn number_to_decimal(n: &Number) -> Option<BigDecimal> {
    BigDecimal::from_str(&n.to_string()).ok().filter(within_bounds)
}

fn to_decimal(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::Number(n) => number_to_decimal(n),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// Parse a decimal literal, surrounding whitespace allowed.
///
/// `None` for anything that is not a decimal, and for literals whose
/// exponent exceeds [`MAX_DECIMAL_EXPONENT`].
pub fn parse_decimal(s: &str) -> Option<BigDecimal> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    BigDecimal::from_str(trimmed).ok().filter(within_bounds)
}

fn within_bounds(d: &BigDecimal) -> bool {
    let (_, scale) = d.as_bigint_and_exponent();
    scale.unsigned_abs() <= MAX_DECIMAL_EXPONENT
}

fn to_integer(value: &Value) -> Option<BigInt> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(BigInt::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(BigInt::from(u))
            } else {
                number_to_decimal(n).and_then(integral_part)
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            BigInt::from_str(trimmed)
                .ok()
                .or_else(|| parse_decimal(trimmed).and_then(integral_part))
        }
        _ => None,
    }
}

/// The integer value of a decimal with no fractional part.
fn integral_part(d: BigDecimal) -> Option<BigInt> {
    let truncated = d.with_scale(0);
    if truncated != d {
        return None;
    }
    let (digits, _) = truncated.as_bigint_and_exponent();
    Some(digits)
}

fn to_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Some(true)
            } else if trimmed.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        }
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}

fn to_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date(s.trim()),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

/// Accepts RFC 3339 (any offset), naive date-times and plain dates. Inputs
/// without an offset are taken as UTC.
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
