//! # Validator Rule Catalog
//!
//! The fixed set of atomic predicates an attribute can be constrained by.
//! The catalog is a `match` over [`ValidatorType`]; there is no registry and
//! nothing to initialize.
//!
//! | Rule | Operand | Holds when |
//! |------|---------|------------|
//! | `NotNull` | forbidden | value is not null |
//! | `NotBlank` | forbidden | value is text with a non-whitespace character |
//! | `NotEmpty` | forbidden | value is not null, empty text, empty list or empty composite |
//! | `Min` / `Max` | required | numeric value `>=` / `<=` operand |
//! | `GreaterThan` / `LessThan` | required | numeric value `>` / `<` operand |
//! | `MinSize` / `MaxSize` | required | size `>=` / `<=` operand |
//!
//! A predicate applied to a value of the wrong shape (`Min` against text,
//! `MaxSize` against a boolean) is `false`, never an error. Comparisons use
//! decimal arithmetic throughout.

use std::cmp::Ordering;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use formcheck_core::{FormcheckError, TypedValue};

/// An entry of the rule catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidatorType {
    NotNull,
    NotBlank,
    NotEmpty,
    Min,
    Max,
    GreaterThan,
    LessThan,
    MinSize,
    MaxSize,
}

impl ValidatorType {
    /// Returns all rules in catalog order.
    pub fn all() -> &'static [ValidatorType] {
        &[
            Self::NotNull,
            Self::NotBlank,
            Self::NotEmpty,
            Self::Min,
            Self::Max,
            Self::GreaterThan,
            Self::LessThan,
            Self::MinSize,
            Self::MaxSize,
        ]
    }

    /// The rule identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotNull => "NotNull",
            Self::NotBlank => "NotBlank",
            Self::NotEmpty => "NotEmpty",
            Self::Min => "Min",
            Self::Max => "Max",
            Self::GreaterThan => "GreaterThan",
            Self::LessThan => "LessThan",
            Self::MinSize => "MinSize",
            Self::MaxSize => "MaxSize",
        }
    }

    /// Whether the rule compares against an operand. Rules that do require
    /// one; all others forbid it.
    pub fn requires_operand(&self) -> bool {
        matches!(
            self,
            Self::Min
                | Self::Max
                | Self::GreaterThan
                | Self::LessThan
                | Self::MinSize
                | Self::MaxSize
        )
    }

    /// Evaluate the rule against a typed value.
    ///
    /// A missing operand makes every operand-based rule fail; the schema
    /// validator reports that case before any data is checked.
    pub fn evaluate(&self, operand: Option<&BigDecimal>, value: &TypedValue) -> bool {
        match self {
            Self::NotNull => !value.is_null(),
            Self::NotBlank => value.as_text().is_some_and(|s| !s.trim().is_empty()),
            Self::NotEmpty => !value.is_empty(),
            Self::Min => compare_number(value, operand).is_some_and(Ordering::is_ge),
            Self::Max => compare_number(value, operand).is_some_and(Ordering::is_le),
            Self::GreaterThan => compare_number(value, operand).is_some_and(Ordering::is_gt),
            Self::LessThan => compare_number(value, operand).is_some_and(Ordering::is_lt),
            Self::MinSize => compare_size(value, operand).is_some_and(Ordering::is_ge),
            Self::MaxSize => compare_size(value, operand).is_some_and(Ordering::is_le),
        }
    }

    /// Display form of the rule's condition, such as `>=10` or `MaxSize=2`.
    /// Empty for rules without an operand.
    pub fn condition(&self, operand: Option<&BigDecimal>) -> String {
        let Some(operand) = operand else {
            return String::new();
        };
        match self {
            Self::Min => format!(">={operand}"),
            Self::Max => format!("<={operand}"),
            Self::GreaterThan => format!(">{operand}"),
            Self::LessThan => format!("<{operand}"),
            Self::MinSize => format!("MinSize={operand}"),
            Self::MaxSize => format!("MaxSize={operand}"),
            Self::NotNull | Self::NotBlank | Self::NotEmpty => String::new(),
        }
    }
}

fn compare_number(value: &TypedValue, operand: Option<&BigDecimal>) -> Option<Ordering> {
    let operand = operand?;
    let number = value.as_decimal()?;
    Some(number.cmp(operand))
}

fn compare_size(value: &TypedValue, operand: Option<&BigDecimal>) -> Option<Ordering> {
    let operand = operand?;
    let size = BigDecimal::from(value.size()? as u64);
    Some(size.cmp(operand))
}

impl std::fmt::Display for ValidatorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidatorType {
    type Err = FormcheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValidatorType::all()
            .iter()
            .copied()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| FormcheckError::UnknownValidatorType(s.to_string()))
    }
}
