//! # Attribute Types — Single-Parent Type Hierarchy
//!
//! Defines the `Type` enum: the fixed taxonomy every attribute in a schema
//! is declared with. Two types are *extensions* of a base type:
//!
//! | Type | Parent | Canonical representation |
//! |------|--------|--------------------------|
//! | STRING | — | text |
//! | DATE | — | UTC instant |
//! | LOOKUP | — | text (a lookup item code) |
//! | DECIMAL | — | arbitrary-precision decimal |
//! | INTEGER | — | arbitrary-precision integer |
//! | BOOLEAN | — | boolean |
//! | COMPOSITE | — | mapping of name to untyped value |
//! | URL | STRING | text |
//! | PERCENTAGE | DECIMAL | arbitrary-precision decimal |
//!
//! The hierarchy is a forest of depth at most two, so [`Type::extends`] is a
//! bounded walk over [`Type::parent`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::FormcheckError;

/// The declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Type {
    /// Free text.
    String,
    /// A point in time.
    Date,
    /// A code drawn from a lookup config.
    Lookup,
    /// Arbitrary-precision decimal number.
    Decimal,
    /// Arbitrary-precision integer.
    Integer,
    /// Boolean flag.
    Boolean,
    /// Nested group of attributes described by a composite type config.
    Composite,
    /// Text holding a URL. Extends [`Type::String`].
    Url,
    /// Decimal holding a percentage. Extends [`Type::Decimal`].
    Percentage,
}

/// Total number of types.
pub const TYPE_COUNT: usize = 9;

impl Type {
    /// Returns all types, base types first.
    pub fn all() -> &'static [Type] {
        &[
            Self::String,
            Self::Date,
            Self::Lookup,
            Self::Decimal,
            Self::Integer,
            Self::Boolean,
            Self::Composite,
            Self::Url,
            Self::Percentage,
        ]
    }

    /// The type this type extends, if any.
    pub fn parent(&self) -> Option<Type> {
        match self {
            Self::Url => Some(Self::String),
            Self::Percentage => Some(Self::Decimal),
            Self::String
            | Self::Date
            | Self::Lookup
            | Self::Decimal
            | Self::Integer
            | Self::Boolean
            | Self::Composite => None,
        }
    }

    /// Returns `true` if `ancestor` appears while walking this type's parent
    /// chain. Reflexive: every type extends itself.
    pub fn extends(&self, ancestor: Type) -> bool {
        let mut current = Some(*self);
        while let Some(ty) = current {
            if ty == ancestor {
                return true;
            }
            current = ty.parent();
        }
        false
    }

    /// The root of this type's chain, which determines its canonical
    /// representation.
    pub fn base(&self) -> Type {
        let mut ty = *self;
        while let Some(parent) = ty.parent() {
            ty = parent;
        }
        ty
    }

    /// Returns the upper-case identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Date => "DATE",
            Self::Lookup => "LOOKUP",
            Self::Decimal => "DECIMAL",
            Self::Integer => "INTEGER",
            Self::Boolean => "BOOLEAN",
            Self::Composite => "COMPOSITE",
            Self::Url => "URL",
            Self::Percentage => "PERCENTAGE",
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Type {
    type Err = FormcheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Type::all()
            .iter()
            .copied()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| FormcheckError::UnknownType(s.to_string()))
    }
}
