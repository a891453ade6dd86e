//! # formcheck-schema — Schema Model & Self-Consistency
//!
//! The declarative schema ([`Config`]) a form is validated against, the
//! fixed rule catalog its validators draw from, and the checker that proves
//! a schema internally consistent before any data meets it.
//!
//! ## Modules
//!
//! - [`model`]: `Config`, `Attribute`, `Validator`, `Dependent`,
//!   `LookupConfig`, `LookupItem`, `CompositeTypeConfig`.
//! - [`rules`]: the `ValidatorType` catalog and its predicates.
//! - [`index`]: code → config lookups and composite field resolution.
//! - [`validate`]: [`validate_schema`].
//!
//! ## Crate Policy
//!
//! - Depends only on `formcheck-core` internally.
//! - A broken schema is reported, never rejected with an error: every
//!   inconsistency becomes a [`Violation`](formcheck_core::Violation).

pub mod index;
pub mod model;
pub mod rules;
pub mod validate;

pub use index::SchemaIndex;
pub use model::{Attribute, CompositeTypeConfig, Config, Dependent, LookupConfig, LookupItem, Validator};
pub use rules::ValidatorType;
pub use validate::validate_schema;
