//! # formcheck-form — Form Validation
//!
//! Validates a [`Form`]'s loosely-typed data against a schema
//! ([`Config`](formcheck_schema::Config)).
//!
//! - [`validate_form`]: the entry point. Schema and form structure are
//!   checked first; data is validated only when both are clean.
//! - [`validate_data`]: the recursive data walk on its own.
//! - [`document`]: loading configs and forms from JSON or YAML files.
//!
//! ## Crate Policy
//!
//! - Violations in data are values, never errors. Only unreadable documents
//!   produce an `Err`.
//! - Validation never mutates its inputs: each attribute set is checked
//!   against a private copy of its data node.

pub mod document;
pub mod form;
pub mod service;
pub mod validate;

pub use document::{load_config, load_form, DocumentError, DocumentFormat};
pub use form::{validate_structure, Form};
pub use service::validate_form;
pub use validate::validate_data;
