//! # Form Service
//!
//! The public entry point: validate a form against a schema with the
//! correct precedence.
//!
//! Schema violations and form structure violations are gathered first. If
//! there are any, they are returned alone and the data is never looked at:
//! validating data against a schema known to be broken produces cascades
//! (a missing lookup config surfacing as a spurious unknown value) instead
//! of one clear schema error.

use formcheck_core::Violation;
use formcheck_schema::{validate_schema, Config};

use crate::form::{validate_structure, Form};
use crate::validate::validate_data;

/// Validate `form` against `config`.
pub fn validate_form(config: &Config, form: &Form) -> Vec<Violation> {
    let mut violations = validate_schema(config);
    violations.extend(validate_structure(form));
    if !violations.is_empty() {
        tracing::debug!(
            violations = violations.len(),
            "schema or form structure invalid, skipping data validation"
        );
        return violations;
    }
    validate_data(config, form)
}
