//! # formcheck-cli — Command-Line Interface
//!
//! Checks schema documents and validates form documents from the shell.
//!
//! ## Subcommands
//!
//! - `schema <CONFIG>`: report schema self-consistency violations.
//! - `form <CONFIG> <FORM>`: validate a form against a schema.
//!
//! ## Exit Codes
//!
//! - `0`: no violations.
//! - `1`: violations were reported.
//! - `2`: a document could not be read or parsed.
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to the library crates; no validation
//!   logic lives here.

pub mod report;
pub mod validate;
