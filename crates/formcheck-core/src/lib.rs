//! # formcheck-core — Types and Reporting Contract
//!
//! The leaf crate of the formcheck workspace. It defines what every other
//! crate agrees on:
//!
//! - the attribute [`Type`] taxonomy and its single-parent hierarchy,
//! - [`coerce`]: conversion of untyped input into a [`TypedValue`],
//! - the [`Violation`] triple `(path, rule, parameters)` and the
//!   [`PropertyPath`] it is addressed by.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `formcheck-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - No I/O. Everything here is a pure function of its arguments.

pub mod coerce;
pub mod error;
pub mod path;
pub mod types;
pub mod value;
pub mod violation;

pub use coerce::{coerce, number_to_decimal, parse_decimal, MAX_DECIMAL_EXPONENT};
pub use error::{CoercionError, FormcheckError};
pub use path::{PropertyPath, Segment};
pub use types::{Type, TYPE_COUNT};
pub use value::TypedValue;
pub use violation::{Violation, ViolationClass, ViolationCode, ViolationReport};
