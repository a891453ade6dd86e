//! # Schema and Form Subcommands
//!
//! `formcheck schema` checks a config document on its own; `formcheck form`
//! checks a config and then validates a form document against it, with
//! schema violations taking precedence.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use formcheck_core::ViolationReport;
use formcheck_form::{load_config, load_form, validate_form};
use formcheck_schema::validate_schema;

use crate::report::{emit, OutputFormat};

/// Arguments for the `formcheck schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Config document (JSON, or YAML by `.yaml` / `.yml` extension).
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

/// Arguments for the `formcheck form` subcommand.
#[derive(Args, Debug)]
pub struct FormArgs {
    /// Config document the form is validated against.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Form document, an object with a `data` mapping.
    #[arg(value_name = "FORM")]
    pub form: PathBuf,
}

/// Execute the schema subcommand.
///
/// Returns exit code: 0 when the schema is consistent, 1 when violations
/// were reported.
pub fn run_schema(args: &SchemaArgs, format: OutputFormat, out: &mut impl Write) -> Result<u8> {
    let config = load_config(&args.config).context("failed to load config")?;
    let report = ViolationReport::from(validate_schema(&config));
    tracing::info!(
        config = %args.config.display(),
        violations = report.len(),
        "schema checked"
    );
    emit(&report, format, out)
}

/// Execute the form subcommand.
///
/// Returns exit code: 0 when the form is valid, 1 when violations were
/// reported.
pub fn run_form(args: &FormArgs, format: OutputFormat, out: &mut impl Write) -> Result<u8> {
    let config = load_config(&args.config).context("failed to load config")?;
    let form = load_form(&args.form).context("failed to load form")?;
    let report = ViolationReport::from(validate_form(&config, &form));
    tracing::info!(
        config = %args.config.display(),
        form = %args.form.display(),
        violations = report.len(),
        "form validated"
    );
    emit(&report, format, out)
}
