//! Rendering of violation reports for the terminal or for machines.

use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;

use formcheck_core::{ViolationClass, ViolationReport};

/// Output format for violation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per violation followed by a summary.
    #[default]
    Text,
    /// A JSON array of `{class, path, rule, parameters}` objects.
    Json,
}

/// Write `report` to `out` and return the exit code it implies.
pub fn emit(report: &ViolationReport, format: OutputFormat, out: &mut impl Write) -> Result<u8> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        OutputFormat::Text if report.is_empty() => {
            writeln!(out, "OK: no violations")?;
        }
        OutputFormat::Text => {
            writeln!(out, "{report}")?;
            writeln!(
                out,
                "\n{} violation(s): {} schema, {} data",
                report.len(),
                report.count_class(ViolationClass::Schema),
                report.count_class(ViolationClass::Data),
            )?;
        }
    }
    Ok(if report.is_empty() { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcheck_core::{PropertyPath, Violation, ViolationCode};

    fn sample() -> ViolationReport {
        ViolationReport::from(vec![Violation::new(
            ViolationCode::DataUnknownKey,
            &PropertyPath::root().property("data"),
        )
        .with_param("key", "unknown")])
    }

    #[test]
    fn text_report_lists_violations() {
        let mut out = Vec::new();
        let code = emit(&sample(), OutputFormat::Text, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(code, 1);
        assert!(text.contains("data: data.unknown_key"));
        assert!(text.contains("1 violation(s): 0 schema, 1 data"));
    }

    #[test]
    fn json_report_is_array() {
        let mut out = Vec::new();
        emit(&sample(), OutputFormat::Json, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["rule"], "data.unknown_key");
        assert_eq!(value[0]["parameters"]["key"], "unknown");
    }

    #[test]
    fn empty_report_exits_zero() {
        let mut out = Vec::new();
        let code = emit(&ViolationReport::default(), OutputFormat::Text, &mut out).unwrap();
        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "OK: no violations\n");
    }
}
