//! # Document Loading
//!
//! Reads configs and forms from disk. The format is chosen by file
//! extension: `.yaml` / `.yml` are YAML, everything else is JSON. YAML is
//! converted into a JSON value tree first, so both formats deserialize
//! through the same serde path and produce identical models.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use formcheck_core::PropertyPath;
use formcheck_schema::Config;

use crate::form::Form;

/// A document could not be turned into a model.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {format} in '{}': {reason}", path.display())]
    Parse {
        path: PathBuf,
        format: DocumentFormat,
        reason: String,
    },

    #[error("'{}' does not describe a {kind}: {source}", path.display())]
    Decode {
        path: PathBuf,
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Serialization format of a document on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load a [`Config`] from a JSON or YAML file.
pub fn load_config(path: &Path) -> Result<Config, DocumentError> {
    load(path, "config")
}

/// Load a [`Form`] from a JSON or YAML file.
pub fn load_form(path: &Path) -> Result<Form, DocumentError> {
    load(path, "form")
}

/// Read a file into an untyped JSON value.
pub fn load_value(path: &Path) -> Result<Value, DocumentError> {
    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let format = DocumentFormat::from_path(path);
    parse_value(&content, format).map_err(|reason| DocumentError::Parse {
        path: path.to_path_buf(),
        format,
        reason,
    })
}

/// Parse document text in the given format.
pub fn parse_value(content: &str, format: DocumentFormat) -> Result<Value, String> {
    match format {
        DocumentFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        DocumentFormat::Yaml => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| e.to_string())?;
            yaml_to_json_value(&yaml)
        }
    }
}

fn load<T: DeserializeOwned>(path: &Path, kind: &'static str) -> Result<T, DocumentError> {
    let value = load_value(path)?;
    let model = serde_json::from_value(value).map_err(|source| DocumentError::Decode {
        path: path.to_path_buf(),
        kind,
        source,
    })?;
    tracing::debug!(path = %path.display(), kind, "document loaded");
    Ok(model)
}

/// Convert a parsed YAML document into the JSON value model.
///
/// Tags are dropped in favour of the tagged value. Scalar mapping keys are
/// rendered as strings, since form data is keyed by attribute code. Errors
/// name the location of the offending node, e.g. `data.scores[2]`.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    convert_yaml(yaml, &PropertyPath::root())
}

fn convert_yaml(yaml: &serde_yaml::Value, at: &PropertyPath) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    match yaml {
        Yaml::Null => Ok(Value::Null),
        Yaml::Bool(b) => Ok(Value::Bool(*b)),
        Yaml::Number(n) => yaml_number(n).ok_or_else(|| {
            format!("{}: {n} has no JSON representation", location(at))
        }),
        Yaml::String(s) => Ok(Value::String(s.clone())),
        Yaml::Sequence(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| convert_yaml(item, &at.index(i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Yaml::Mapping(mapping) => {
            let mut object = serde_json::Map::with_capacity(mapping.len());
            for (key, item) in mapping {
                let key = match key {
                    Yaml::String(s) => s.clone(),
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    _ => return Err(format!("{}: mapping keys must be scalars", location(at))),
                };
                let value = convert_yaml(item, &at.property(&key))?;
                object.insert(key, value);
            }
            Ok(Value::Object(object))
        }
        Yaml::Tagged(tagged) => convert_yaml(&tagged.value, at),
    }
}

/// Integers stay exact; floats must be finite.
fn yaml_number(n: &serde_yaml::Number) -> Option<Value> {
    if let Some(i) = n.as_i64() {
        Some(Value::from(i))
    } else if let Some(u) = n.as_u64() {
        Some(Value::from(u))
    } else {
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
    }
}

fn location(at: &PropertyPath) -> String {
    if at.is_root() {
        "(root)".to_string()
    } else {
        at.to_string()
    }
}
