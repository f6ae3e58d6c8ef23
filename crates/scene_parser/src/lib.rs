//! Readers for scene schemas, scene documents and engine configuration.
//!
//! This crate turns JSON, YAML and TOML text into the strongly-typed records of
//! `scene_core`. It performs no validation beyond deserialization: the schema
//! loader in `scene_validator` owns every structural check.
//!
//! # Example
//!
//! ```rust
//! use scene_parser::{parse_documents, parse_schema, SourceFormat};
//!
//! let schema = parse_schema(r#"[
//!     { "name": "SceneID", "type": "string", "required": true }
//! ]"#, SourceFormat::Json).expect("Failed to parse schema");
//! assert_eq!(schema[0].name, "SceneID");
//!
//! let scenes = parse_documents(r#"
//! - SceneID: intro01
//! - SceneID: chase02
//! "#, SourceFormat::Yaml).expect("Failed to parse scenes");
//! assert_eq!(scenes.len(), 2);
//! ```

use scene_core::{RawField, RawSchema, SceneDocument, ValidationOptions};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while reading schemas, documents or configuration.
#[derive(Debug, Error)]
pub enum ParserError {
    /// JSON parsing or deserialization failed
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing or deserialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// A scene entry is not a mapping of field names to values
    #[error("Scene {index} is not an object (found {found})")]
    NotAnObject {
        /// Position of the entry in the source
        index: usize,
        /// JSON kind of the entry
        found: &'static str,
    },
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
}

/// Accepted layouts of a schema file.
#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaFile {
    List(Vec<RawField>),
    Wrapped { fields: Vec<RawField> },
}

impl From<SchemaFile> for RawSchema {
    fn from(file: SchemaFile) -> Self {
        match file {
            SchemaFile::List(fields) | SchemaFile::Wrapped { fields } => fields,
        }
    }
}

fn deserialize<T: DeserializeOwned>(content: &str, format: SourceFormat) -> Result<T> {
    match format {
        SourceFormat::Json => Ok(serde_json::from_str(content)?),
        SourceFormat::Yaml => Ok(serde_yaml_ng::from_str(content)?),
        SourceFormat::Toml => {
            toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))
        }
    }
}

/// Parse a raw schema from text.
///
/// The text may hold a bare list of field records or an object with a
/// `fields` list (the only layout TOML can express, as `[[fields]]`).
///
/// # Example
///
/// ```rust
/// use scene_parser::{parse_schema, SourceFormat};
///
/// let toml = r#"
/// [[fields]]
/// name = "Duration"
/// type = "string"
/// options = ["5s", "10s"]
/// "#;
///
/// let schema = parse_schema(toml, SourceFormat::Toml).unwrap();
/// assert_eq!(schema[0].options, vec!["5s", "10s"]);
/// ```
pub fn parse_schema(content: &str, format: SourceFormat) -> Result<RawSchema> {
    let file: SchemaFile = deserialize(content, format)?;
    let schema = RawSchema::from(file);
    debug!("Parsed {} top-level schema fields", schema.len());
    Ok(schema)
}

/// Parse scene documents from text.
///
/// Accepted layouts: a list of scene objects, an object with a `scenes` list
/// (TOML: `[[scenes]]`), or a single scene object.
pub fn parse_documents(content: &str, format: SourceFormat) -> Result<Vec<SceneDocument>> {
    let value: serde_json::Value = deserialize(content, format)?;

    let entries = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("scenes") {
            Some(serde_json::Value::Array(items)) => items,
            Some(other) => {
                map.insert("scenes".to_string(), other);
                vec![serde_json::Value::Object(map)]
            }
            None => vec![serde_json::Value::Object(map)],
        },
        other => {
            return Err(ParserError::NotAnObject {
                index: 0,
                found: json_kind(&other),
            });
        }
    };

    let documents = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            serde_json::Value::Object(map) => Ok(map
                .into_iter()
                .map(|(k, v)| (k, v.into()))
                .collect::<SceneDocument>()),
            other => Err(ParserError::NotAnObject {
                index,
                found: json_kind(&other),
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Parsed {} scene documents", documents.len());
    Ok(documents)
}

/// Parse validation options from a configuration file's text.
///
/// Missing keys keep their defaults.
///
/// # Example
///
/// ```rust
/// use scene_parser::{parse_config, SourceFormat};
///
/// let options = parse_config("workers = 2\nallow_forward_references = true", SourceFormat::Toml).unwrap();
/// assert_eq!(options.workers, Some(2));
/// assert!(options.allow_forward_references);
/// assert!(options.include_advisories);
/// ```
pub fn parse_config(content: &str, format: SourceFormat) -> Result<ValidationOptions> {
    deserialize(content, format)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Detect the source format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.json` → `SourceFormat::Json`
/// * `.yaml`, `.yml` → `SourceFormat::Yaml`
/// * `.toml` → `SourceFormat::Toml`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<SourceFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "json" => Ok(SourceFormat::Json),
        "yaml" | "yml" => Ok(SourceFormat::Yaml),
        "toml" => Ok(SourceFormat::Toml),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

fn read_with_format(path: &Path) -> Result<(String, SourceFormat)> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    Ok((content, format))
}

/// Parse a raw schema from a file with automatic format detection.
///
/// ```no_run
/// use scene_parser::parse_schema_file;
/// use std::path::Path;
///
/// let schema = parse_schema_file(Path::new("schemas/scene_schema.json")).unwrap();
/// println!("Loaded {} fields", schema.len());
/// ```
pub fn parse_schema_file(path: &Path) -> Result<RawSchema> {
    let (content, format) = read_with_format(path)?;
    parse_schema(&content, format)
}

/// Parse scene documents from a file with automatic format detection.
pub fn parse_documents_file(path: &Path) -> Result<Vec<SceneDocument>> {
    let (content, format) = read_with_format(path)?;
    parse_documents(&content, format)
}

/// Parse validation options from a file with automatic format detection.
pub fn parse_config_file(path: &Path) -> Result<ValidationOptions> {
    let (content, format) = read_with_format(path)?;
    parse_config(&content, format)
}
