//! Reading and writing layered configuration documents
//!
//! A configuration document has exactly two top-level keys:
//!
//! ```yaml
//! info:
//!   name: ep01_s01
//!   parent: ../ep01.yml
//! data:
//!   general:
//!     fps: 24
//! ```
//!
//! `info` carries metadata about the document's place in the override
//! hierarchy; `data` is the payload the merge engine folds.

use crate::{Error, NormalizedPath, Result, io};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata block of a configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Logical name of the document, usually its file stem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Reference to the logical predecessor file. May contain context
    /// tokens and `..` segments; resolved by the chain walker against the
    /// referencing file itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Any further metadata keys are carried along untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A configuration document: `info` metadata plus the `data` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub info: DocumentInfo,

    #[serde(default)]
    pub data: Value,
}

impl ConfigDocument {
    /// Create a document with the given payload and no metadata.
    pub fn with_data(data: Value) -> Self {
        Self {
            info: DocumentInfo::default(),
            data,
        }
    }
}

/// Format-agnostic store for configuration documents.
///
/// Detects the format from the file extension and handles
/// serialization/deserialization transparently. Documents are read fresh
/// on every call; nothing is cached.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentStore;

impl DocumentStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a document from a file.
    ///
    /// Format is detected from the extension:
    /// - `.yml`, `.yaml` -> YAML
    /// - `.json` -> JSON
    pub fn read(&self, path: &NormalizedPath) -> Result<ConfigDocument> {
        let content = io::read_text(path)?;
        let extension = path.extension().unwrap_or("");

        match extension.to_lowercase().as_str() {
            "yml" | "yaml" => {
                serde_yaml::from_str(&content).map_err(|e| Error::DocumentParse {
                    path: path.to_native(),
                    format: "YAML".into(),
                    message: e.to_string(),
                })
            }
            "json" => serde_json::from_str(&content).map_err(|e| Error::DocumentParse {
                path: path.to_native(),
                format: "JSON".into(),
                message: e.to_string(),
            }),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    /// Save a document to a file.
    ///
    /// Format is determined from the extension. Uses atomic write to
    /// prevent corruption; parent directories are created as needed.
    pub fn save(&self, path: &NormalizedPath, document: &ConfigDocument) -> Result<()> {
        let extension = path.extension().unwrap_or("");

        let content = match extension.to_lowercase().as_str() {
            "yml" | "yaml" => {
                serde_yaml::to_string(document).map_err(|e| Error::DocumentSerialize {
                    path: path.to_native(),
                    format: "YAML".into(),
                    message: e.to_string(),
                })?
            }
            "json" => serde_json::to_string_pretty(document).map_err(|e| {
                Error::DocumentSerialize {
                    path: path.to_native(),
                    format: "JSON".into(),
                    message: e.to_string(),
                }
            })?,
            _ => {
                return Err(Error::UnsupportedFormat {
                    extension: extension.to_string(),
                });
            }
        };

        io::write_atomic(path, content.as_bytes())
    }
}
