//! Provenance tagging of merged values
//!
//! After a chain has been folded, the tracer can annotate every scalar
//! leaf of the result with the file that contributed it. Documents are
//! replayed most-specific-first over the merged skeleton; a leaf keeps
//! the first tag it receives, so the most specific contributor wins,
//! mirroring the override order of the merge itself.

use cascade_fs::NormalizedPath;
use serde_json::{Map, Value};

/// Default delimiter between a value and its provenance tag.
pub const DEFAULT_SPLITTER: &str = "--->";

/// Field that identifies elements in a keyed sequence.
const IDENTITY_KEY: &str = "name";

/// Identifier for a chain file: its last two path segments.
pub fn file_label(path: &NormalizedPath) -> String {
    let mut segments: Vec<&str> = path
        .as_str()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let keep = segments.split_off(segments.len().saturating_sub(2));
    keep.join("/")
}

/// Tags merged leaf values with the file that contributed them.
///
/// The delimiter is explicit configuration; values already carrying it
/// are never tagged twice.
#[derive(Debug, Clone)]
pub struct ProvenanceTracer {
    splitter: String,
}

impl Default for ProvenanceTracer {
    fn default() -> Self {
        Self {
            splitter: DEFAULT_SPLITTER.to_string(),
        }
    }
}

impl ProvenanceTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_splitter(splitter: impl Into<String>) -> Self {
        Self {
            splitter: splitter.into(),
        }
    }

    pub fn splitter(&self) -> &str {
        &self.splitter
    }

    /// Annotate a merged configuration.
    ///
    /// `documents` are `(label, data)` pairs in chain order (root-most
    /// first); they are replayed in reverse so the most specific
    /// document claims each leaf first.
    pub fn annotate(&self, merged: Value, documents: &[(String, Value)]) -> Value {
        let mut result = merged;
        for (label, data) in documents.iter().rev() {
            result = self.apply(result, data, label);
        }
        result
    }

    fn apply(&self, base: Value, data: &Value, label: &str) -> Value {
        // Scalars are compared and tagged in string form.
        let base = stringify_scalar(base);

        match (base, data) {
            (Value::Object(base_map), Value::Object(data_map)) => {
                let merged: Map<String, Value> = base_map
                    .into_iter()
                    .map(|(key, value)| match data_map.get(&key) {
                        Some(data_value) => {
                            let annotated = self.apply(value, data_value, label);
                            (key, annotated)
                        }
                        None => (key, value),
                    })
                    .collect();
                Value::Object(merged)
            }

            (Value::Array(base_items), Value::Array(data_items)) => {
                if is_keyed(&base_items) {
                    Value::Array(self.apply_keyed(base_items, data_items, label))
                } else {
                    self.tag_value(Value::Array(base_items), label)
                }
            }

            (Value::String(leaf), data_value) if is_scalar(data_value) => {
                self.tag_leaf(leaf, label)
            }

            // Shapes disagree: the skeleton stands as-is.
            (base, _) => base,
        }
    }

    /// Keyed sequences are matched by identity, with any existing tag
    /// stripped from the skeleton's names before comparison. Matched
    /// elements take the document's fields under the first-tag-wins
    /// guard; document elements without a partner are appended.
    fn apply_keyed(&self, base: Vec<Value>, data: &[Value], label: &str) -> Vec<Value> {
        let base_names: Vec<String> = base
            .iter()
            .filter_map(|element| element[IDENTITY_KEY].as_str())
            .map(|name| self.strip_tag(name).to_string())
            .collect();

        let mut result: Vec<Value> = base
            .into_iter()
            .map(|element| self.apply_keyed_element(element, data, label))
            .collect();

        for element in data {
            let is_new = element
                .get(IDENTITY_KEY)
                .and_then(Value::as_str)
                .is_some_and(|name| !base_names.iter().any(|known| known == name));
            if is_new {
                result.push(self.tag_value(element.clone(), label));
            }
        }
        result
    }

    fn apply_keyed_element(&self, element: Value, data: &[Value], label: &str) -> Value {
        let Value::Object(mut fields) = element else {
            return element;
        };
        let identity = fields
            .get(IDENTITY_KEY)
            .and_then(Value::as_str)
            .map(|name| self.strip_tag(name).to_string());

        let partner = identity.as_deref().and_then(|identity| {
            data.iter().find(|candidate| {
                candidate
                    .get(IDENTITY_KEY)
                    .and_then(Value::as_str)
                    .is_some_and(|name| name == identity)
            })
        });

        if let Some(Value::Object(partner_fields)) = partner {
            for (key, data_value) in partner_fields {
                let untagged = fields.get(key).is_none_or(|existing| !self.is_tagged(existing));
                if untagged {
                    fields.insert(key.clone(), self.tag_value(data_value.clone(), label));
                }
            }
        }
        Value::Object(fields)
    }

    /// Recursively tag every untagged string leaf of a value.
    fn tag_value(&self, value: Value, label: &str) -> Value {
        match stringify_scalar(value) {
            Value::String(leaf) => self.tag_leaf(leaf, label),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.tag_value(item, label))
                    .collect(),
            ),
            Value::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(key, item)| (key, self.tag_value(item, label)))
                    .collect(),
            ),
            other => other,
        }
    }

    fn tag_leaf(&self, leaf: String, label: &str) -> Value {
        if leaf.contains(&self.splitter) {
            Value::String(leaf)
        } else {
            Value::String(format!("{leaf}{}{label}", self.splitter))
        }
    }

    fn strip_tag<'a>(&self, value: &'a str) -> &'a str {
        value.split(&self.splitter).next().unwrap_or(value)
    }

    /// Whether any string leaf of a value already carries the delimiter.
    fn is_tagged(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => s.contains(&self.splitter),
            Value::Array(items) => items.iter().any(|item| self.is_tagged(item)),
            Value::Object(entries) => entries.values().any(|item| self.is_tagged(item)),
            _ => false,
        }
    }
}

/// Numbers and booleans become strings so they can carry a tag.
fn stringify_scalar(value: Value) -> Value {
    match value {
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        other => other,
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::Bool(_) | Value::Number(_) | Value::String(_)
    )
}

fn is_keyed(items: &[Value]) -> bool {
    !items.is_empty()
        && items
            .iter()
            .all(|v| v.as_object().is_some_and(|m| m.contains_key(IDENTITY_KEY)))
}
