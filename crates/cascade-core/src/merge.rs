//! Deep merge of layered configuration payloads
//!
//! The merge is type-driven and recursive, evaluated pairwise on the
//! closed value union (null / bool / number / string / sequence /
//! mapping). Mappings merge key-by-key, sequences of named mappings
//! merge by identity, and every other pairing lets the overlay win
//! outright. A null overlay is a tombstone: it removes the branch from
//! the parent mapping instead of storing a null.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::template;
use cascade_fs::NormalizedPath;
use serde_json::{Map, Value};

/// Field that identifies elements in a keyed sequence merge.
const IDENTITY_KEY: &str = "name";

/// Field that marks a keyed-sequence element for removal.
const CANCEL_KEY: &str = "cancel";

/// String-leaf substitution applied to a merged value.
///
/// Runs every string leaf through template substitution (forced, so the
/// pass never fails) and then resolves `@` path markers:
///
/// - `@../…` is joined onto the configured base directory and lexically
///   normalized;
/// - any other `@…` has the marker stripped and the remainder passed
///   through verbatim (already absolute or already resolved).
#[derive(Debug, Clone)]
pub struct LeafSubstitution<'a> {
    context: &'a Context,
    directory: Option<&'a NormalizedPath>,
}

impl<'a> LeafSubstitution<'a> {
    pub fn new(context: &'a Context) -> Self {
        Self {
            context,
            directory: None,
        }
    }

    /// Anchor `@../…` path markers at the given directory.
    pub fn with_directory(mut self, directory: &'a NormalizedPath) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Apply the substitution to every string leaf of a value.
    pub fn map(&self, value: Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.apply(&s)),
            Value::Array(items) => Value::Array(items.into_iter().map(|v| self.map(v)).collect()),
            Value::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, self.map(v)))
                    .collect(),
            ),
            other => other,
        }
    }

    fn apply(&self, leaf: &str) -> String {
        let resolved = template::substitute(leaf, self.context, true)
            .unwrap_or_else(|| leaf.to_string());

        let Some(marked) = resolved.strip_prefix('@') else {
            return resolved;
        };
        if resolved.starts_with("@../") {
            if let Some(directory) = self.directory {
                return directory.join(marked).normalize().as_str().to_string();
            }
        }
        marked.to_string()
    }
}

/// Deep-merge `overlay` onto `base`, returning a new value.
///
/// `Ok(Value::Null)` is the tombstone result: the caller should drop
/// the corresponding branch rather than store a null. When `subst` is
/// supplied, string leaves of the merged result get one substitution
/// pass (the pass is idempotent on its own output, so applying it once
/// over the final tree is equivalent to applying it per branch).
pub fn merge(base: Value, overlay: Value, subst: Option<&LeafSubstitution>) -> Result<Value> {
    let merged = merge_value(base, overlay)?;
    Ok(match subst {
        Some(substitution) => substitution.map(merged),
        None => merged,
    })
}

fn merge_value(base: Value, overlay: Value) -> Result<Value> {
    match (base, overlay) {
        // Explicit null overlay is a tombstone for this branch.
        (_, Value::Null) => Ok(Value::Null),

        (Value::Object(base_map), Value::Object(overlay_map)) => {
            merge_mapping(base_map, overlay_map).map(Value::Object)
        }

        (Value::Array(base_items), Value::Array(overlay_items)) => {
            if is_keyed_sequence(&base_items) {
                merge_keyed_sequence(base_items, overlay_items).map(Value::Array)
            } else {
                // Sequences are replaced wholesale unless keyed.
                Ok(Value::Array(overlay_items))
            }
        }

        // Scalars, and any pairing of differing shapes: overlay wins.
        (_, overlay) => Ok(overlay),
    }
}

fn merge_mapping(
    base: Map<String, Value>,
    mut overlay: Map<String, Value>,
) -> Result<Map<String, Value>> {
    for (key, base_value) in base {
        match overlay.remove(&key) {
            None => {
                overlay.insert(key, base_value);
            }
            Some(overlay_value) => {
                let merged = merge_value(base_value, overlay_value)?;
                if merged.is_null() {
                    tracing::debug!(%key, "merge produced a tombstone, dropping key");
                } else {
                    overlay.insert(key, merged);
                }
            }
        }
    }
    Ok(overlay)
}

/// A sequence merges by identity when it is non-empty and every element
/// is a mapping carrying the identity key. An empty sequence is treated
/// as non-keyed and falls through to wholesale replacement.
fn is_keyed_sequence(items: &[Value]) -> bool {
    !items.is_empty()
        && items
            .iter()
            .all(|v| v.as_object().is_some_and(|m| m.contains_key(IDENTITY_KEY)))
}

fn merge_keyed_sequence(base: Vec<Value>, overlay: Vec<Value>) -> Result<Vec<Value>> {
    // Overlay elements must fit the keyed shape before any pairing.
    for element in &overlay {
        let ok = element
            .as_object()
            .is_some_and(|m| m.contains_key(IDENTITY_KEY));
        if !ok {
            return Err(Error::KeyedMergeShape {
                message: format!("override element {element} has no identity"),
            });
        }
    }

    let mut consumed = vec![false; overlay.len()];
    let mut result = Vec::with_capacity(base.len() + overlay.len());

    // Matched and passthrough elements keep the base's relative order.
    for element in base {
        let identity = element[IDENTITY_KEY].clone();
        let partner = overlay
            .iter()
            .position(|candidate| candidate[IDENTITY_KEY] == identity);
        match partner {
            Some(index) => {
                consumed[index] = true;
                result.push(overlay_fields(element, overlay[index].clone()));
            }
            None => result.push(element),
        }
    }

    // Unmatched overlay elements are appended in their original order.
    for (index, element) in overlay.into_iter().enumerate() {
        if !consumed[index] {
            result.push(element);
        }
    }

    // Honor explicit removal markers after assembly.
    result.retain(|element| {
        !element
            .get(CANCEL_KEY)
            .is_some_and(is_truthy)
    });

    Ok(result)
}

/// Field-by-field overlay for one matched pair of keyed elements:
/// overlay fields win, base-only fields are kept.
fn overlay_fields(base: Value, overlay: Value) -> Value {
    let (Value::Object(mut base_map), Value::Object(overlay_map)) = (base, overlay) else {
        unreachable!("keyed elements are mappings by construction");
    };
    for (key, value) in overlay_map {
        base_map.insert(key, value);
    }
    Value::Object(base_map)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
        Value::Null => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn merge_plain(base: Value, overlay: Value) -> Value {
        merge(base, overlay, None).unwrap()
    }

    #[test]
    fn mapping_overlay_wins_per_key() {
        let base = json!({"a": 1, "b": 2, "c": 3});
        let overlay = json!({"a": 2, "b": 4});
        assert_eq!(merge_plain(base, overlay), json!({"a": 2, "b": 4, "c": 3}));
    }

    #[test]
    fn mapping_base_only_keys_are_preserved() {
        let base = json!({"a": [1, 2, 3, 4], "b": 5});
        let overlay = json!({"a": [3, 4]});
        assert_eq!(merge_plain(base, overlay), json!({"a": [3, 4], "b": 5}));
    }

    #[test]
    fn nested_mappings_merge_recursively() {
        let base = json!({"a": {"b": {"d": 10}}, "c": [1, 2, 3]});
        let overlay = json!({"a": {"b": {"d": 1, "e": 2}}});
        assert_eq!(
            merge_plain(base, overlay),
            json!({"a": {"b": {"d": 1, "e": 2}}, "c": [1, 2, 3]})
        );
    }

    #[test]
    fn plain_sequences_are_replaced_wholesale() {
        let base = json!({"a": {"b": {"f": [1, 2, 3, 4, 5]}}, "c": [1, 2, 3]});
        let overlay = json!({"a": {"b": {"f": [0]}}});
        assert_eq!(
            merge_plain(base, overlay),
            json!({"a": {"b": {"f": [0]}}, "c": [1, 2, 3]})
        );
    }

    #[test]
    fn unkeyed_mapping_sequences_are_replaced_wholesale() {
        // mappings without the identity key do not trigger keyed merge
        let base = json!([{"a": 1, "b": 2}]);
        let overlay = json!([{"a": 2}, {"b": 2222, "c": 44444}]);
        assert_eq!(
            merge_plain(base, overlay),
            json!([{"a": 2}, {"b": 2222, "c": 44444}])
        );
    }

    #[test]
    fn type_mismatch_lets_overlay_win() {
        assert_eq!(merge_plain(json!({"a": 1}), json!([1, 2])), json!([1, 2]));
        assert_eq!(merge_plain(json!("text"), json!(7)), json!(7));
        assert_eq!(merge_plain(json!(null), json!({"a": 1})), json!({"a": 1}));
    }

    #[test]
    fn null_overlay_is_a_tombstone() {
        let base = json!({"keep": 1, "drop": {"x": 2}});
        let overlay = json!({"drop": null});
        assert_eq!(merge_plain(base, overlay), json!({"keep": 1}));
    }

    #[test]
    fn merge_with_identical_input_is_identity() {
        let value = json!({
            "general": {"fps": 24, "tools": ["a", "b"]},
            "env": [{"name": "A", "value": 1}]
        });
        assert_eq!(merge_plain(value.clone(), value.clone()), value);
    }

    #[test]
    fn keyed_merge_matches_by_identity() {
        let base = json!([{"name": "a", "value": 1}, {"name": "b", "value": 2}]);
        let overlay = json!([{"name": "a", "value": 10}]);
        assert_eq!(
            merge_plain(base, overlay),
            json!([{"name": "a", "value": 10}, {"name": "b", "value": 2}])
        );
    }

    #[test]
    fn keyed_merge_appends_new_identities() {
        let base = json!([{"name": "a", "value": 1}, {"name": "b", "value": 2}]);
        let overlay = json!([{"name": "a", "value": 10}, {"name": "c", "value": 5}]);
        assert_eq!(
            merge_plain(base, overlay),
            json!([
                {"name": "a", "value": 10},
                {"name": "b", "value": 2},
                {"name": "c", "value": 5}
            ])
        );
    }

    #[test]
    fn keyed_merge_preserves_base_order() {
        let base = json!([{"name": "b", "value": 2}, {"name": "a", "value": 1}]);
        let overlay = json!([{"name": "a", "value": 10}, {"name": "c", "value": 5}]);
        assert_eq!(
            merge_plain(base, overlay),
            json!([
                {"name": "b", "value": 2},
                {"name": "a", "value": 10},
                {"name": "c", "value": 5}
            ])
        );
    }

    #[test]
    fn keyed_merge_keeps_base_only_fields() {
        let base = json!([{"name": "MODULE1", "path": "C:/aaaa", "mode": "set"}]);
        let overlay = json!([{"name": "MODULE1", "path": "C:/bbbb"}]);
        assert_eq!(
            merge_plain(base, overlay),
            json!([{"name": "MODULE1", "path": "C:/bbbb", "mode": "set"}])
        );
    }

    #[test]
    fn keyed_merge_drops_cancelled_elements() {
        let base = json!([{"name": "a", "value": 1}, {"name": "b", "value": 2}]);
        let overlay = json!([{"name": "a", "cancel": true}, {"name": "c", "value": 5}]);
        assert_eq!(
            merge_plain(base, overlay),
            json!([{"name": "b", "value": 2}, {"name": "c", "value": 5}])
        );
    }

    #[test]
    fn keyed_merge_rejects_shapeless_overlay_elements() {
        let base = json!([{"name": "a", "value": 1}]);
        let overlay = json!([{"name": "a"}, "not a mapping"]);
        let err = merge(base, overlay, None).unwrap_err();
        assert!(matches!(err, Error::KeyedMergeShape { .. }));
    }

    #[test]
    fn empty_base_sequence_is_replaced_wholesale() {
        let base = json!({"env": []});
        let overlay = json!({"env": [{"name": "a", "value": 1}]});
        assert_eq!(
            merge_plain(base, overlay),
            json!({"env": [{"name": "a", "value": 1}]})
        );
    }

    #[test]
    fn substitution_resolves_tokens_in_string_leaves() {
        let context = Context::new().with("project", "PROJ1");
        let subst = LeafSubstitution::new(&context);
        let base = json!({"a": {"b": [1, 2, 3]}, "c": [1, 2, 3]});
        let overlay = json!({"c": [2, 3, "<project>"]});
        assert_eq!(
            merge(base, overlay, Some(&subst)).unwrap(),
            json!({"a": {"b": [1, 2, 3]}, "c": [2, 3, "PROJ1"]})
        );
    }

    #[test]
    fn substitution_reaches_keyed_sequence_fields() {
        let context = Context::new().with("project", "PROJ1").with("scene", "s01c05");
        let subst = LeafSubstitution::new(&context);
        let base = json!([{"name": "a1", "value": 1}, {"name": "d1", "value": 6}]);
        let overlay = json!([{"name": "a1", "value": "<project>_<scene>"}]);
        assert_eq!(
            merge(base, overlay, Some(&subst)).unwrap(),
            json!([{"name": "a1", "value": "PROJ1_s01c05"}, {"name": "d1", "value": 6}])
        );
    }

    #[test]
    fn path_marker_resolves_against_directory() {
        let context = Context::new();
        let directory = NormalizedPath::new("C:/test/config/directory/env");
        let subst = LeafSubstitution::new(&context).with_directory(&directory);

        let merged = merge(
            json!({}),
            json!({"toolA": "@../../toolA", "toolB": "@C:/test/toolB"}),
            Some(&subst),
        )
        .unwrap();

        assert_eq!(
            merged,
            json!({
                "toolA": "C:/test/config/toolA",
                "toolB": "C:/test/toolB"
            })
        );
    }

    #[test]
    fn unresolved_tokens_stay_literal_during_substitution() {
        let context = Context::new().with("workspace", "C:/proj1/scenes");
        let subst = LeafSubstitution::new(&context);
        let merged = merge(
            json!({}),
            json!({"path": "<workspace>/<asset_id>/<asset_id>.ma"}),
            Some(&subst),
        )
        .unwrap();
        assert_eq!(
            merged,
            json!({"path": "C:/proj1/scenes/<asset_id>/<asset_id>.ma"})
        );
    }
}
