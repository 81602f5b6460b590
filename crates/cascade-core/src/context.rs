//! Field values driving template substitution

use std::collections::BTreeMap;

/// Caller-supplied mapping from template token to concrete value.
///
/// Keys are stored in bracketed token form (`<episode>`); the insertion
/// methods accept either `episode` or `<episode>`. Iteration order is
/// sorted, so substitution is deterministic.
///
/// A context is immutable for the duration of a resolution call: the
/// template matcher clones it before handing it to a transform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field value. `field` may be bare (`episode`) or already
    /// bracketed (`<episode>`).
    pub fn insert(&mut self, field: impl AsRef<str>, value: impl Into<String>) {
        self.values.insert(bracket(field.as_ref()), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    /// Look up a field value. `field` may be bare or bracketed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(&bracket(field)).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(&bracket(field))
    }

    /// Iterate `(token, value)` pairs; tokens are in bracketed form.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn bracket(field: &str) -> String {
    if field.starts_with('<') && field.ends_with('>') {
        field.to_string()
    } else {
        format!("<{field}>")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Context {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut context = Self::new();
        for (field, value) in iter {
            context.insert(field.into(), value);
        }
        context
    }
}
