//! Pluggable per-token transforms
//!
//! A transform derives additional context fields when substitution
//! leaves tokens unresolved, typically splitting a composite value
//! (`s01c01`) into sub-fields addressed by modifier tokens
//! (`<shot{scene}>`, `<shot{cut}>`).
//!
//! Transforms are supplied by the caller through a named registry and
//! selected by identifier; no code is ever loaded at runtime.

use crate::context::Context;
use std::collections::HashMap;

/// Hook invoked by the template matcher when tokens remain unresolved.
///
/// `unresolved` lists the tokens still present in the partially
/// substituted template; the transform may insert derived key/value
/// pairs into `context`. The matcher retries substitution once
/// afterwards. The context passed in is a private copy; mutating it
/// never affects the caller's context.
pub trait TokenTransform: Send + Sync {
    fn apply(&self, unresolved: &[String], context: &mut Context);
}

impl<F> TokenTransform for F
where
    F: Fn(&[String], &mut Context) + Send + Sync,
{
    fn apply(&self, unresolved: &[String], context: &mut Context) {
        self(unresolved, context)
    }
}

/// Named registry of transforms, populated at construction time.
#[derive(Default)]
pub struct TransformRegistry {
    transforms: HashMap<String, Box<dyn TokenTransform>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transform under a name, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, transform: impl TokenTransform + 'static) {
        self.transforms.insert(name.into(), Box::new(transform));
    }

    /// Look up a transform by name.
    pub fn get(&self, name: &str) -> Option<&dyn TokenTransform> {
        self.transforms.get(name).map(Box::as_ref)
    }

    /// Names of all registered transforms, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transforms.keys().map(String::as_str).collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("transforms", &self.names())
            .finish()
    }
}
