//! Key-file resolution and the full resolution pipeline
//!
//! `CascadeResolver` ties the components together for one config
//! directory and one context: find the most specific key file for a
//! template, expand it into an override chain, and fold the chain into
//! a single merged configuration.

use crate::chain;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::merge::{self, LeafSubstitution};
use crate::template;
use crate::trace::{self, ProvenanceTracer};
use crate::transform::{TokenTransform, TransformRegistry};
use cascade_fs::{DocumentStore, NormalizedPath, io};
use serde_json::{Map, Value};

/// Extensions probed for key files, most preferred first.
const KEY_FILE_EXTENSIONS: [&str; 2] = ["yml", "json"];

/// Resolves layered configuration for one directory and context.
///
/// The resolver owns no mutable state across calls; documents are read
/// fresh on every resolution.
pub struct CascadeResolver {
    directory: NormalizedPath,
    context: Context,
    store: DocumentStore,
    transforms: TransformRegistry,
    active_transform: Option<String>,
    tracer: ProvenanceTracer,
}

impl CascadeResolver {
    pub fn new(directory: impl Into<NormalizedPath>) -> Self {
        Self {
            directory: directory.into(),
            context: Context::new(),
            store: DocumentStore::new(),
            transforms: TransformRegistry::new(),
            active_transform: None,
            tracer: ProvenanceTracer::new(),
        }
    }

    /// Set the field values used for template substitution.
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Supply the transform registry available to this resolver.
    pub fn with_transforms(mut self, transforms: TransformRegistry) -> Self {
        self.transforms = transforms;
        self
    }

    /// Select a registered transform by name for substitution calls.
    pub fn with_transform(mut self, name: impl Into<String>) -> Self {
        self.active_transform = Some(name.into());
        self
    }

    /// Override the provenance delimiter.
    pub fn with_splitter(mut self, splitter: impl Into<String>) -> Self {
        self.tracer = ProvenanceTracer::with_splitter(splitter);
        self
    }

    pub fn directory(&self) -> &NormalizedPath {
        &self.directory
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    fn transform(&self) -> Option<&dyn TokenTransform> {
        self.active_transform
            .as_deref()
            .and_then(|name| self.transforms.get(name))
    }

    /// Find the most specific existing key file for a template.
    ///
    /// The template is split on underscores and relaxed segment by
    /// segment from the right; the first truncation level whose
    /// substituted name exists in the directory wins, probing `.yml`
    /// before `.json`. `Ok(None)` when no level matches.
    pub fn key_file(&self, template: &str) -> Result<Option<NormalizedPath>> {
        let names = io::list_file_names(&self.directory)?;
        let segments: Vec<&str> = template.split('_').collect();

        for dropped in 0..segments.len() {
            let candidate_template = if dropped == 0 {
                template.to_string()
            } else {
                segments[..segments.len() - dropped].join("_")
            };
            // forced substitution always yields a string; unresolved
            // tokens stay literal and simply never match a file name
            let candidate = template::substitute_with(
                &candidate_template,
                &self.context,
                true,
                self.transform(),
            )
            .unwrap_or(candidate_template);

            for extension in KEY_FILE_EXTENSIONS {
                let file_name = format!("{candidate}.{extension}");
                if names.iter().any(|name| name == &file_name) {
                    tracing::debug!(key_file = %file_name, dropped, "key file resolved");
                    return Ok(Some(self.directory.join(&file_name)));
                }
            }
        }

        Ok(None)
    }

    /// Expand a key file into its override chain, root-first.
    pub fn expand_chain(&self, start: &NormalizedPath) -> Result<Vec<NormalizedPath>> {
        chain::expand_chain(&self.store, start, Some(&self.context))
    }

    /// Fold a chain's payloads into one merged configuration.
    ///
    /// Documents with an absent/null payload contribute nothing. With
    /// `substitute` true, string leaves are run through template
    /// substitution and `@` path-marker resolution.
    pub fn fold_chain(&self, files: &[NormalizedPath], substitute: bool) -> Result<Value> {
        let substitution = substitute
            .then(|| LeafSubstitution::new(&self.context).with_directory(&self.directory));

        let mut merged = Value::Object(Map::new());
        for file in files {
            let document = self.store.read(file)?;
            if document.data.is_null() {
                tracing::debug!(file = %file, "document has no payload, skipping");
                continue;
            }
            merged = merge::merge(merged, document.data, substitution.as_ref())?;
        }
        Ok(merged)
    }

    /// Full pipeline: key file, chain, fold.
    pub fn resolve(&self, template: &str, substitute: bool) -> Result<Value> {
        let key_file = self.key_file(template)?.ok_or_else(|| Error::NoKeyFile {
            template: template.to_string(),
            directory: self.directory.as_str().to_string(),
        })?;
        let files = self.expand_chain(&key_file)?;
        self.fold_chain(&files, substitute)
    }

    /// Annotate a merged configuration with the contributing file of
    /// every leaf, using the chain the configuration was folded from.
    pub fn annotate(&self, merged: Value, files: &[NormalizedPath]) -> Result<Value> {
        let mut documents = Vec::with_capacity(files.len());
        for file in files {
            let document = self.store.read(file)?;
            documents.push((trace::file_label(file), document.data));
        }
        Ok(self.tracer.annotate(merged, &documents))
    }
}
