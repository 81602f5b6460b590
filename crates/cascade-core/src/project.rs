//! Project-level environment assembly
//!
//! Where the resolver works from one filename template, the project
//! manager works from a conventional directory of versioned config
//! files (`<name>.v001.yml`, `<name>.v002.yml`, …) and assembles the
//! environment for a (project, variation, optional tool) selection:
//! the most specific versioned key file is located per pattern, every
//! key file is expanded through its override chain, and the combined
//! file list is folded into one configuration.

use crate::chain;
use crate::error::{Error, Result};
use crate::merge;
use cascade_fs::{DocumentStore, NormalizedPath, io};
use globset::Glob;
use serde_json::{Map, Value};

/// The assembled environment for one selection.
#[derive(Debug, Clone)]
pub struct ProjectEnvironment {
    /// Key config files, least specific first.
    pub key_files: Vec<NormalizedPath>,
    /// Every file that contributed, chains expanded, in merge order.
    pub config_files: Vec<NormalizedPath>,
    /// The folded configuration.
    pub config: Value,
}

/// Assembles project environments from a root directory of versioned
/// config files.
pub struct ProjectManager {
    root: NormalizedPath,
    store: DocumentStore,
}

impl ProjectManager {
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self {
            root: root.into(),
            store: DocumentStore::new(),
        }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Locate the key config files for a selection.
    ///
    /// Project patterns are probed in increasing specificity
    /// (`base.v*`, `<project>.v*`, `base.<variation>.v*`,
    /// `<project>.<variation>.v*`) and the most specific pattern with
    /// a match wins; within a pattern the lexically-highest version is
    /// taken. A tool selection contributes a second key file from the
    /// most specific of its own patterns.
    pub fn key_config_files(
        &self,
        project: &str,
        variation: &str,
        tool: Option<&str>,
    ) -> Result<Vec<NormalizedPath>> {
        let names = io::list_file_names(&self.root)?;

        let project_patterns = [
            "base.v*.yml".to_string(),
            format!("{project}.v*.yml"),
            format!("base.{variation}.v*.yml"),
            format!("{project}.{variation}.v*.yml"),
        ];

        let mut candidates = Vec::new();
        for pattern in &project_patterns {
            if let Some(name) = newest_match(pattern, &names)? {
                candidates.push(name);
            }
        }
        let Some(key_name) = candidates.pop() else {
            return Err(Error::NoProjectConfig {
                root: self.root.as_str().to_string(),
            });
        };

        let mut key_files = vec![self.root.join(&key_name)];

        if let Some(tool) = tool {
            let tool_patterns = [
                format!("{tool}.{project}.{variation}.v*.yml"),
                format!("{tool}.{project}.v*.yml"),
                format!("{tool}.v*.yml"),
            ];
            for pattern in &tool_patterns {
                if let Some(name) = newest_match(pattern, &names)? {
                    key_files.push(self.root.join(&name));
                    break;
                }
            }
        }

        Ok(key_files)
    }

    /// Assemble the environment for a selection.
    pub fn load(
        &self,
        project: &str,
        variation: &str,
        tool: Option<&str>,
    ) -> Result<ProjectEnvironment> {
        let key_files = self.key_config_files(project, variation, tool)?;

        let mut config_files = Vec::new();
        for key_file in &key_files {
            config_files.extend(chain::expand_chain(&self.store, key_file, None)?);
        }
        tracing::debug!(
            key_files = key_files.len(),
            config_files = config_files.len(),
            "project environment assembled"
        );

        let mut config = Value::Object(Map::new());
        for file in &config_files {
            let document = self.store.read(file)?;
            if document.data.is_null() {
                continue;
            }
            config = merge::merge(config, document.data, None)?;
        }

        Ok(ProjectEnvironment {
            key_files,
            config_files,
            config,
        })
    }
}

/// The lexically-highest file name matching a version glob, if any.
fn newest_match(pattern: &str, names: &[String]) -> Result<Option<String>> {
    let matcher = Glob::new(pattern)
        .map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?
        .compile_matcher();

    let mut matches: Vec<&String> = names.iter().filter(|name| matcher.is_match(name)).collect();
    matches.sort();
    Ok(matches.pop().cloned())
}
