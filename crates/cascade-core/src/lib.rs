//! Layered configuration resolution engine for Cascade
//!
//! Resolves a template-named set of configuration documents into one
//! merged configuration for a given context (a set of named field values
//! such as episode/scene/cut identifiers):
//!
//! 1. The **key resolver** matches a filename template against the files
//!    in a directory, progressively relaxing the template to find the
//!    most specific config file the context can name.
//! 2. The **chain walker** expands that file into an ordered override
//!    chain by following `info.parent` references.
//! 3. The **merge engine** folds the chain's payloads together with
//!    deep-merge and list-merge-by-key semantics, optionally substituting
//!    context tokens into string leaves.
//! 4. The **provenance tracer** can tag each merged leaf with the file
//!    that contributed it.
//!
//! # Example
//!
//! ```ignore
//! use cascade_core::{CascadeResolver, Context};
//!
//! let context = Context::new()
//!     .with("episode", "ep01")
//!     .with("scene", "s01");
//! let resolver = CascadeResolver::new("/shows/proj/env").with_context(context);
//! let config = resolver.resolve("<episode>_<scene>_<cut>_<progress>", true)?;
//! ```

pub mod chain;
pub mod context;
pub mod error;
pub mod merge;
pub mod project;
pub mod resolver;
pub mod template;
pub mod trace;
pub mod transform;

pub use chain::{MAX_CHAIN_HOPS, expand_chain};
pub use context::Context;
pub use error::{Error, Result};
pub use merge::{LeafSubstitution, merge};
pub use project::{ProjectEnvironment, ProjectManager};
pub use resolver::CascadeResolver;
pub use trace::{DEFAULT_SPLITTER, ProvenanceTracer, file_label};
pub use transform::{TokenTransform, TransformRegistry};
