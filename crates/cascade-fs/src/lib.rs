//! Filesystem collaborator for Cascade
//!
//! Provides normalized cross-platform path handling and the I/O layer for
//! layered configuration documents: reading and writing `{info, data}`
//! documents by extension, and listing candidate file names for the
//! resolution engine.

pub mod error;
pub mod io;
pub mod path;
pub mod store;

pub use error::{Error, Result};
pub use path::NormalizedPath;
pub use store::{ConfigDocument, DocumentInfo, DocumentStore};
