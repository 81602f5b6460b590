//! Error types for cascade-core

/// Result type for cascade-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during configuration resolution
///
/// "Not found / not matched" outcomes are deliberately NOT errors; the
/// template matcher and key resolver signal them with `None`. Errors are
/// reserved for I/O failures and inputs that violate the data model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No truncation level of the template named an existing file.
    #[error("no configuration file matched template '{template}' under {directory}")]
    NoKeyFile { template: String, directory: String },

    /// A keyed sequence merge met an override element that is not a
    /// mapping carrying the identity key.
    #[error("keyed sequence merge requires mapping elements with a 'name' key: {message}")]
    KeyedMergeShape { message: String },

    /// No project-level config file matched any candidate pattern.
    #[error("no project config file was found under {root}")]
    NoProjectConfig { root: String },

    /// An invalid file pattern was built for project config lookup.
    #[error("invalid config file pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Filesystem error from cascade-fs
    #[error(transparent)]
    Fs(#[from] cascade_fs::Error),
}
