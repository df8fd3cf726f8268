use std::path::PathBuf;

use scenesheet_core::error::CoreError;

/// Errors that abort a sync run.
///
/// Wraps [`CoreError`] for domain errors and adds file and environment
/// variants that carry the offending path or variable.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A domain-level error from `scenesheet_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A file could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A file did not contain the expected JSON.
    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A required environment variable is unset or blank.
    #[error("{0} environment variable is required")]
    MissingEnv(&'static str),

    /// An environment variable could not be parsed.
    #[error("{var} has invalid value {value:?}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Convenience type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
