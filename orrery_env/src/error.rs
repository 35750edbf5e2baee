//! Error types for the Orrery data-source layer.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur while listing or reading snapshot sources.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Source root does not exist or is not a directory
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    /// Filesystem operation failed
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// No unit is stored under this time token
    #[error("Unknown time token: {0}")]
    UnknownToken(String),
}

impl EnvError {
    /// Creates an I/O error tagged with the offending path.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Creates a not-found error for a source root.
    pub fn not_found(path: &Path) -> Self {
        Self::SourceNotFound(path.display().to_string())
    }
}
