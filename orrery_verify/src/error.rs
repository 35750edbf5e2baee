//! Error types for the verification pass.
//!
//! Only failures that leave nothing to verify live here. Per-timestep
//! problems never abort a run; they become [`crate::DiagnosticEvent`]s.

use orrery_env::EnvError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    /// The reference source could not be listed
    #[error("Source error: {0}")]
    Source(#[from] EnvError),

    /// Configuration is unreadable or inconsistent
    #[error("Config error: {0}")]
    Config(String),

    /// Writing an export failed
    #[error("Export error at {path}: {source}")]
    Export {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VerifyError {
    /// Creates a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an export error tagged with the output path.
    pub fn export(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Export {
            path: path.display().to_string(),
            source,
        }
    }
}
