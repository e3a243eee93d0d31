//! Error types for Seedwright Core

use thiserror::Error;

/// Result type alias using Seedwright's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Export error types
///
/// Every variant is fatal to the export that raised it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Identity error: {0}")]
    Identity(String),

    #[error("Temporal parse error: cannot reparse '{value}' for field '{field}'")]
    TemporalParse { field: String, value: String },

    #[error("Reflection error: {0}")]
    Reflection(String),

    #[error("YAML rendering error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn identity(msg: impl Into<String>) -> Self {
        Self::Identity(msg.into())
    }

    pub(crate) fn reflection(msg: impl Into<String>) -> Self {
        Self::Reflection(msg.into())
    }
}
