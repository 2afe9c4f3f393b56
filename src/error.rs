//! @ai:module:intent Define error types for annotation parsing and process binding
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for all annotation operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed option text inside a section
    #[error("Invalid option format at line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("Invalid output declaration: {0}")]
    InvalidOutput(String),

    #[error("Invalid value for config field {name}: {message}")]
    InvalidConfigValue { name: String, message: String },

    #[error("The process behind this annotation no longer exists")]
    DetachedProcess,

    #[error("The process behind this annotation is being modified")]
    ProcessBusy,

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// @ai:intent Build a format error for a 1-based line of option text
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }

    /// @ai:intent Check if this error comes from malformed annotation text
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
