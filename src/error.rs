//! Error types for the few fallible operations outside the measurement path.
//!
//! Nothing on the per-frame path returns an error: missing capabilities
//! degrade to empty report fields instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading configuration or exporting results.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to read config file '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config value for {field}: {value}")]
    InvalidConfig { field: &'static str, value: f64 },

    #[error("failed to create results directory '{path}': {source}")]
    ResultsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no window reports to save")]
    NothingToSave,
}

pub type Result<T> = std::result::Result<T, HarnessError>;
