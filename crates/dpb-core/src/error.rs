//! Pipeline error types.

use std::path::PathBuf;

use thiserror::Error;

use dpb_ingest::IngestError;
use dpb_model::TableError;

/// Errors raised while loading, validating or running a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    // === Configuration Errors ===
    /// Configuration file does not exist.
    #[error("configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration extension is not JSON or YAML.
    #[error(
        "unsupported configuration format '{extension}' for {path} (supported: .json, .yaml, .yml)"
    )]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// Configuration could not be read or parsed.
    #[error("failed to parse configuration {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Configuration could not be written.
    #[error("failed to write configuration {path}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration is missing required fields, has the wrong shape or
    /// names an unknown operation.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    // === Execution Errors ===
    /// Input or output table could not be read or written.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// An operation failed; `index` is zero-based.
    #[error("step {} ({operation}) failed: {source}", .index + 1)]
    Step {
        index: usize,
        operation: String,
        #[source]
        source: TableError,
    },
}

impl PipelineError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
