//! Error types for table operations.

use thiserror::Error;

/// Errors raised by column, row, frame and quality-check operations.
#[derive(Debug, Error)]
pub enum TableError {
    /// A referenced column is absent from the table.
    #[error("column '{column}' not found (available: {})", .available.join(", "))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    /// Comparison operator outside the supported set.
    #[error("unsupported operator '{operator}' (supported: {})", .supported.join(", "))]
    UnsupportedOperator {
        operator: String,
        supported: Vec<&'static str>,
    },

    /// Mutually exclusive or jointly-required arguments were violated.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A polymorphic argument had the wrong shape.
    #[error("type error: {message}")]
    Type { message: String },

    /// An argument was outside its domain.
    #[error("value error: {message}")]
    Value { message: String },

    /// A named function or reducer is not recognized.
    #[error("unknown function '{name}' (available: {})", .available.join(", "))]
    UnknownFunction {
        name: String,
        available: Vec<String>,
    },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl TableError {
    /// Build an [`TableError::InvalidArgument`] from any message.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Build a [`TableError::Type`] from any message.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type {
            message: message.into(),
        }
    }

    /// Build a [`TableError::Value`] from any message.
    pub fn value_error(message: impl Into<String>) -> Self {
        Self::Value {
            message: message.into(),
        }
    }
}

impl From<polars::prelude::PolarsError> for TableError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;
