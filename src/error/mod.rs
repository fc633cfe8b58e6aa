//! Error handling for the demographic series pipeline.

use std::io;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

pub mod util;

/// Specialized error type for pipeline operations
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Error opening, reading or writing a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error in an Arrow compute kernel or batch construction
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error reading or writing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error (de)serializing JSON configuration or reports
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error converting records to or from record batches
    #[error("Record conversion error: {0}")]
    SerdeArrow(#[from] serde_arrow::Error),

    /// A required column is missing from an input table
    #[error("Schema error: column '{column}' not found in table '{table}'")]
    Schema {
        /// Identity of the table that was inspected
        table: String,
        /// The missing column
        column: String,
    },

    /// A filter could not be evaluated against a column
    #[error("Filter error: {0}")]
    Filter(String),

    /// Invalid pipeline configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A background loading task failed to complete
    #[error("Task error: {0}")]
    Task(String),
}

impl PipelineError {
    /// Create a schema error for a missing column
    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Create a filter error
    pub fn filter(message: impl Into<String>) -> Self {
        Self::Filter(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error invalidates the whole input rather than one region
    #[must_use]
    pub const fn is_schema_level(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
