//! Design-matrix error types

use crate::data::DataError;
use thiserror::Error;

/// Errors that can occur while turning a dataset into model matrices
#[derive(Debug, Error)]
pub enum DesignError {
    /// A referenced column is absent from the dataset
    #[error("Column '{column}' not found in dataset. Available columns: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// Column type cannot be encoded the way the term needs it
    #[error("Column '{column}' has type {actual}, but {expected} was expected")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        actual: String,
    },

    /// Encoding would produce no column, or not the single column required
    #[error("Cannot encode '{column}': {reason}")]
    CollinearEncoding { column: String, reason: String },

    /// NaN in a column used by the model
    #[error("Column '{column}' contains {count} missing value(s)")]
    MissingValues { column: String, count: usize },

    /// Errors from the data layer
    #[error("Data error in design construction: {0}")]
    Data(#[from] DataError),
}

/// Result type alias for design operations
pub type DesignResult<T> = std::result::Result<T, DesignError>;

impl DesignError {
    /// Create a missing column error listing what the dataset does have
    pub fn missing_column(column: &str, available: &[&str]) -> Self {
        DesignError::MissingColumn {
            column: column.to_string(),
            available: available.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create a collinear encoding error
    pub fn collinear(column: &str, reason: impl Into<String>) -> Self {
        DesignError::CollinearEncoding {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}
