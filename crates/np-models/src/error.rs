//! Model-related error types

use thiserror::Error;

use np_core::data::{DataError, RowLabel};
use np_core::design::DesignError;

/// Model-related errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// Design matrix could not be built
    #[error("Design error: {0}")]
    Design(#[from] DesignError),

    /// Data-related error
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Numerical computation error
    #[error("Numerical error: {message} (operation: {operation})")]
    NumericalError {
        /// Error message
        message: String,
        /// Operation that failed
        operation: String,
    },

    /// Insufficient data for model fitting
    #[error("Not enough data: {n_samples} samples for {n_predictors} predictors")]
    InsufficientData {
        /// Number of samples
        n_samples: usize,
        /// Number of predictors
        n_predictors: usize,
    },

    /// X'X is not positive definite
    #[error("Singular matrix encountered")]
    SingularMatrix,

    /// Array shapes disagree, or a permutation column is not a permutation
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// Bootstrap set references a row label absent from the dataset
    #[error("Unknown row identifier {0} in bootstrap set")]
    UnknownRowIdentifier(RowLabel),

    /// Run stopped by its cancellation token or deadline
    #[error("Resampling run cancelled")]
    Cancelled,

    /// Invalid model configuration
    #[error("Invalid model configuration: {message}")]
    InvalidConfig {
        /// Configuration error message
        message: String,
    },

    /// Record serialisation failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ModelError {
    pub(crate) fn shape(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        ModelError::ShapeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
