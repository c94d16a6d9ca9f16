//! Core types shared by the models
//!
//! This module defines the result alias and the per-coefficient summary
//! used across the regression and resampling code.

pub use coefficient::Coefficient;

pub use crate::error::ModelError;

pub mod coefficient;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
