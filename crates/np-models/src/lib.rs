//! Regression models and resampling tests for NonParam
//!
//! `lm` fits ordinary least squares on the design matrices built by
//! `np_core::design`. `resample` wraps those fits in permutation and
//! bootstrap procedures and flattens their outcome into result records.

pub mod base;
pub mod error;
pub mod lm;
pub mod resample;

pub use base::Result;
pub use error::ModelError;
pub use resample::{
    run_reg_boots, run_reg_boots_with, run_reg_perms, run_reg_perms_with, BootstrapSet,
    PermutationSet, ResamplingConfig, ResultRecord, ResultTable,
};
