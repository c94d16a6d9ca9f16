//! Core data structures for NonParam
//!
//! `data` holds the tabular dataset handed over by the data-preparation
//! layer, `design` turns it into the numeric matrices consumed by the
//! regression and resampling code in `np-models`.

pub mod data;
pub mod design;
pub mod error;

pub use error::{NonParamError, Result};
