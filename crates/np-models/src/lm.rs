//! Linear regression models
//!
//! This module provides the ordinary least squares fit used by the
//! resampling tests, along with row-subset and weighted variants:
//! - [`fit`]: OLS of `y` on `x`
//! - [`fit_rows`]: OLS on a selection of rows, repeats allowed
//! - [`fit_weighted`]: weighted least squares via `sqrt(w)` row scaling
//! - [`lm`]: OLS of a [`ModelSpec`]'s full model on a dataset

pub mod ols;
pub mod result;


pub use ols::{Matrix, OlsSolver, TestStatistic, Vector, SINGULARITY_TOLERANCE};
pub use result::LinearRegressionResult;

use ndarray::{ArrayView2, Axis};

use crate::base::{ModelError, Result};
use np_core::data::DataFrame;
use np_core::design::ModelSpec;

/// Convenience function for OLS regression
pub fn fit(y: &Vector, x: &Matrix) -> Result<LinearRegressionResult> {
    OlsSolver::new(x.clone())?.fit(y)
}

/// OLS on the rows of `(y, x)` at `rows`, in that order
pub fn fit_rows(
    y: &Vector,
    x: ArrayView2<'_, f64>,
    rows: &[usize],
) -> Result<LinearRegressionResult> {
    if y.len() != x.nrows() {
        return Err(ModelError::shape(
            format!("response of length {}", x.nrows()),
            format!("response of length {}", y.len()),
        ));
    }
    let solver = OlsSolver::on_rows(x, rows)?;
    solver.fit(&y.select(Axis(0), rows))
}

/// Weighted least squares with non-negative weights `w`
///
/// Rows of `y` and `x` are scaled by `sqrt(w)` and fitted by OLS, so the
/// residuals and fitted values are on the weighted scale.
pub fn fit_weighted(y: &Vector, x: &Matrix, w: &Vector) -> Result<LinearRegressionResult> {
    if w.len() != y.len() || x.nrows() != y.len() {
        return Err(ModelError::shape(
            format!("{} rows in y, x and w", y.len()),
            format!("x has {} rows, w has {}", x.nrows(), w.len()),
        ));
    }
    if w.iter().any(|&wi| !(wi.is_finite() && wi >= 0.0)) {
        return Err(ModelError::InvalidConfig {
            message: "weights must be finite and non-negative".to_string(),
        });
    }

    let sqrt_w = w.mapv(f64::sqrt);
    let y_w = y * &sqrt_w;
    let x_w = x * &sqrt_w.view().insert_axis(Axis(1));
    fit(&y_w, &x_w)
}

/// Fit the full model of `spec` on `data`
pub fn lm(spec: &ModelSpec, data: &DataFrame) -> Result<LinearRegressionResult> {
    let design = spec.build(data)?;
    OlsSolver::from_design(&design.full)?.fit(&design.response)
}

/// Share of the reduced model's residual variance explained by the test term
///
/// `(RSS_reduced - RSS_full) / RSS_reduced`
pub fn partial_r_squared(rss_reduced: f64, rss_full: f64) -> f64 {
    (rss_reduced - rss_full) / rss_reduced
}
