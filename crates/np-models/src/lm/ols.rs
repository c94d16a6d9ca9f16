//! Ordinary Least Squares (OLS) linear regression
//!
//! [`OlsSolver`] factorises `X'X` once and can then be applied to any number
//! of response vectors. The permutation test relies on this: only the
//! response changes between resamples, so `(X'X)^{-1}` is computed a single
//! time and every refit is two matrix-vector products.

use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::base::{ModelError, Result};
use crate::lm::result::LinearRegressionResult;
use np_core::data::DataError;
use np_core::design::DesignMatrix;

// ==================== Type Definitions ====================

/// Matrix type alias for 2D arrays
pub type Matrix = Array2<f64>;

/// Vector type alias for 1D arrays
pub type Vector = Array1<f64>;

/// Smallest Cholesky pivot, relative to the matching diagonal entry of X'X,
/// accepted as non-singular
pub const SINGULARITY_TOLERANCE: f64 = 1e-10;

/// Statistic of a single coefficient, as recomputed on each resample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestStatistic {
    /// β_k / se_k
    pub t: f64,
    /// Residual sum of squares of the fit
    pub rss: f64,
}

// ==================== Solver ====================

/// Design matrix with a precomputed `(X'X)^{-1}`
#[derive(Debug, Clone)]
pub struct OlsSolver {
    x: Matrix,
    xtx_inv: Matrix,
    names: Vec<String>,
}

impl OlsSolver {
    /// Factorise `X'X`; columns are named `x0, x1, ...`
    pub fn new(x: Matrix) -> Result<Self> {
        let (n, p) = x.dim();

        if p == 0 {
            return Err(ModelError::InvalidConfig {
                message: "design matrix has no columns".to_string(),
            });
        }

        if n <= p {
            return Err(ModelError::InsufficientData {
                n_samples: n,
                n_predictors: p,
            });
        }

        let xtx_inv = invert_gram(&x)?;
        let names = (0..p).map(|j| format!("x{}", j)).collect();

        Ok(Self { x, xtx_inv, names })
    }

    /// Solver over a named design matrix
    pub fn from_design(design: &DesignMatrix) -> Result<Self> {
        Self::new(design.values().clone())?.with_names(design.names().to_vec())
    }

    /// Solver over the rows of `x` at `rows`, in that order; rows may repeat
    pub fn on_rows(x: ArrayView2<'_, f64>, rows: &[usize]) -> Result<Self> {
        check_rows(rows, x.nrows())?;
        Self::new(x.select(Axis(0), rows))
    }

    /// Replace the column names
    pub fn with_names(mut self, names: Vec<String>) -> Result<Self> {
        if names.len() != self.ncols() {
            return Err(ModelError::shape(
                format!("{} column names", self.ncols()),
                format!("{} column names", names.len()),
            ));
        }
        self.names = names;
        Ok(self)
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.x.ncols()
    }

    /// Residual degrees of freedom, n - p
    pub fn df_residual(&self) -> usize {
        self.nrows() - self.ncols()
    }

    pub fn x(&self) -> &Matrix {
        &self.x
    }

    pub fn xtx_inv(&self) -> &Matrix {
        &self.xtx_inv
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Full OLS fit of `y` on this design
    pub fn fit(&self, y: &Vector) -> Result<LinearRegressionResult> {
        let solution = self.solve(y)?;

        let df = self.df_residual();
        let sigma2 = solution.rss / df as f64;
        let standard_errors = self.xtx_inv.diag().mapv(|v| (sigma2 * v).sqrt());

        let t_statistics: Vector = solution
            .beta
            .iter()
            .zip(standard_errors.iter())
            .map(|(&b, &se)| b / se)
            .collect();

        let t_dist = StudentsT::new(0.0, 1.0, df as f64).map_err(|e| {
            ModelError::NumericalError {
                message: format!("Failed to create t-distribution: {}", e),
                operation: "fit".to_string(),
            }
        })?;
        let p_values = t_statistics.mapv(|t| two_sided_t_p_value(&t_dist, t));

        let y_mean = y.mean().unwrap_or(0.0);
        let tss = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum::<f64>();

        Ok(LinearRegressionResult {
            coefficients: solution.beta,
            standard_errors,
            t_statistics,
            p_values,
            fitted_values: solution.fitted,
            residuals: solution.residuals,
            y: y.clone(),
            variable_names: self.names.clone(),
            rss: solution.rss,
            tss,
            df_residual: df,
        })
    }

    /// t-statistic of coefficient `k` and the RSS, without the rest of the fit
    ///
    /// Uses the same arithmetic as [`OlsSolver::fit`], so the two agree
    /// exactly.
    pub fn test_statistic(&self, y: &Vector, k: usize) -> Result<TestStatistic> {
        if k >= self.ncols() {
            return Err(ModelError::shape(
                format!("coefficient index below {}", self.ncols()),
                format!("index {}", k),
            ));
        }

        let solution = self.solve(y)?;
        let sigma2 = solution.rss / self.df_residual() as f64;
        let se = (sigma2 * self.xtx_inv[[k, k]]).sqrt();

        Ok(TestStatistic {
            t: solution.beta[k] / se,
            rss: solution.rss,
        })
    }

    /// t-statistic of coefficient `k`
    pub fn t_statistic(&self, y: &Vector, k: usize) -> Result<f64> {
        self.test_statistic(y, k).map(|s| s.t)
    }

    /// Residual sum of squares of `y` on this design
    pub fn rss(&self, y: &Vector) -> Result<f64> {
        self.solve(y).map(|s| s.rss)
    }

    fn solve(&self, y: &Vector) -> Result<Solution> {
        if y.len() != self.nrows() {
            return Err(ModelError::shape(
                format!("response of length {}", self.nrows()),
                format!("response of length {}", y.len()),
            ));
        }

        let beta = self.xtx_inv.dot(&self.x.t().dot(y));
        let fitted = self.x.dot(&beta);
        let residuals = y - &fitted;
        let rss = residuals.dot(&residuals);

        Ok(Solution {
            beta,
            fitted,
            residuals,
            rss,
        })
    }
}

struct Solution {
    beta: Vector,
    fitted: Vector,
    residuals: Vector,
    rss: f64,
}

/// `(X'X)^{-1}` through a Cholesky factorisation
fn invert_gram(x: &Matrix) -> Result<Matrix> {
    let xtx = x.t().dot(x);
    let p = xtx.nrows();

    if xtx.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::NumericalError {
            message: "X'X contains non-finite entries".to_string(),
            operation: "invert_gram".to_string(),
        });
    }

    let gram = DMatrix::from_fn(p, p, |i, j| xtx[[i, j]]);
    let chol = gram.clone().cholesky().ok_or(ModelError::SingularMatrix)?;

    let l = chol.l_dirty();
    for i in 0..p {
        let diag = gram[(i, i)];
        let pivot = l[(i, i)] * l[(i, i)];
        if !(diag > 0.0 && pivot >= SINGULARITY_TOLERANCE * diag) {
            return Err(ModelError::SingularMatrix);
        }
    }

    let inv = chol.inverse();
    Ok(Matrix::from_shape_fn((p, p), |(i, j)| inv[(i, j)]))
}

pub(crate) fn check_rows(rows: &[usize], n: usize) -> Result<()> {
    match rows.iter().find(|&&r| r >= n) {
        Some(&bad) => Err(DataError::IndexOutOfBounds { index: bad, len: n }.into()),
        None => Ok(()),
    }
}

/// `2 * (1 - F(|t|))` clamped to `[0, 1]`
pub(crate) fn two_sided_t_p_value(dist: &StudentsT, t: f64) -> f64 {
    if t.is_nan() {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0)
}
