//! Residual permutation test
//!
//! The reduced model is fitted once; each permutation shuffles its residuals
//! and adds them back to its fitted values, giving a response drawn under the
//! null hypothesis that the test term has no effect. The full model is then
//! refitted on that response through a single precomputed `(X'X)^{-1}`.

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::{map_columns, two_sided_p_value, CancellationToken, PermutationSet, ResamplingConfig};
use crate::base::{ModelError, Result};
use crate::lm::{partial_r_squared, OlsSolver, Vector};
use np_core::design::ModelDesign;

/// Statistics of one permutation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermutationOutcome {
    /// Observed t-statistic of the test term
    pub t: f64,
    pub full_r2: f64,
    pub partial_r2: f64,
    /// Two-sided permutation p-value
    pub p_value: f64,
    /// Observed statistic followed by one statistic per permutation
    pub distribution: Vec<f64>,
}

/// Permutation test over a built design
#[derive(Debug, Clone)]
pub struct PermutationTest<'a> {
    design: &'a ModelDesign,
    config: ResamplingConfig,
    token: CancellationToken,
}

impl<'a> PermutationTest<'a> {
    pub fn new(design: &'a ModelDesign) -> Self {
        Self {
            design,
            config: ResamplingConfig::default(),
            token: CancellationToken::default(),
        }
    }

    pub fn config(mut self, config: ResamplingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    #[instrument(skip_all, fields(
        test = %self.design.test_name,
        n_rows = self.design.nrows(),
        n_resamples = perms.n_resamples()
    ))]
    pub fn run(&self, perms: &PermutationSet) -> Result<PermutationOutcome> {
        self.config.validate()?;

        let design = self.design;
        if perms.n_rows() != design.nrows() {
            return Err(ModelError::shape(
                format!("permutation set with {} rows", design.nrows()),
                format!("{} rows", perms.n_rows()),
            ));
        }

        let reduced = OlsSolver::from_design(&design.reduced)?.fit(&design.response)?;
        let solver = OlsSolver::from_design(&design.full)?;
        let full = solver.fit(&design.response)?;

        let k = design.test_column;
        let observed = full.t_statistics[k];
        let full_r2 = full.r_squared();
        let partial_r2 = partial_r_squared(reduced.rss, full.rss);
        debug!(t = observed, full_r2, partial_r2, "observed fit");

        let token = self.config.arm(self.token.clone());
        let fitted = &reduced.fitted_values;
        let residuals = &reduced.residuals;

        let permuted = map_columns(perms.n_resamples(), self.config.parallel, &token, |col| {
            let y_star: Vector = fitted
                .iter()
                .zip(perms.column(col).iter())
                .map(|(&f, &pos)| f + residuals[pos])
                .collect();
            solver.t_statistic(&y_star, k)
        });
        let permuted = match permuted {
            Err(ModelError::Cancelled) => {
                warn!("permutation test cancelled");
                return Err(ModelError::Cancelled);
            }
            other => other?,
        };

        let mut distribution = Vec::with_capacity(permuted.len() + 1);
        distribution.push(observed);
        distribution.extend(permuted);

        let p_value = two_sided_p_value(&distribution);
        info!(t = observed, p_value, "permutation test finished");

        Ok(PermutationOutcome {
            t: observed,
            full_r2,
            partial_r2,
            p_value,
            distribution,
        })
    }
}
