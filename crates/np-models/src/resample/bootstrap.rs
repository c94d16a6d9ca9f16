//! Row bootstrap of the test statistic
//!
//! Every resample draws rows by label, so both models are refactorised and
//! refitted from scratch each time.

use ndarray::Axis;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::{map_columns, BootstrapSet, CancellationToken, DistributionSummary, ResamplingConfig};
use crate::base::{ModelError, Result};
use crate::lm::{partial_r_squared, OlsSolver};
use np_core::design::ModelDesign;

/// Statistics of one bootstrap run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootstrapOutcome {
    /// Observed t-statistic of the test term
    pub t: f64,
    pub full_r2: f64,
    pub partial_r2: f64,
    /// Observed t followed by one value per bootstrap sample
    pub t_distribution: Vec<f64>,
    /// Observed partial R² followed by one value per bootstrap sample
    pub partial_r2_distribution: Vec<f64>,
    pub t_summary: DistributionSummary,
    pub partial_r2_summary: DistributionSummary,
}

/// Bootstrap over a built design
#[derive(Debug, Clone)]
pub struct BootstrapTest<'a> {
    design: &'a ModelDesign,
    config: ResamplingConfig,
    token: CancellationToken,
}

impl<'a> BootstrapTest<'a> {
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

    /// Refit both models on every bootstrap column
    ///
    /// Any resample that cannot be refitted fails the whole run. On small
    /// cohorts a draw that misses one level of a categorical covariate leaves
    /// an all-zero column, and the run returns `SingularMatrix`.
    #[instrument(skip_all, fields(
        test = %self.design.test_name,
        n_rows = self.design.nrows(),
        n_resamples = boots.n_resamples()
    ))]
    pub fn run(&self, boots: &BootstrapSet) -> Result<BootstrapOutcome> {
        self.config.validate()?;

        let design = self.design;
        if boots.n_rows() != design.nrows() {
            return Err(ModelError::shape(
                format!("bootstrap set with {} rows", design.nrows()),
                format!("{} rows", boots.n_rows()),
            ));
        }
        let rows = boots.resolve(&design.index)?;

        let reduced = OlsSolver::from_design(&design.reduced)?.fit(&design.response)?;
        let full = OlsSolver::from_design(&design.full)?.fit(&design.response)?;

        let k = design.test_column;
        let observed_t = full.t_statistics[k];
        let full_r2 = full.r_squared();
        let observed_pr2 = partial_r_squared(reduced.rss, full.rss);
        debug!(t = observed_t, full_r2, partial_r2 = observed_pr2, "observed fit");

        let token = self.config.arm(self.token.clone());
        let x_reduced = design.reduced.values().view();
        let x_full = design.full.values().view();

        let resampled = map_columns(rows.len(), self.config.parallel, &token, |col| {
            let rows = &rows[col];
            let y = design.response.select(Axis(0), rows);

            let rss_reduced = OlsSolver::on_rows(x_reduced, rows)?.rss(&y)?;
            let stat = OlsSolver::on_rows(x_full, rows)?.test_statistic(&y, k)?;

            Ok((stat.t, partial_r_squared(rss_reduced, stat.rss)))
        });
        let resampled = match resampled {
            Err(ModelError::Cancelled) => {
                warn!("bootstrap cancelled");
                return Err(ModelError::Cancelled);
            }
            other => other?,
        };

        let (t_draws, pr2_draws): (Vec<f64>, Vec<f64>) = resampled.into_iter().unzip();
        let t_distribution: Vec<f64> = std::iter::once(observed_t).chain(t_draws).collect();
        let partial_r2_distribution: Vec<f64> =
            std::iter::once(observed_pr2).chain(pr2_draws).collect();

        let t_summary = DistributionSummary::from_values(&t_distribution);
        let partial_r2_summary = DistributionSummary::from_values(&partial_r2_distribution);
        info!(
            t_mean = t_summary.mean,
            partial_r2_mean = partial_r2_summary.mean,
            "bootstrap finished"
        );

        Ok(BootstrapOutcome {
            t: observed_t,
            full_r2,
            partial_r2: observed_pr2,
            t_distribution,
            partial_r2_distribution,
            t_summary,
            partial_r2_summary,
        })
    }
}
