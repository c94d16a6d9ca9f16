//! Non-parametric significance tests for a single regression term
//!
//! Two procedures share the same shape. Both fit the reduced and full models
//! on the observed data, recompute the test statistic once per resample
//! column, and report the observed value alongside the resampled
//! distribution:
//! - [`PermutationTest`] / [`run_reg_perms`]: residual permutation under the
//!   reduced model, with a two-sided p-value
//! - [`BootstrapTest`] / [`run_reg_boots`]: rows drawn with replacement by
//!   label, with mean/std/quantile summaries
//!
//! Resample columns are independent. With the `parallel` feature they are
//! spread over the rayon pool and collected in column order, so the parallel
//! and sequential paths produce the same distribution.

mod bootstrap;
mod cancel;
mod config;
mod index;
mod permutation;
pub mod record;
mod summary;

#[cfg(test)]
mod tests;

pub use bootstrap::{BootstrapOutcome, BootstrapTest};
pub use cancel::CancellationToken;
pub use config::ResamplingConfig;
pub use index::{BootstrapSet, PermutationSet};
pub use permutation::{PermutationOutcome, PermutationTest};
pub use record::{RecordMeta, RecordValue, ResultRecord, ResultTable};
pub use summary::{quantile, two_sided_p_value, DistributionSummary};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::instrument;

use crate::base::Result;
use np_core::data::DataFrame;
use np_core::design::ModelSpec;

/// Permutation test of `spec.test_term` with the default configuration
pub fn run_reg_perms(
    task: &str,
    spec: &ModelSpec,
    data: &DataFrame,
    perms: &PermutationSet,
) -> Result<ResultRecord> {
    run_reg_perms_with(task, spec, data, perms, &ResamplingConfig::default())
}

/// Permutation test of `spec.test_term`, flattened into a record
#[instrument(skip_all, fields(
    task = %task,
    parameter = %spec.test_term,
    score = %spec.response,
    n_resamples = perms.n_resamples()
))]
pub fn run_reg_perms_with(
    task: &str,
    spec: &ModelSpec,
    data: &DataFrame,
    perms: &PermutationSet,
    config: &ResamplingConfig,
) -> Result<ResultRecord> {
    let design = spec.build(data)?;
    let outcome = PermutationTest::new(&design)
        .config(config.clone())
        .run(perms)?;

    let meta = RecordMeta::new(task, &spec.test_term.to_string(), &spec.response);
    Ok(ResultRecord::permutation(
        &meta,
        &outcome,
        config.keep_distribution,
    ))
}

/// Bootstrap of `spec.test_term` with the default configuration
pub fn run_reg_boots(
    task: &str,
    spec: &ModelSpec,
    data: &DataFrame,
    boots: &BootstrapSet,
) -> Result<ResultRecord> {
    run_reg_boots_with(task, spec, data, boots, &ResamplingConfig::default())
}

/// Bootstrap of `spec.test_term`, flattened into a record
#[instrument(skip_all, fields(
    task = %task,
    parameter = %spec.test_term,
    score = %spec.response,
    n_resamples = boots.n_resamples()
))]
pub fn run_reg_boots_with(
    task: &str,
    spec: &ModelSpec,
    data: &DataFrame,
    boots: &BootstrapSet,
    config: &ResamplingConfig,
) -> Result<ResultRecord> {
    let design = spec.build(data)?;
    let outcome = BootstrapTest::new(&design)
        .config(config.clone())
        .run(boots)?;

    let meta = RecordMeta::new(task, &spec.test_term.to_string(), &spec.response);
    Ok(ResultRecord::bootstrap(&meta, &outcome))
}

/// `f` over `0..n_columns`, in column order, checking `token` before each call
#[cfg(feature = "parallel")]
fn map_columns<T, F>(
    n_columns: usize,
    parallel: bool,
    token: &CancellationToken,
    f: F,
) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync + Send,
{
    let run = |col: usize| {
        token.check()?;
        f(col)
    };

    if parallel {
        (0..n_columns).into_par_iter().map(run).collect()
    } else {
        (0..n_columns).map(run).collect()
    }
}

/// `f` over `0..n_columns`, in column order, checking `token` before each call
#[cfg(not(feature = "parallel"))]
fn map_columns<T, F>(
    n_columns: usize,
    _parallel: bool,
    token: &CancellationToken,
    f: F,
) -> Result<Vec<T>>
where
    F: Fn(usize) -> Result<T>,
{
    (0..n_columns)
        .map(|col| {
            token.check()?;
            f(col)
        })
        .collect()
}
