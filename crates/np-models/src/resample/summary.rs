//! Summaries of resampled distributions

use serde::{Deserialize, Serialize};

/// Mean, spread and tail quantiles of a distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub mean: f64,
    /// Population standard deviation (ddof = 0)
    pub std: f64,
    pub q005: f64,
    pub q025: f64,
    pub q975: f64,
    pub q995: f64,
}

impl DistributionSummary {
    /// Summarise `values`; any NaN makes every field NaN
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() || values.iter().any(|v| v.is_nan()) {
            return Self::nan();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Self {
            mean,
            std: var.sqrt(),
            q005: quantile(&sorted, 0.005),
            q025: quantile(&sorted, 0.025),
            q975: quantile(&sorted, 0.975),
            q995: quantile(&sorted, 0.995),
        }
    }

    fn nan() -> Self {
        Self {
            mean: f64::NAN,
            std: f64::NAN,
            q005: f64::NAN,
            q025: f64::NAN,
            q975: f64::NAN,
            q995: f64::NAN,
        }
    }
}

/// Quantile of sorted data, interpolating linearly between order statistics
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }

    let idx = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let weight = idx - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * weight
    }
}

/// Share of the distribution at least as extreme as its first element
///
/// Element 0 is the observed statistic and counts toward both numerator and
/// denominator, so the result is never below `1 / len`.
pub fn two_sided_p_value(distribution: &[f64]) -> f64 {
    let Some(&observed) = distribution.first() else {
        return f64::NAN;
    };
    if observed.is_nan() {
        return f64::NAN;
    }

    let threshold = observed.abs();
    let extreme = distribution.iter().filter(|t| t.abs() >= threshold).count();
    extreme as f64 / distribution.len() as f64
}
