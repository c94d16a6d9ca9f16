//! Resampling run configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::CancellationToken;
use crate::base::{ModelError, Result};

/// Resampling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResamplingConfig {
    /// Spread resamples over the rayon pool (needs the `parallel` feature)
    pub parallel: bool,
    /// Add every permutation statistic to the record as `perm_NNNN`
    pub keep_distribution: bool,
    /// Wall-clock budget for one run
    pub deadline: Option<Duration>,
}

impl Default for ResamplingConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            keep_distribution: false,
            deadline: None,
        }
    }
}

impl ResamplingConfig {
    /// Force the sequential loop
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn with_distribution(mut self) -> Self {
        self.keep_distribution = true;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.deadline == Some(Duration::ZERO) {
            return Err(ModelError::InvalidConfig {
                message: "deadline must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Token for one run: `token` plus this config's deadline, counted from now
    pub(crate) fn arm(&self, token: CancellationToken) -> CancellationToken {
        match self.deadline {
            Some(deadline) => token.with_timeout(deadline),
            None => token,
        }
    }
}
