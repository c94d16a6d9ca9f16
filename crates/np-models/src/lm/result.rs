//! Linear regression result structure
//!
//! This module defines the result structure for linear regression models,
//! containing all the information from fitting a linear model.

use std::fmt;

use crate::base::Coefficient;
use crate::lm::ols::Vector;

/// OLS linear regression result
#[derive(Debug, Clone)]
pub struct LinearRegressionResult {
    /// Coefficients (β)
    pub coefficients: Vector,
    /// Standard errors of coefficients
    pub standard_errors: Vector,
    /// t-statistics for coefficients
    pub t_statistics: Vector,
    /// Two-sided Student-t p-values for coefficients
    pub p_values: Vector,
    /// Fitted values (ŷ)
    pub fitted_values: Vector,
    /// Residuals (y - ŷ)
    pub residuals: Vector,
    /// Response vector (y)
    pub y: Vector,
    /// Design column names
    pub variable_names: Vec<String>,
    /// Residual sum of squares
    pub rss: f64,
    /// Centred total sum of squares
    pub tss: f64,
    /// n - p
    pub df_residual: usize,
}

impl LinearRegressionResult {
    /// Convert coefficients to Coefficient structs
    pub fn to_coefficients(&self) -> Vec<Coefficient> {
        self.variable_names
            .iter()
            .enumerate()
            .map(|(i, name)| self.coefficient_at(i, name))
            .collect()
    }

    /// Coefficient for a named design column
    pub fn coefficient(&self, name: &str) -> Option<Coefficient> {
        self.variable_names
            .iter()
            .position(|n| n == name)
            .map(|i| self.coefficient_at(i, name))
    }

    fn coefficient_at(&self, i: usize, name: &str) -> Coefficient {
        Coefficient::new(name, self.coefficients[i])
            .with_std_error(self.standard_errors[i])
            .with_t_stat(self.t_statistics[i])
            .with_p_value(self.p_values[i])
    }

    /// Get the number of observations
    pub fn n_obs(&self) -> usize {
        self.y.len()
    }

    /// Get the number of predictors (including intercept)
    pub fn n_predictors(&self) -> usize {
        self.coefficients.len()
    }

    /// Get explained sum of squares
    pub fn ess(&self) -> f64 {
        self.tss - self.rss
    }

    /// 1 - RSS/TSS; NaN for a constant response
    pub fn r_squared(&self) -> f64 {
        1.0 - self.rss / self.tss
    }

    pub fn adj_r_squared(&self) -> f64 {
        let n = self.n_obs() as f64;
        1.0 - (1.0 - self.r_squared()) * ((n - 1.0) / self.df_residual as f64)
    }

    /// sqrt(RSS / (n - p))
    pub fn residual_std_error(&self) -> f64 {
        (self.rss / self.df_residual as f64).sqrt()
    }
}

impl fmt::Display for LinearRegressionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Linear Regression Results")?;
        writeln!(f, "========================")?;
        writeln!(f, "Observations: {}", self.n_obs())?;
        writeln!(f, "Predictors:   {}", self.n_predictors())?;
        writeln!(f)?;

        writeln!(
            f,
            "{:<24} {:>12} {:>12} {:>10} {:>10}",
            "", "Estimate", "Std. Error", "t value", "Pr(>|t|)"
        )?;
        for coef in self.to_coefficients() {
            writeln!(
                f,
                "{:<24} {:>12.4} {:>12.4} {:>10.3} {:>10.4} {}",
                coef.name,
                coef.estimate,
                coef.std_error,
                coef.t_stat,
                coef.p_value,
                coef.stars()
            )?;
        }
        writeln!(f)?;

        writeln!(f, "R-squared:           {:.4}", self.r_squared())?;
        writeln!(f, "Adjusted R-squared:  {:.4}", self.adj_r_squared())?;
        writeln!(f, "Residual Std Error: {:.4}", self.residual_std_error())?;

        Ok(())
    }
}
