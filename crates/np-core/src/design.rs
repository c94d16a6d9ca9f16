//! Design matrix construction for nested regression models
//!
//! A [`ModelSpec`] names a response, the covariates of the reduced model and
//! one test term. Building it against a [`DataFrame`] yields a
//! [`ModelDesign`]: the response vector plus reduced and full predictor
//! matrices whose columns line up, the full matrix being the reduced one with
//! the test column appended.

use std::fmt;

use ndarray::{concatenate, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::data::{DataError, DataFrame, FloatArray, Index, Matrix};

pub mod error;
mod term;


pub use error::{DesignError, DesignResult};
pub use term::{Term, TermColumns};

/// Name of the constant column
pub const INTERCEPT: &str = "Intercept";

/// Nested model pair: reduced covariates, plus one test term for the full model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Response column
    pub response: String,
    /// Covariates shared by both models, in column order
    pub reduced_covariates: Vec<Term>,
    /// Term appended to form the full model
    pub test_term: Term,
    /// Whether both models get an intercept
    #[serde(default = "default_intercept")]
    pub intercept: bool,
}

fn default_intercept() -> bool {
    true
}

impl ModelSpec {
    /// Model with arbitrary covariates
    pub fn new<T>(response: &str, reduced_covariates: T, test_term: &str) -> Self
    where
        T: IntoIterator,
        T::Item: Into<Term>,
    {
        Self {
            response: response.to_string(),
            reduced_covariates: reduced_covariates.into_iter().map(Into::into).collect(),
            test_term: Term::from(test_term),
            intercept: true,
        }
    }

    /// `response ~ 1 + age + age2 + sex + age:sex + age2:sex + test_term`
    pub fn standard(response: &str, test_term: &str) -> Self {
        Self::new(
            response,
            ["age", "age2", "sex", "age:sex", "age2:sex"],
            test_term,
        )
    }

    /// Drop or restore the intercept
    pub fn with_intercept(mut self, intercept: bool) -> Self {
        self.intercept = intercept;
        self
    }

    /// Evaluate the spec against a dataset
    pub fn build(&self, df: &DataFrame) -> DesignResult<ModelDesign> {
        let response = response_vector(&self.response, df)?;
        let n = df.nrows();

        let mut names = Vec::new();
        let mut blocks: Vec<Array2<f64>> = Vec::new();

        if self.intercept {
            names.push(INTERCEPT.to_string());
            blocks.push(Array2::ones((n, 1)));
        }

        for term in &self.reduced_covariates {
            let columns = term.to_columns(df)?;
            names.extend(columns.names);
            blocks.push(columns.values);
        }

        let test = self.test_term.to_columns(df)?;
        let test_name = match test.names.as_slice() {
            [name] => name.clone(),
            other => {
                return Err(DesignError::collinear(
                    &self.test_term.to_string(),
                    format!("test term expands to {} columns, expected 1", other.len()),
                ))
            }
        };
        if names.contains(&test_name) {
            return Err(DesignError::collinear(
                &test_name,
                "test term is already part of the reduced model",
            ));
        }

        let reduced_values = stack(n, &blocks)?;
        let reduced = DesignMatrix::new(reduced_values, names.clone());

        blocks.push(test.values);
        names.push(test_name.clone());
        let full = DesignMatrix::new(stack(n, &blocks)?, names);

        Ok(ModelDesign {
            response,
            test_column: full.ncols() - 1,
            test_name,
            reduced,
            full,
            index: df.index().clone(),
        })
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {}", self.response, if self.intercept { 1 } else { 0 })?;
        for term in &self.reduced_covariates {
            write!(f, " + {}", term)?;
        }
        write!(f, " + {}", self.test_term)
    }
}

fn response_vector(name: &str, df: &DataFrame) -> DesignResult<FloatArray> {
    let series = df
        .get_column(name)
        .ok_or_else(|| DesignError::missing_column(name, &df.column_names()))?;

    if !series.is_numeric() {
        return Err(DesignError::TypeMismatch {
            column: name.to_string(),
            expected: "numeric",
            actual: series.dtype().to_string(),
        });
    }

    let missing = series.null_count();
    if missing > 0 {
        return Err(DesignError::MissingValues {
            column: name.to_string(),
            count: missing,
        });
    }

    Ok(series.to_float()?)
}

fn stack(n: usize, blocks: &[Array2<f64>]) -> DesignResult<Matrix> {
    if blocks.is_empty() {
        return Ok(Array2::zeros((n, 0)));
    }
    let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
    concatenate(Axis(1), &views).map_err(|e| {
        DesignError::Data(DataError::DimensionMismatch {
            expected: format!("{} rows in every design block", n),
            actual: e.to_string(),
        })
    })
}

/// Named predictor matrix
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    values: Matrix,
    names: Vec<String>,
}

impl DesignMatrix {
    pub fn new(values: Matrix, names: Vec<String>) -> Self {
        Self { values, names }
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn values(&self) -> &Matrix {
        &self.values
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// Response plus reduced and full design matrices for one dataset
#[derive(Debug, Clone)]
pub struct ModelDesign {
    pub response: FloatArray,
    pub reduced: DesignMatrix,
    pub full: DesignMatrix,
    /// Position of the test column in `full`
    pub test_column: usize,
    pub test_name: String,
    /// Row labels of the source dataset
    pub index: Index,
}

impl ModelDesign {
    pub fn nrows(&self) -> usize {
        self.response.len()
    }
}
