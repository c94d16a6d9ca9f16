//! Term types for model specification
//!
//! A term is either a single dataset column or an interaction between
//! columns. Each term expands into one or more named design columns.

use std::fmt;

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::data::{DataFrame, Series};
use crate::design::error::{DesignError, DesignResult};

/// A term on the right-hand side of a model
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    /// Simple variable
    Variable(String),
    /// Product of two or more variables
    Interaction(Vec<String>),
}

/// Design columns produced by one term
#[derive(Debug, Clone)]
pub struct TermColumns {
    pub names: Vec<String>,
    pub values: Array2<f64>,
}

impl Term {
    /// Create a new variable term
    pub fn variable(name: &str) -> Self {
        Term::Variable(name.to_string())
    }

    /// Create a new interaction term
    pub fn interaction(variables: &[&str]) -> Self {
        Term::Interaction(variables.iter().map(|v| v.to_string()).collect())
    }

    /// Dataset columns referenced by this term
    pub fn variables(&self) -> Vec<&str> {
        match self {
            Term::Variable(name) => vec![name.as_str()],
            Term::Interaction(vars) => vars.iter().map(|v| v.as_str()).collect(),
        }
    }

    /// Convert term to design matrix column(s)
    pub fn to_columns(&self, df: &DataFrame) -> DesignResult<TermColumns> {
        match self {
            Term::Variable(name) => variable_columns(name, df),
            Term::Interaction(vars) => {
                let (first, rest) = vars.split_first().ok_or_else(|| {
                    DesignError::collinear("interaction", "interaction has no variables")
                })?;
                rest.iter().try_fold(variable_columns(first, df)?, |acc, var| {
                    Ok(multiply(&acc, &variable_columns(var, df)?))
                })
            }
        }
    }
}

impl From<&str> for Term {
    /// `"age:sex"` becomes an interaction, anything else a variable
    fn from(spec: &str) -> Self {
        let parts: Vec<&str> = spec.split(':').map(str::trim).collect();
        if parts.len() > 1 {
            Term::interaction(&parts)
        } else {
            Term::variable(spec.trim())
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(name) => write!(f, "{}", name),
            Term::Interaction(vars) => write!(f, "{}", vars.join(":")),
        }
    }
}

/// Encode a single dataset column
fn variable_columns(name: &str, df: &DataFrame) -> DesignResult<TermColumns> {
    let series = df
        .get_column(name)
        .ok_or_else(|| DesignError::missing_column(name, &df.column_names()))?;

    match series {
        Series::Float(_) | Series::Int(_) | Series::Bool(_) => {
            let missing = series.null_count();
            if missing > 0 {
                return Err(DesignError::MissingValues {
                    column: name.to_string(),
                    count: missing,
                });
            }
            let values = series.to_float()?;
            Ok(TermColumns {
                names: vec![name.to_string()],
                values: values.insert_axis(Axis(1)),
            })
        }
        Series::Categorical(codes, levels) => treatment_columns(name, codes, levels),
        Series::String(_) => Err(DesignError::TypeMismatch {
            column: name.to_string(),
            expected: "numeric or categorical",
            actual: series.dtype().to_string(),
        }),
    }
}

/// Treatment coding: one indicator per level, first level as reference
fn treatment_columns(
    name: &str,
    codes: &Array1<u32>,
    levels: &[String],
) -> DesignResult<TermColumns> {
    if levels.len() < 2 {
        return Err(DesignError::collinear(
            name,
            format!(
                "categorical column has {} level(s); at least 2 are needed",
                levels.len()
            ),
        ));
    }

    let values = Array2::from_shape_fn((codes.len(), levels.len() - 1), |(i, j)| {
        if codes[i] as usize == j + 1 {
            1.0
        } else {
            0.0
        }
    });
    let names = levels[1..]
        .iter()
        .map(|level| format!("{}[{}]", name, level))
        .collect();

    Ok(TermColumns { names, values })
}

/// Every pairwise column product of two blocks
fn multiply(a: &TermColumns, b: &TermColumns) -> TermColumns {
    let n = a.values.nrows();
    let mut names = Vec::with_capacity(a.names.len() * b.names.len());
    let mut values = Array2::zeros((n, a.names.len() * b.names.len()));

    for (i, a_name) in a.names.iter().enumerate() {
        for (j, b_name) in b.names.iter().enumerate() {
            let col = i * b.names.len() + j;
            names.push(format!("{}:{}", a_name, b_name));
            let product = &a.values.column(i) * &b.values.column(j);
            values.column_mut(col).assign(&product);
        }
    }

    TermColumns { names, values }
}
