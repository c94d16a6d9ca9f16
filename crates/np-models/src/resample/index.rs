//! Resampling index sets
//!
//! Both sets are `(n_rows, n_resamples)` arrays with one resample per column.
//! A [`PermutationSet`] holds row positions and each column must be a
//! permutation of `0..n_rows`. A [`BootstrapSet`] holds row labels drawn with
//! replacement, resolved against the dataset's index when a test runs.

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::base::{ModelError, Result};
use np_core::data::{Index, RowLabel};

/// Positional permutations of the rows
#[derive(Debug, Clone, PartialEq)]
pub struct PermutationSet {
    indices: Array2<usize>,
}

impl PermutationSet {
    /// Validate that every column is a permutation of `0..n_rows`
    pub fn new(indices: Array2<usize>) -> Result<Self> {
        let n = indices.nrows();
        let mut seen = vec![false; n];

        for (col, column) in indices.columns().into_iter().enumerate() {
            seen.iter_mut().for_each(|s| *s = false);
            for &pos in column.iter() {
                if pos >= n || std::mem::replace(&mut seen[pos], true) {
                    return Err(ModelError::shape(
                        format!("column {} to be a permutation of 0..{}", col, n),
                        format!("out-of-range or repeated position {}", pos),
                    ));
                }
            }
        }

        Ok(Self { indices })
    }

    /// `n_resamples` uniform permutations from a seeded generator
    pub fn random(n_rows: usize, n_resamples: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut indices = Array2::zeros((n_rows, n_resamples));
        let mut perm: Vec<usize> = (0..n_rows).collect();

        for mut column in indices.columns_mut() {
            perm.shuffle(&mut rng);
            column.assign(&ArrayView1::from(perm.as_slice()));
        }

        Self { indices }
    }

    pub fn n_rows(&self) -> usize {
        self.indices.nrows()
    }

    pub fn n_resamples(&self) -> usize {
        self.indices.ncols()
    }

    pub fn column(&self, j: usize) -> ArrayView1<'_, usize> {
        self.indices.column(j)
    }

    pub fn indices(&self) -> &Array2<usize> {
        &self.indices
    }
}

/// Row labels drawn with replacement
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapSet {
    labels: Array2<RowLabel>,
}

impl BootstrapSet {
    /// Labels are checked against a dataset only when a test runs
    pub fn new(labels: Array2<RowLabel>) -> Self {
        Self { labels }
    }

    /// `n_resamples` draws of `index.len()` labels each, with replacement
    pub fn random(index: &Index, n_resamples: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let pool: Vec<RowLabel> = index.iter().collect();
        let n = pool.len();

        let labels = if n == 0 {
            Array2::zeros((0, n_resamples))
        } else {
            Array2::from_shape_simple_fn((n, n_resamples), || pool[rng.random_range(0..n)])
        };

        Self { labels }
    }

    pub fn n_rows(&self) -> usize {
        self.labels.nrows()
    }

    pub fn n_resamples(&self) -> usize {
        self.labels.ncols()
    }

    pub fn column(&self, j: usize) -> ArrayView1<'_, RowLabel> {
        self.labels.column(j)
    }

    pub fn labels(&self) -> &Array2<RowLabel> {
        &self.labels
    }

    /// Row positions for every column, looked up by label in `index`
    pub fn resolve(&self, index: &Index) -> Result<Vec<Vec<usize>>> {
        self.labels
            .columns()
            .into_iter()
            .map(|column| {
                column
                    .iter()
                    .map(|&label| {
                        index
                            .position_of(label)
                            .ok_or(ModelError::UnknownRowIdentifier(label))
                    })
                    .collect()
            })
            .collect()
    }
}
