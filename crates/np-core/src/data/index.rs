//! Row index structures for DataFrames
//!
//! Every row carries a label. Permutation resamples address rows by
//! position, bootstrap resamples address them by label, so the index has to
//! answer both "which label sits at position i" and "where does label l live".

use std::collections::HashMap;

use super::{DataError, Result};

/// Identifier of a single row, independent of its position
pub type RowLabel = i64;

/// Contiguous labels `0..len`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeIndex {
    len: usize,
}

impl RangeIndex {
    /// Create a range index from 0 to n
    pub fn from_len(n: usize) -> Self {
        Self { len: n }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn get(&self, pos: usize) -> Option<RowLabel> {
        if pos < self.len {
            RowLabel::try_from(pos).ok()
        } else {
            None
        }
    }

    fn position_of(&self, label: RowLabel) -> Option<usize> {
        usize::try_from(label).ok().filter(|&pos| pos < self.len)
    }
}

/// Arbitrary unique labels with a reverse lookup table
#[derive(Debug, Clone)]
pub struct LabelIndex {
    labels: Vec<RowLabel>,
    positions: HashMap<RowLabel, usize>,
}

impl LabelIndex {
    /// Create a label index; labels must be unique
    pub fn new(labels: Vec<RowLabel>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(labels.len());
        for (pos, &label) in labels.iter().enumerate() {
            if positions.insert(label, pos).is_some() {
                return Err(DataError::DuplicateLabel(label));
            }
        }
        Ok(Self { labels, positions })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl PartialEq for LabelIndex {
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels
    }
}

/// Row index of a DataFrame
#[derive(Debug, Clone, PartialEq)]
pub enum Index {
    Range(RangeIndex),
    Labels(LabelIndex),
}

impl Index {
    /// Contiguous labels `0..n`
    pub fn range(n: usize) -> Self {
        Self::Range(RangeIndex::from_len(n))
    }

    /// Explicit labels, rejecting duplicates
    pub fn labels(labels: Vec<RowLabel>) -> Result<Self> {
        Ok(Self::Labels(LabelIndex::new(labels)?))
    }

    /// Get the length of the index
    pub fn len(&self) -> usize {
        match self {
            Index::Range(idx) => idx.len(),
            Index::Labels(idx) => idx.len(),
        }
    }

    /// Check if index is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Label of the row at `pos`
    pub fn get(&self, pos: usize) -> Option<RowLabel> {
        match self {
            Index::Range(idx) => idx.get(pos),
            Index::Labels(idx) => idx.labels.get(pos).copied(),
        }
    }

    /// Position of the row labelled `label`
    pub fn position_of(&self, label: RowLabel) -> Option<usize> {
        match self {
            Index::Range(idx) => idx.position_of(label),
            Index::Labels(idx) => idx.positions.get(&label).copied(),
        }
    }

    /// Iterate over labels in row order
    pub fn iter(&self) -> impl Iterator<Item = RowLabel> + '_ {
        (0..self.len()).filter_map(move |pos| self.get(pos))
    }
}
