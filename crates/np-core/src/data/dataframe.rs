//! DataFrame implementation for tabular data
//!
//! A DataFrame is a 2-dimensional labeled data structure with columns of
//! potentially different types. Rows are identified both by position and by
//! the label stored in the row index.

use super::*;

use indexmap::IndexMap;

/// Main DataFrame structure
#[derive(Clone, Debug)]
pub struct DataFrame {
    pub(crate) columns: IndexMap<String, Series>,
    pub(crate) index: Index,
    pub(crate) nrows: usize,
}

impl DataFrame {
    /// Create DataFrame from columns
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Series)>,
        S: Into<String>,
    {
        let mut builder = DataFrameBuilder::new();

        for (name, series) in columns.into_iter() {
            builder = builder.with_column(name, series)?;
        }

        builder.build()
    }

    /// Get the number of rows
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Get the number of columns
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(|k| k.as_str()).collect()
    }

    /// Get a reference to a column
    pub fn get_column(&self, name: &str) -> Option<&Series> {
        self.columns.get(name)
    }

    /// The row index
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Replace the row index
    pub fn with_index(mut self, index: Index) -> Result<Self> {
        if index.len() != self.nrows {
            return Err(DataError::DimensionMismatch {
                expected: format!("index of length {}", self.nrows),
                actual: format!("index of length {}", index.len()),
            });
        }
        self.index = index;
        Ok(self)
    }

    /// Use an integer column as the row index, removing it from the columns
    pub fn set_index_column(mut self, name: &str) -> Result<Self> {
        let series = self
            .columns
            .get(name)
            .ok_or_else(|| DataError::ColumnNotFound(name.to_string()))?;
        let index = Index::labels(series.to_labels()?)?;
        self.columns.shift_remove(name);
        self.index = index;
        Ok(self)
    }
}
