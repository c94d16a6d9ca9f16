//! Flat result records
//!
//! One [`ResultRecord`] is produced per (task, parameter, score) analysis and
//! many of them are gathered in a [`ResultTable`]. Field order is fixed by
//! the constructors, so serialised tables keep a stable column layout.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{BootstrapOutcome, DistributionSummary, PermutationOutcome};
use crate::base::Result;

/// A single field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Number(f64),
    Text(String),
}

impl RecordValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RecordValue::Number(v) => Some(*v),
            RecordValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RecordValue::Text(s) => Some(s),
            RecordValue::Number(_) => None,
        }
    }
}

impl From<f64> for RecordValue {
    fn from(v: f64) -> Self {
        RecordValue::Number(v)
    }
}

impl From<&str> for RecordValue {
    fn from(s: &str) -> Self {
        RecordValue::Text(s.to_string())
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordValue::Number(v) => write!(f, "{}", v),
            RecordValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Identifies what a record describes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Task or instrument the score comes from
    pub task: String,
    /// Test predictor
    pub parameter: String,
    /// Response
    pub score: String,
}

impl RecordMeta {
    pub fn new(task: &str, parameter: &str, score: &str) -> Self {
        Self {
            task: task.to_string(),
            parameter: parameter.to_string(),
            score: score.to_string(),
        }
    }
}

/// Ordered field name to value mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRecord {
    fields: IndexMap<String, RecordValue>,
}

impl ResultRecord {
    /// `task, parameter, score, t, full_r2, partial_r2, perm_p`, then
    /// `perm_0000..` when `keep_distribution` is set
    pub fn permutation(
        meta: &RecordMeta,
        outcome: &PermutationOutcome,
        keep_distribution: bool,
    ) -> Self {
        let mut record = Self::with_observed(meta, outcome.t, outcome.full_r2, outcome.partial_r2);
        record.insert("perm_p", outcome.p_value);

        if keep_distribution {
            for (i, &t) in outcome.distribution.iter().enumerate() {
                record.insert(&format!("perm_{:04}", i), t);
            }
        }

        record
    }

    /// Observed statistics followed by `boot_t_*` and `boot_pr2_*` summaries
    pub fn bootstrap(meta: &RecordMeta, outcome: &BootstrapOutcome) -> Self {
        let mut record = Self::with_observed(meta, outcome.t, outcome.full_r2, outcome.partial_r2);
        record.insert_summary("boot_t", &outcome.t_summary);
        record.insert_summary("boot_pr2", &outcome.partial_r2_summary);
        record
    }

    fn with_observed(meta: &RecordMeta, t: f64, full_r2: f64, partial_r2: f64) -> Self {
        let mut record = Self::default();
        record.insert("task", meta.task.as_str());
        record.insert("parameter", meta.parameter.as_str());
        record.insert("score", meta.score.as_str());
        record.insert("t", t);
        record.insert("full_r2", full_r2);
        record.insert("partial_r2", partial_r2);
        record
    }

    fn insert_summary(&mut self, prefix: &str, summary: &DistributionSummary) {
        self.insert(&format!("{}_mean", prefix), summary.mean);
        self.insert(&format!("{}_std", prefix), summary.std);
        self.insert(&format!("{}_005", prefix), summary.q005);
        self.insert(&format!("{}_025", prefix), summary.q025);
        self.insert(&format!("{}_975", prefix), summary.q975);
        self.insert(&format!("{}_995", prefix), summary.q995);
    }

    fn insert(&mut self, key: &str, value: impl Into<RecordValue>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&RecordValue> {
        self.fields.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(RecordValue::as_number)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(RecordValue::as_text)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecordValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Records from many analyses, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultTable {
    records: Vec<ResultRecord>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ResultRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    /// Union of field names across records, in first-seen order
    pub fn columns(&self) -> Vec<&str> {
        let mut columns = indexmap::IndexSet::new();
        for record in &self.records {
            columns.extend(record.keys());
        }
        columns.into_iter().collect()
    }

    /// JSON array of records; NaN statistics become `null`
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Extend<ResultRecord> for ResultTable {
    fn extend<I: IntoIterator<Item = ResultRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}
