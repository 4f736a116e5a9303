//! Domain types for meander-io.

use std::collections::BTreeSet;

use meander_dtw::LabeledSeries;

use crate::IoError;

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Labelled instances in file order, as produced by [`UcrReader`](crate::UcrReader).
///
/// Instances may differ in length.
#[derive(Debug, Clone)]
pub struct LabeledDataset {
    series: Vec<LabeledSeries>,
}

impl LabeledDataset {
    pub(crate) fn new(series: Vec<LabeledSeries>) -> Self {
        debug_assert!(!series.is_empty(), "dataset must not be empty");
        Self { series }
    }

    /// Return the instances.
    #[must_use]
    pub fn series(&self) -> &[LabeledSeries] {
        &self.series
    }

    /// Return the number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Return true if the dataset holds no instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Return the length of the longest instance.
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.series.iter().map(LabeledSeries::len).max().unwrap_or(0)
    }

    /// Return the distinct class labels in ascending order.
    #[must_use]
    pub fn class_labels(&self) -> Vec<i64> {
        self.series
            .iter()
            .map(LabeledSeries::label)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
