//! UCR-format dataset reader with full input validation.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use meander_dtw::{LabeledSeries, TimeSeries};
use tracing::{debug, info, instrument};

use crate::domain::LabeledDataset;
use crate::IoError;

/// Reads labelled time series in the UCR archive text format.
///
/// Expected format:
/// - one instance per line, no header
/// - first field is the class label, written as an integer or an integral
///   float such as `1.0000000e+00`
/// - remaining fields are the samples
/// - fields separated by whitespace and/or commas; blank lines are skipped
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or can't be opened |
/// | [`IoError::Read`] | Reading fails part-way |
/// | [`IoError::InvalidLabel`] | Label is unparseable, non-finite, or fractional |
/// | [`IoError::NonFiniteValue`] | Sample is NaN, Inf, or unparseable |
/// | [`IoError::EmptySeries`] | Line has a label but no samples |
/// | [`IoError::EmptyDataset`] | No non-blank lines |
pub struct UcrReader {
    path: PathBuf,
}

impl UcrReader {
    /// Create a new reader for the given dataset path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the file, returning a [`LabeledDataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<LabeledDataset, IoError> {
        let file = File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut series = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| IoError::Read {
                path: self.path.clone(),
                source: e,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            series.push(self.parse_line(index + 1, &line)?);
        }

        if series.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let dataset = LabeledDataset::new(series);
        info!(
            n_instances = dataset.len(),
            max_len = dataset.max_len(),
            n_classes = dataset.class_labels().len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    fn parse_line(&self, line: usize, text: &str) -> Result<LabeledSeries, IoError> {
        let mut fields = text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|f| !f.is_empty());

        // Non-blank lines always yield at least one field.
        let raw_label = fields.next().unwrap_or_default();
        let label = parse_label(raw_label).ok_or_else(|| IoError::InvalidLabel {
            path: self.path.clone(),
            line,
            raw: raw_label.to_string(),
        })?;

        let mut values = Vec::new();
        for (sample_index, raw) in fields.enumerate() {
            let value = raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| IoError::NonFiniteValue {
                    path: self.path.clone(),
                    line,
                    sample_index,
                    raw: raw.to_string(),
                })?;
            values.push(value);
        }

        if values.is_empty() {
            return Err(IoError::EmptySeries {
                path: self.path.clone(),
                line,
            });
        }
        debug!(line, label, len = values.len(), "instance parsed");

        // Samples were checked above, so this only fails on a validation mismatch.
        let series = TimeSeries::new(values).map_err(|_| IoError::EmptySeries {
            path: self.path.clone(),
            line,
        })?;
        Ok(LabeledSeries::new(label, series))
    }
}

/// Parse an integral class label, accepting float notation.
fn parse_label(raw: &str) -> Option<i64> {
    if let Ok(label) = raw.parse::<i64>() {
        return Some(label);
    }
    let value = raw.parse::<f64>().ok()?;
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}
