//! I/O error types for meander-io.

use std::path::PathBuf;

/// Errors from dataset parsing and result serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or cannot be opened.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when reading an opened file fails part-way.
    #[error("cannot read {path}")]
    Read {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the leading field of a line is not an integral class label.
    #[error("invalid class label in {path}: line {line}, raw value \"{raw}\"")]
    InvalidLabel {
        /// Path to the dataset file.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// The raw field.
        raw: String,
    },

    /// Returned when a sample is NaN, Inf, or otherwise not a finite float.
    #[error("non-finite value in {path}: line {line}, sample {sample_index}, raw value \"{raw}\"")]
    NonFiniteValue {
        /// Path to the dataset file.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Zero-based sample index (excluding the label).
        sample_index: usize,
        /// The raw field.
        raw: String,
    },

    /// Returned when a line carries a label but no samples.
    #[error("line {line} in {path} has a label but no samples")]
    EmptySeries {
        /// Path to the dataset file.
        path: PathBuf,
        /// One-based line number.
        line: usize,
    },

    /// Returned when the file holds no non-blank lines.
    #[error("empty dataset (no instances) in {path}")]
    EmptyDataset {
        /// Path to the dataset file.
        path: PathBuf,
    },

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a CSV record cannot be written.
    #[error("CSV write error in {path}")]
    Csv {
        /// Path to the CSV file.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a JSON artifact cannot be serialized.
    #[error("cannot serialize {path}")]
    Serialize {
        /// Path of the artifact.
        path: PathBuf,
        /// Underlying serde_json error.
        source: serde_json::Error,
    },
}
