//! CSV and JSON result writers for classification sweeps.

use std::fs;
use std::path::{Path, PathBuf};

use meander_knn::{ClassificationResult, NearestNeighborConfig};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::ExperimentName;
use crate::IoError;

/// Writes classification results under one output directory.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_pairs.csv`,
/// `{experiment}_accuracy.csv` and `{experiment}_summary.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write one row per (run, query, reference) pair to `{experiment}_pairs.csv`.
    ///
    /// Columns: `run,window,test,train,elapsed_ms,path_len,distance`. The file
    /// holds only the header unless the sweep recorded pairs.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Csv`] or [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_pairs(&self, result: &ClassificationResult) -> Result<PathBuf, IoError> {
        let path = self.file_path("pairs.csv");
        let window = result.window.value();
        let rows = result.pairs.iter().map(|p| PairRow {
            run: p.run,
            window,
            test: p.test,
            train: p.train,
            elapsed_ms: p.elapsed_ms,
            path_len: p.path_len,
            distance: p.distance,
        });
        write_csv(&path, &PAIR_HEADER, rows)?;
        info!(path = %path.display(), rows = result.pairs.len(), "pair records written");
        Ok(path)
    }

    /// Write one row per (run, query) prediction to `{experiment}_accuracy.csv`.
    ///
    /// Columns: `run,window,test,actual,predicted`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Csv`] or [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_accuracy(&self, result: &ClassificationResult) -> Result<PathBuf, IoError> {
        let path = self.file_path("accuracy.csv");
        let window = result.window.value();
        let rows = result.runs.iter().flat_map(|run| {
            run.predictions.iter().map(move |p| AccuracyRow {
                run: run.run,
                window,
                test: p.test,
                actual: p.actual,
                predicted: p.predicted,
            })
        });
        write_csv(&path, &ACCURACY_HEADER, rows)?;
        info!(path = %path.display(), "accuracy records written");
        Ok(path)
    }

    /// Write the sweep configuration and per-run accuracy to
    /// `{experiment}_summary.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`] if the file
    /// cannot be written.
    #[instrument(skip_all)]
    pub fn write_summary(
        &self,
        config: &NearestNeighborConfig,
        result: &ClassificationResult,
    ) -> Result<PathBuf, IoError> {
        let path = self.file_path("summary.json");

        let runs: Vec<RunEntry> = result
            .runs
            .iter()
            .map(|r| RunEntry {
                run: r.run,
                accuracy: r.accuracy(),
                elapsed_ms: r.elapsed_ms,
            })
            .collect();

        let artifact = SummaryArtifact {
            experiment: self.experiment.as_str(),
            solver: result.solver.to_string(),
            window: result.window.value(),
            metric: config.metric().to_string(),
            trials_per_pair: config.effective_trials(),
            seed: config.seed(),
            n_train: result.n_train,
            n_test: result.n_test,
            mean_accuracy: result.mean_accuracy(),
            mean_error_rate: result.mean_error_rate(),
            total_elapsed_ms: result.total_elapsed_ms,
            runs,
        };

        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "summary written");
        Ok(path)
    }

    fn file_path(&self, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{suffix}", self.experiment.as_str()))
    }
}

const PAIR_HEADER: [&str; 7] = [
    "run",
    "window",
    "test",
    "train",
    "elapsed_ms",
    "path_len",
    "distance",
];

const ACCURACY_HEADER: [&str; 5] = ["run", "window", "test", "actual", "predicted"];

/// Write `header` followed by one serialized record per row.
///
/// The header is written up front so a file with no rows still carries it.
fn write_csv<T: Serialize, I: IntoIterator<Item = T>>(
    path: &Path,
    header: &[&str],
    rows: I,
) -> Result<(), IoError> {
    let csv_err = |e: csv::Error| IoError::Csv {
        path: path.to_path_buf(),
        source: e,
    };
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;
    writer.write_record(header).map_err(csv_err)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|e| IoError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

// --- Shadow structs for serialization ---

#[derive(Serialize)]
struct PairRow {
    run: usize,
    window: u32,
    test: usize,
    train: usize,
    elapsed_ms: f64,
    path_len: usize,
    distance: f64,
}

#[derive(Serialize)]
struct AccuracyRow {
    run: usize,
    window: u32,
    test: usize,
    actual: i64,
    predicted: i64,
}

#[derive(Serialize)]
struct SummaryArtifact<'a> {
    experiment: &'a str,
    solver: String,
    window: u32,
    metric: String,
    trials_per_pair: usize,
    seed: u64,
    n_train: usize,
    n_test: usize,
    mean_accuracy: f64,
    mean_error_rate: f64,
    total_elapsed_ms: f64,
    runs: Vec<RunEntry>,
}

#[derive(Serialize)]
struct RunEntry {
    run: usize,
    accuracy: f64,
    elapsed_ms: f64,
}
