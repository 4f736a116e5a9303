//! Result types for the nearest-neighbour sweep.

use meander_dtw::{Solver, WindowPercent};

/// Timing and best alignment for one (run, query, reference) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairRecord {
    /// Zero-based run index.
    pub run: usize,
    /// Index of the query in the test set.
    pub test: usize,
    /// Index of the reference in the training set.
    pub train: usize,
    /// Wall-clock time spent on all trials for this pair, in milliseconds.
    pub elapsed_ms: f64,
    /// Path length of the best trial.
    pub path_len: usize,
    /// Distance of the best trial.
    pub distance: f64,
}

/// Predicted label for one query instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Index of the query in the test set.
    pub test: usize,
    /// Label carried by the query.
    pub actual: i64,
    /// Label of the nearest reference.
    pub predicted: i64,
    /// Index of the nearest reference in the training set.
    pub nearest: usize,
    /// Distance to the nearest reference.
    pub distance: f64,
}

impl Prediction {
    /// Return true if the predicted label matches the actual one.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.actual == self.predicted
    }
}

/// Outcome of one pass over the test set.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Zero-based run index.
    pub run: usize,
    /// One prediction per query, in test-set order.
    pub predictions: Vec<Prediction>,
    /// Wall-clock time for the run, in milliseconds.
    pub elapsed_ms: f64,
}

impl RunResult {
    /// Return the fraction of correct predictions in `[0, 1]`.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.predictions.is_empty() {
            return 0.0;
        }
        let correct = self.predictions.iter().filter(|p| p.is_correct()).count();
        correct as f64 / self.predictions.len() as f64
    }
}

/// Result of a full classification sweep.
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Solver used for every alignment.
    pub solver: Solver,
    /// Window used for every alignment.
    pub window: WindowPercent,
    /// Number of reference instances.
    pub n_train: usize,
    /// Number of query instances.
    pub n_test: usize,
    /// Per-run predictions, ordered by run index.
    pub runs: Vec<RunResult>,
    /// Per-pair records, empty unless requested.
    pub pairs: Vec<PairRecord>,
    /// Wall-clock time for all runs, in milliseconds.
    pub total_elapsed_ms: f64,
}

impl ClassificationResult {
    /// Return the accuracy of each run, ordered by run index.
    #[must_use]
    pub fn accuracies(&self) -> Vec<f64> {
        self.runs.iter().map(RunResult::accuracy).collect()
    }

    /// Return the mean accuracy over all runs.
    #[must_use]
    pub fn mean_accuracy(&self) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        self.accuracies().iter().sum::<f64>() / self.runs.len() as f64
    }

    /// Return the mean error rate over all runs.
    #[must_use]
    pub fn mean_error_rate(&self) -> f64 {
        1.0 - self.mean_accuracy()
    }
}
