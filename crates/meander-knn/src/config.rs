//! Configuration builder for the nearest-neighbour sweep.

use meander_dtw::{LabeledSeries, PointMetric, Solver, WindowPercent};

use crate::error::KnnError;
use crate::result::ClassificationResult;

/// Configuration for a 1-NN classification sweep.
///
/// Construct via [`NearestNeighborConfig::new`], then chain `with_*` methods
/// to override defaults.
///
/// # Defaults
///
/// | Parameter         | Default                  |
/// |-------------------|--------------------------|
/// | `window`          | `WindowPercent::FULL`    |
/// | `metric`          | `PointMetric::Absolute`  |
/// | `runs`            | 10                       |
/// | `trials_per_pair` | 10                       |
/// | `seed`            | 42                       |
/// | `record_pairs`    | false                    |
#[derive(Debug, Clone)]
pub struct NearestNeighborConfig {
    pub(crate) solver: Solver,
    pub(crate) window: WindowPercent,
    pub(crate) metric: PointMetric,
    pub(crate) runs: usize,
    pub(crate) trials_per_pair: usize,
    pub(crate) seed: u64,
    pub(crate) record_pairs: bool,
}

impl NearestNeighborConfig {
    /// Create a configuration for the given solver.
    #[must_use]
    pub fn new(solver: Solver) -> Self {
        Self {
            solver,
            window: WindowPercent::FULL,
            metric: PointMetric::Absolute,
            runs: 10,
            trials_per_pair: 10,
            seed: 42,
            record_pairs: false,
        }
    }

    /// Set the Sakoe-Chiba window as a percentage of the query length.
    #[must_use]
    pub fn with_window(mut self, window: WindowPercent) -> Self {
        self.window = window;
        self
    }

    /// Set the element distance.
    #[must_use]
    pub fn with_metric(mut self, metric: PointMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set how many times the whole sweep is repeated.
    #[must_use]
    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    /// Set the number of alignments per (query, reference) pair for
    /// randomized solvers. The exact solver always runs once per pair.
    #[must_use]
    pub fn with_trials_per_pair(mut self, trials_per_pair: usize) -> Self {
        self.trials_per_pair = trials_per_pair;
        self
    }

    /// Set the master seed from which every per-instance stream is derived.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Keep one [`crate::PairRecord`] per (run, query, reference) in the result.
    #[must_use]
    pub fn with_record_pairs(mut self, record_pairs: bool) -> Self {
        self.record_pairs = record_pairs;
        self
    }

    /// Return the solver.
    #[must_use]
    pub fn solver(&self) -> Solver {
        self.solver
    }

    /// Return the window.
    #[must_use]
    pub fn window(&self) -> WindowPercent {
        self.window
    }

    /// Return the element distance.
    #[must_use]
    pub fn metric(&self) -> PointMetric {
        self.metric
    }

    /// Return the number of runs.
    #[must_use]
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Return the configured trials per pair.
    #[must_use]
    pub fn trials_per_pair(&self) -> usize {
        self.trials_per_pair
    }

    /// Return the trials actually executed per pair: 1 for deterministic solvers.
    #[must_use]
    pub fn effective_trials(&self) -> usize {
        if self.solver.is_randomized() {
            self.trials_per_pair
        } else {
            1
        }
    }

    /// Return the master seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return whether per-pair records are kept.
    #[must_use]
    pub fn record_pairs(&self) -> bool {
        self.record_pairs
    }

    /// Classify every series in `test` by its nearest neighbour in `train`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`KnnError::EmptyReferenceSet`] | `train` is empty |
    /// | [`KnnError::EmptyQuerySet`] | `test` is empty |
    /// | [`KnnError::InvalidRepetitions`] | `runs` or `trials_per_pair` is zero |
    /// | [`KnnError::Dtw`] | An alignment fails |
    pub fn classify(
        &self,
        train: &[LabeledSeries],
        test: &[LabeledSeries],
    ) -> Result<ClassificationResult, KnnError> {
        if train.is_empty() {
            return Err(KnnError::EmptyReferenceSet);
        }
        if test.is_empty() {
            return Err(KnnError::EmptyQuerySet);
        }
        if self.runs == 0 || self.trials_per_pair == 0 {
            return Err(KnnError::InvalidRepetitions {
                runs: self.runs,
                trials: self.trials_per_pair,
            });
        }
        crate::classify::sweep(self, train, test)
    }
}
