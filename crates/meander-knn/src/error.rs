use meander_dtw::DtwError;

/// Errors from nearest-neighbour classification.
#[derive(Debug, thiserror::Error)]
pub enum KnnError {
    /// Returned when the training set is empty.
    #[error("reference set is empty")]
    EmptyReferenceSet,

    /// Returned when the test set is empty.
    #[error("query set is empty")]
    EmptyQuerySet,

    /// Returned when the run count or trials per pair is zero.
    #[error("runs and trials per pair must be at least 1, got runs={runs} trials={trials}")]
    InvalidRepetitions {
        /// Requested number of runs.
        runs: usize,
        /// Requested trials per pair.
        trials: usize,
    },

    /// Wraps an alignment failure.
    #[error("alignment failed: {0}")]
    Dtw(#[from] DtwError),
}
