//! Error types for series validation and alignment.

/// Errors from time series validation and alignment calls.
///
/// Every variant is raised before any cost-matrix work starts.
#[derive(Debug, thiserror::Error)]
pub enum DtwError {
    /// Returned when an empty slice is provided as a time series.
    #[error("time series must be non-empty")]
    EmptySeries,

    /// Returned when a time series contains NaN, infinity, or negative infinity.
    #[error("time series contains non-finite value at index {index}")]
    NonFiniteValue {
        /// Position of the first non-finite value found.
        index: usize,
    },

    /// Returned when a window percentage falls outside `[0, 100]`.
    #[error("window must be a percentage in [0, 100], got {window}")]
    InvalidWindow {
        /// The rejected window value.
        window: u32,
    },

    /// Returned when an engine is built with a zero maximum length.
    #[error("engine capacity must be at least 1x1, got {max_len_a}x{max_len_b}")]
    ZeroCapacity {
        /// Requested maximum length of the query series.
        max_len_a: usize,
        /// Requested maximum length of the reference series.
        max_len_b: usize,
    },

    /// Returned when a series pair does not fit the engine's cost matrix.
    #[error(
        "series lengths {len_a}x{len_b} exceed engine capacity {max_len_a}x{max_len_b}"
    )]
    CapacityExceeded {
        /// Length of the query series.
        len_a: usize,
        /// Length of the reference series.
        len_b: usize,
        /// Maximum query length the engine was built for.
        max_len_a: usize,
        /// Maximum reference length the engine was built for.
        max_len_b: usize,
    },

    /// Returned when a forward walk reaches a non-terminal cell with no
    /// in-band successor. Unreachable while the band covers the length
    /// difference.
    #[error("forward walk stranded at cell ({row}, {col})")]
    NoValidMove {
        /// Row of the stranded cell.
        row: usize,
        /// Column of the stranded cell.
        col: usize,
    },
}
