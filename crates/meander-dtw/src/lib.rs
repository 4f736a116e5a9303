//! Banded DTW alignment engine.
//!
//! Pure math library with zero I/O. Aligns two one-dimensional series under a
//! Sakoe-Chiba band with one of three strategies sharing a reusable cost
//! matrix: an exact DP solver with backtrace, a greedy forward walk, and a
//! stochastic forward walk with softmax-like move sampling.

mod constraint;
mod distance;
mod engine;
mod error;
mod matrix;
mod metric;
mod path;
mod series;
mod walk;

pub use constraint::{compute_band_width, BandConstraint, WindowPercent};
pub use distance::DtwDistance;
pub use engine::{AlignmentEngine, Solver, UnknownSolver, UNREACHABLE_COST};
pub use error::DtwError;
pub use metric::{PointDistance, PointMetric, UnknownMetric};
pub use path::{Alignment, WarpingPath, WarpingStep};
pub use series::{LabeledSeries, TimeSeries, TimeSeriesView};
pub use walk::{Sampling, UnknownSampling};
