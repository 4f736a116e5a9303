//! 1-nearest-neighbour time-series classification with banded DTW.
//!
//! Repeats a sweep of every query instance against every reference instance
//! for a number of runs. Randomized solvers get several trials per pair and
//! the minimum distance is kept.

mod classify;
mod config;
mod error;
mod result;

pub use config::NearestNeighborConfig;
pub use error::KnnError;
pub use result::{ClassificationResult, PairRecord, Prediction, RunResult};
