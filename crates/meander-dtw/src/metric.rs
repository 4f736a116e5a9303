//! Element-wise distances between two samples.

use std::fmt;
use std::str::FromStr;

/// Cost of matching sample `a` of the query against sample `b` of the reference.
///
/// Implementations must be deterministic and return a finite, non-negative
/// value. Symmetry is not required. The engine checks the contract with
/// debug assertions only.
pub trait PointDistance {
    /// Return the matching cost of two samples.
    fn distance(&self, a: f64, b: f64) -> f64;
}

impl<F> PointDistance for F
where
    F: Fn(f64, f64) -> f64,
{
    fn distance(&self, a: f64, b: f64) -> f64 {
        self(a, b)
    }
}

/// Built-in element-wise distances, selectable by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointMetric {
    /// `|a - b|`. One-dimensional Euclidean distance.
    #[default]
    Absolute,
    /// `(a - b)^2`.
    Squared,
}

impl PointDistance for PointMetric {
    #[inline]
    fn distance(&self, a: f64, b: f64) -> f64 {
        match self {
            Self::Absolute => (a - b).abs(),
            Self::Squared => (a - b).powi(2),
        }
    }
}

/// Returned when a metric name is not registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown point metric \"{0}\" (expected absolute or squared)")]
pub struct UnknownMetric(String);

impl FromStr for PointMetric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "absolute" | "abs" | "euclidean" | "euclideandistance" => Ok(Self::Absolute),
            "squared" | "sq" | "squaredeuclidean" => Ok(Self::Squared),
            _ => Err(UnknownMetric(s.to_string())),
        }
    }
}

impl fmt::Display for PointMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute => f.write_str("absolute"),
            Self::Squared => f.write_str("squared"),
        }
    }
}
