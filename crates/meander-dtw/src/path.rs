//! Warping path and alignment result types.

use crate::distance::DtwDistance;

/// A single step in a DTW warping path, mapping index `a` in the query series
/// to index `b` in the reference series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WarpingStep {
    /// Index in the query series.
    pub a: usize,
    /// Index in the reference series.
    pub b: usize,
}

impl WarpingStep {
    pub(crate) const ORIGIN: Self = Self { a: 0, b: 0 };

    pub(crate) fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }
}

/// An ordered sequence of warping steps from `(0, 0)` to `(n-1, m-1)`.
///
/// Consecutive steps differ by exactly one of `(0, 1)`, `(1, 0)` or `(1, 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarpingPath(Vec<WarpingStep>);

impl WarpingPath {
    /// Create a new warping path from a vector of steps in path order.
    pub(crate) fn new(steps: Vec<WarpingStep>) -> Self {
        Self(steps)
    }

    /// Return the warping steps as a slice.
    #[must_use]
    pub fn steps(&self) -> &[WarpingStep] {
        &self.0
    }

    /// Return the number of steps in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path contains no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the first step, always `(0, 0)` for an engine-produced path.
    #[must_use]
    pub fn first(&self) -> Option<WarpingStep> {
        self.0.first().copied()
    }

    /// Return the last step, always `(n-1, m-1)` for an engine-produced path.
    #[must_use]
    pub fn last(&self) -> Option<WarpingStep> {
        self.0.last().copied()
    }
}

impl<'a> IntoIterator for &'a WarpingPath {
    type Item = &'a WarpingStep;
    type IntoIter = std::slice::Iter<'a, WarpingStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Outcome of one alignment call: the realized warping path and the
/// cumulative cost along it.
///
/// Only built once the terminal cell has been reached, so the distance is
/// always set.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    distance: DtwDistance,
    path: WarpingPath,
}

impl Alignment {
    pub(crate) fn new(distance: f64, path: WarpingPath) -> Self {
        Self {
            distance: DtwDistance::new(distance),
            path,
        }
    }

    /// Return the cumulative distance at the terminal cell.
    #[must_use]
    pub fn distance(&self) -> DtwDistance {
        self.distance
    }

    /// Return the realized warping path.
    #[must_use]
    pub fn path(&self) -> &WarpingPath {
        &self.path
    }

    /// Return the number of cells on the warping path.
    #[must_use]
    pub fn path_len(&self) -> usize {
        self.path.len()
    }

    /// Consume the record and return its parts.
    #[must_use]
    pub fn into_parts(self) -> (DtwDistance, WarpingPath) {
        (self.distance, self.path)
    }
}
