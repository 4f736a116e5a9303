//! Alignment cost at the terminal cell.

use std::fmt;

/// Sum of element costs along a warping path.
///
/// Costs are non-negative, so the only non-finite value that can appear is
/// [`DtwDistance::INFINITY`], the seed of a nearest-reference search.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DtwDistance(f64);

impl DtwDistance {
    /// No alignment scored yet.
    pub const INFINITY: Self = Self(f64::INFINITY);

    pub(crate) fn new(value: f64) -> Self {
        debug_assert!(value >= 0.0, "alignment cost must be non-negative, got {value}");
        Self(value)
    }

    /// Return the raw cost.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// `true` once a real alignment has been scored.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// `true` if `self` is strictly cheaper than `incumbent`.
    ///
    /// Equal costs keep the incumbent, so the first of several tied
    /// candidates wins a minimum search.
    #[must_use]
    pub fn improves_on(self, incumbent: Self) -> bool {
        self.0 < incumbent.0
    }
}

impl From<DtwDistance> for f64 {
    fn from(distance: DtwDistance) -> Self {
        distance.0
    }
}

impl fmt::Display for DtwDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_finite() {
            write!(f, "{:.6}", self.0)
        } else {
            f.write_str("unreachable")
        }
    }
}
