//! Warping window parameter and band constraint types.

use std::fmt;
use std::ops::Range;

use crate::error::DtwError;

/// Warping window as a percentage of the query length.
///
/// `0` is the narrowest band the series lengths allow; `100` lifts the band
/// entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowPercent(u32);

impl WindowPercent {
    /// The unrestricted window.
    pub const FULL: Self = Self(100);

    /// Validate a window percentage.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::InvalidWindow`] if `window > 100`.
    pub fn new(window: u32) -> Result<Self, DtwError> {
        if window > 100 {
            return Err(DtwError::InvalidWindow { window });
        }
        Ok(Self(window))
    }

    /// Return the raw percentage.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    /// Return true if this window lifts the band.
    #[must_use]
    pub fn is_unrestricted(self) -> bool {
        self.0 == 100
    }

    /// Resolve the band constraint for a pair of series lengths.
    #[must_use]
    pub fn constraint(self, len_a: usize, len_b: usize) -> BandConstraint {
        if self.is_unrestricted() {
            BandConstraint::Unconstrained
        } else {
            BandConstraint::SakoeChibaRadius(compute_band_width(self, len_a, len_b))
        }
    }
}

impl fmt::Display for WindowPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Compute the Sakoe-Chiba radius for a window percentage and two series lengths.
///
/// The radius is never below the length difference, so the terminal cell
/// `(len_a - 1, len_b - 1)` is always reachable inside the band.
///
/// | Window | Radius |
/// |---|---|
/// | `0` | `max(1, abs(len_a - len_b))` |
/// | `p > 0` | `max(ceil(p * len_a / 100), abs(len_a - len_b))` |
#[must_use]
pub fn compute_band_width(window: WindowPercent, len_a: usize, len_b: usize) -> usize {
    let diff = len_a.abs_diff(len_b);
    let scaled = if window.value() == 0 {
        1
    } else {
        (window.value() as usize * len_a).div_ceil(100)
    };
    scaled.max(diff)
}

/// Constraint on the DTW warping window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BandConstraint {
    /// No constraint: full cost matrix is computed.
    #[default]
    Unconstrained,

    /// Sakoe-Chiba band: cell (i,j) is valid only if |i - j| <= radius.
    SakoeChibaRadius(usize),
}

impl BandConstraint {
    /// Return true if cell `(row, col)` lies inside the band.
    ///
    /// Bounds against the series lengths are the caller's concern.
    #[must_use]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::SakoeChibaRadius(r) => row.abs_diff(col) <= *r,
        }
    }

    /// Return the valid column range for a given row in the cost matrix.
    ///
    /// For unconstrained DTW, returns `0..n_cols`.
    /// For Sakoe-Chiba, returns the intersection of `[row - r, row + r]` with `[0, n_cols)`.
    #[must_use]
    pub fn column_range(&self, row: usize, n_cols: usize) -> Range<usize> {
        match self {
            Self::Unconstrained => 0..n_cols,
            Self::SakoeChibaRadius(r) => {
                let start = row.saturating_sub(*r);
                let end = (row + r + 1).min(n_cols);
                start..end
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(p: u32) -> WindowPercent {
        WindowPercent::new(p).unwrap()
    }

    #[test]
    fn window_rejects_above_hundred() {
        assert!(matches!(
            WindowPercent::new(101),
            Err(DtwError::InvalidWindow { window: 101 })
        ));
        assert!(WindowPercent::new(100).unwrap().is_unrestricted());
    }

    #[test]
    fn zero_window_is_one_for_equal_lengths() {
        assert_eq!(compute_band_width(window(0), 10, 10), 1);
    }

    #[test]
    fn zero_window_widens_to_length_difference() {
        assert_eq!(compute_band_width(window(0), 3, 7), 4);
    }

    #[test]
    fn percentage_rounds_up() {
        // ceil(10 * 25 / 100) = ceil(2.5) = 3
        assert_eq!(compute_band_width(window(10), 25, 25), 3);
        // ceil(1 * 5 / 100) = 1
        assert_eq!(compute_band_width(window(1), 5, 5), 1);
    }

    #[test]
    fn percentage_uses_query_length() {
        // ceil(50 * 4 / 100) = 2, but |4 - 10| = 6 dominates.
        assert_eq!(compute_band_width(window(50), 4, 10), 6);
        // ceil(50 * 10 / 100) = 5 > |10 - 4|
        assert_eq!(compute_band_width(window(50), 10, 4), 6);
        assert_eq!(compute_band_width(window(80), 10, 4), 8);
    }

    #[test]
    fn band_width_never_below_length_difference() {
        for p in 0..=100 {
            for len_a in 1..=12 {
                for len_b in 1..=12 {
                    let w = compute_band_width(window(p), len_a, len_b);
                    assert!(w >= 1);
                    assert!(w >= len_a.abs_diff(len_b), "p={p} {len_a}x{len_b} gave {w}");
                }
            }
        }
    }

    #[test]
    fn full_window_is_unconstrained() {
        assert_eq!(WindowPercent::FULL.constraint(4, 9), BandConstraint::Unconstrained);
        assert_eq!(
            window(20).constraint(10, 10),
            BandConstraint::SakoeChibaRadius(2)
        );
    }

    #[test]
    fn contains_matches_column_range() {
        let c = BandConstraint::SakoeChibaRadius(2);
        for row in 0..10 {
            let range = c.column_range(row, 10);
            for col in 0..10 {
                assert_eq!(c.contains(row, col), range.contains(&col));
            }
        }
    }

    #[test]
    fn sakoe_chiba_first_row() {
        let c = BandConstraint::SakoeChibaRadius(2);
        assert_eq!(c.column_range(0, 10), 0..3);
    }

    #[test]
    fn sakoe_chiba_radius_exceeds_size() {
        let c = BandConstraint::SakoeChibaRadius(20);
        assert_eq!(c.column_range(3, 5), 0..5);
    }

    #[test]
    fn default_is_unconstrained() {
        assert_eq!(BandConstraint::default(), BandConstraint::Unconstrained);
    }
}
