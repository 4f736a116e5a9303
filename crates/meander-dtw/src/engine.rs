//! Alignment engine: a reusable cost matrix plus three warping-path solvers.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::instrument;

use crate::constraint::WindowPercent;
use crate::error::DtwError;
use crate::matrix::CostMatrix;
use crate::metric::PointDistance;
use crate::path::{Alignment, WarpingPath, WarpingStep};
use crate::series::TimeSeriesView;
use crate::walk::Sampling;

/// Finite stand-in cost for moves that leave the band or the matrix.
///
/// Finite so that comparisons between prospective moves stay totally ordered.
pub const UNREACHABLE_COST: f64 = 1e12;

/// Path-construction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solver {
    /// Full banded DP fill with deterministic backtrace. Optimal.
    Exact,
    /// Single forward pass taking the locally cheapest move.
    Greedy,
    /// Single forward pass sampling moves with softmax-like weights.
    Stochastic(Sampling),
}

impl Solver {
    /// Return true if repeated calls on the same input can disagree.
    #[must_use]
    pub fn is_randomized(self) -> bool {
        !matches!(self, Self::Exact)
    }
}

impl fmt::Display for Solver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => f.write_str("exact"),
            Self::Greedy => f.write_str("greedy"),
            Self::Stochastic(sampling) => write!(f, "stochastic-{sampling}"),
        }
    }
}

/// Returned when a solver name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown solver \"{0}\" (expected exact, greedy, or stochastic)")]
pub struct UnknownSolver(String);

impl FromStr for Solver {
    type Err = UnknownSolver;

    /// Parse `exact`, `greedy`/`lucky`, or `stochastic`/`heuristic`
    /// (optionally suffixed `-uniform` or `-gaussian`, default gaussian).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let (name, sampling) = match lower.split_once('-') {
            Some((name, sampling)) => (name, Some(sampling)),
            None => (lower.as_str(), None),
        };
        match (name, sampling) {
            ("exact" | "normal", None) => Ok(Self::Exact),
            ("greedy" | "lucky", None) => Ok(Self::Greedy),
            ("stochastic" | "heuristic", None) => Ok(Self::Stochastic(Sampling::Gaussian)),
            ("stochastic" | "heuristic", Some(sampling)) => sampling
                .parse()
                .map(Self::Stochastic)
                .map_err(|_| UnknownSolver(s.to_string())),
            _ => Err(UnknownSolver(s.to_string())),
        }
    }
}

/// Banded DTW aligner owning a reusable cost matrix and a random source.
///
/// The cost matrix is sized once for the largest pair the engine will align
/// and is reset to `+inf` over the active region at the start of every call.
/// Calls mutate that buffer, so one engine serves one thread at a time; run
/// one engine per worker for parallel workloads.
///
/// The random source drives the greedy solver's tie-break and the stochastic
/// solver's move sampling. Seed it for reproducible runs.
#[derive(Debug, Clone)]
pub struct AlignmentEngine<R = ChaCha8Rng> {
    pub(crate) matrix: CostMatrix,
    pub(crate) rng: R,
}

impl AlignmentEngine<ChaCha8Rng> {
    /// Create an engine for series up to `max_len_a x max_len_b`, seeded from
    /// operating-system entropy.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::ZeroCapacity`] if either maximum length is zero.
    pub fn new(max_len_a: usize, max_len_b: usize) -> Result<Self, DtwError> {
        Self::with_rng(max_len_a, max_len_b, ChaCha8Rng::from_entropy())
    }

    /// Create an engine with a deterministic ChaCha8 stream.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::ZeroCapacity`] if either maximum length is zero.
    pub fn with_seed(max_len_a: usize, max_len_b: usize, seed: u64) -> Result<Self, DtwError> {
        Self::with_rng(max_len_a, max_len_b, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Restart the random stream from `seed`, keeping the cost matrix.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }
}

impl<R: Rng> AlignmentEngine<R> {
    /// Create an engine for series up to `max_len_a x max_len_b` drawing from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::ZeroCapacity`] if either maximum length is zero.
    pub fn with_rng(max_len_a: usize, max_len_b: usize, rng: R) -> Result<Self, DtwError> {
        if max_len_a == 0 || max_len_b == 0 {
            return Err(DtwError::ZeroCapacity {
                max_len_a,
                max_len_b,
            });
        }
        Ok(Self {
            matrix: CostMatrix::with_capacity(max_len_a, max_len_b),
            rng,
        })
    }

    /// Return the largest `(query, reference)` lengths this engine accepts.
    #[must_use]
    pub fn capacity(&self) -> (usize, usize) {
        (self.matrix.max_rows(), self.matrix.max_cols())
    }

    /// Align `a` against `b` with the chosen solver.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::CapacityExceeded`] if the pair does not fit the engine.
    pub fn align<D: PointDistance + ?Sized>(
        &mut self,
        a: TimeSeriesView<'_>,
        b: TimeSeriesView<'_>,
        dist: &D,
        window: WindowPercent,
        solver: Solver,
    ) -> Result<Alignment, DtwError> {
        match solver {
            Solver::Exact => self.align_exact(a, b, dist, window),
            Solver::Greedy => self.align_greedy(a, b, dist, window),
            Solver::Stochastic(sampling) => self.align_stochastic(a, b, dist, window, sampling),
        }
    }

    /// Optimal banded DTW alignment with warping path.
    ///
    /// Fills `C[i][j] = d(a_i, b_j) + min(C[i-1][j], C[i-1][j-1], C[i][j-1])`
    /// over the band (the full rectangle for [`WindowPercent::FULL`]), then
    /// walks back from `(n-1, m-1)` to `(0, 0)`. Runs in O(n * bw) time.
    ///
    /// Identical inputs always produce the identical path and distance.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::CapacityExceeded`] | `a.len()` or `b.len()` exceeds the engine capacity |
    #[instrument(level = "trace", skip_all, fields(len_a = a.len(), len_b = b.len(), window = window.value()))]
    pub fn align_exact<D: PointDistance + ?Sized>(
        &mut self,
        a: TimeSeriesView<'_>,
        b: TimeSeriesView<'_>,
        dist: &D,
        window: WindowPercent,
    ) -> Result<Alignment, DtwError> {
        let (n, m) = self.prepare(a, b)?;
        let band = window.constraint(n, m);
        let cost = &mut self.matrix;

        // Cells outside the band keep the +inf written by `prepare`, so any
        // neighbour read from them never wins a minimum.
        for i in 0..n {
            for j in band.column_range(i, m) {
                let local = point_cost(dist, a[i], b[j]);
                let best_prev = if i == 0 && j == 0 {
                    0.0
                } else {
                    let up = if i > 0 { cost[(i - 1, j)] } else { f64::INFINITY };
                    let diag = if i > 0 && j > 0 {
                        cost[(i - 1, j - 1)]
                    } else {
                        f64::INFINITY
                    };
                    let left = if j > 0 { cost[(i, j - 1)] } else { f64::INFINITY };
                    up.min(diag).min(left)
                };
                cost[(i, j)] = local + best_prev;
            }
        }

        let distance = cost[(n - 1, m - 1)];
        let path = self.backtrace(n, m);
        Ok(Alignment::new(distance, path))
    }

    /// Validate the pair against capacity and reset the active region.
    pub(crate) fn prepare(
        &mut self,
        a: TimeSeriesView<'_>,
        b: TimeSeriesView<'_>,
    ) -> Result<(usize, usize), DtwError> {
        let (n, m) = (a.len(), b.len());
        if n == 0 || m == 0 {
            return Err(DtwError::EmptySeries);
        }
        let (max_len_a, max_len_b) = self.capacity();
        if n > max_len_a || m > max_len_b {
            return Err(DtwError::CapacityExceeded {
                len_a: n,
                len_b: m,
                max_len_a,
                max_len_b,
            });
        }
        self.matrix.reset(n, m);
        Ok((n, m))
    }

    /// Walk the filled matrix from `(n-1, m-1)` back to the origin.
    fn backtrace(&self, n: usize, m: usize) -> WarpingPath {
        let cost = &self.matrix;
        let (mut i, mut j) = (n - 1, m - 1);
        let mut steps = VecDeque::with_capacity(n + m - 1);
        steps.push_front(WarpingStep::new(i, j));

        while i > 0 || j > 0 {
            let diag = if i > 0 && j > 0 {
                cost[(i - 1, j - 1)]
            } else {
                f64::INFINITY
            };
            let left = if j > 0 { cost[(i, j - 1)] } else { f64::INFINITY };
            let up = if i > 0 { cost[(i - 1, j)] } else { f64::INFINITY };

            match backtrace_move(diag, left, up, i, j) {
                Move::Diagonal => {
                    i -= 1;
                    j -= 1;
                }
                Move::Down => i -= 1,
                Move::Right => j -= 1,
            }
            steps.push_front(WarpingStep::new(i, j));
        }

        WarpingPath::new(steps.into())
    }
}

/// One step of a warping path, named by its forward direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Move {
    /// `(i + 1, j + 1)`
    Diagonal,
    /// `(i + 1, j)`
    Down,
    /// `(i, j + 1)`
    Right,
}

impl Move {
    pub(crate) fn apply(self, i: usize, j: usize) -> (usize, usize) {
        match self {
            Self::Diagonal => (i + 1, j + 1),
            Self::Down => (i + 1, j),
            Self::Right => (i, j + 1),
        }
    }
}

/// Pick which move led into `(i, j)` during backtrace.
///
/// The diagonal wins whenever it is not strictly beaten. A strictly cheaper
/// left or up neighbour wins next. On a left/up tie, `i` is decremented when
/// `i <= j`, otherwise `j`. On the matrix edges only one move exists.
fn backtrace_move(diag: f64, left: f64, up: f64, i: usize, j: usize) -> Move {
    if i == 0 {
        return Move::Right;
    }
    if j == 0 {
        return Move::Down;
    }
    if diag <= left && diag <= up {
        Move::Diagonal
    } else if left < diag && left < up {
        Move::Right
    } else if up < diag && up < left {
        Move::Down
    } else if i <= j {
        Move::Down
    } else {
        Move::Right
    }
}

/// Evaluate the point distance, checking its contract in debug builds.
#[inline]
pub(crate) fn point_cost<D: PointDistance + ?Sized>(dist: &D, x: f64, y: f64) -> f64 {
    let c = dist.distance(x, y);
    debug_assert!(
        c.is_finite() && c >= 0.0,
        "point distance must be finite and non-negative, got {c}"
    );
    c
}
