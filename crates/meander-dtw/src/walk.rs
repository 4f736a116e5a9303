//! Forward-walk solvers: greedy and stochastic warping-path construction.
//!
//! Both solvers start at `(0, 0)` and commit to one move per step until they
//! reach `(n-1, m-1)`, touching only the cells on the path. Each step moves
//! right, down, or diagonally, so a walk visits at most `n + m - 1` cells.
//!
//! From any non-terminal cell inside the band at least one move is valid:
//! the diagonal while both indices can grow, otherwise the one axis move
//! towards the terminal cell, which the band admits because its radius is
//! never below `|n - m|`.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use tracing::instrument;

use crate::constraint::{BandConstraint, WindowPercent};
use crate::engine::{AlignmentEngine, Move, UNREACHABLE_COST, point_cost};
use crate::error::DtwError;
use crate::metric::PointDistance;
use crate::path::{Alignment, WarpingPath, WarpingStep};
use crate::series::TimeSeriesView;

/// Steepness of the `exp(-alpha * cost)` move weighting.
const STEEPNESS: f64 = 5.0;

/// Draws attempted per step before the stochastic solver settles for the
/// cheapest valid move.
const MAX_DRAWS: usize = 64;

/// Distribution of the per-step selection draw in the stochastic solver.
///
/// The move thresholds partition `[0, 2]`; both distributions are centred
/// on `1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sampling {
    /// Uniform on `[0, 2)`.
    Uniform,
    /// Normal with mean `1` and standard deviation `1/3`.
    #[default]
    Gaussian,
}

impl Sampling {
    const GAUSSIAN_MEAN: f64 = 1.0;
    const GAUSSIAN_STD_DEV: f64 = 1.0 / 3.0;

    fn draw<R: Rng + ?Sized>(self, rng: &mut R) -> f64 {
        match self {
            Self::Uniform => rng.gen_range(0.0..2.0),
            Self::Gaussian => {
                let z: f64 = StandardNormal.sample(rng);
                Self::GAUSSIAN_MEAN + Self::GAUSSIAN_STD_DEV * z
            }
        }
    }
}

impl fmt::Display for Sampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform => f.write_str("uniform"),
            Self::Gaussian => f.write_str("gaussian"),
        }
    }
}

/// Returned when a sampling distribution name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sampling distribution \"{0}\" (expected uniform or gaussian)")]
pub struct UnknownSampling(String);

impl FromStr for Sampling {
    type Err = UnknownSampling;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" | "1" => Ok(Self::Uniform),
            "gaussian" | "normal" | "2" => Ok(Self::Gaussian),
            _ => Err(UnknownSampling(s.to_string())),
        }
    }
}

/// Element costs of the three prospective next cells. `None` marks a move
/// that leaves the matrix or the band.
#[derive(Debug, Clone, Copy)]
struct Candidates {
    diagonal: Option<f64>,
    down: Option<f64>,
    right: Option<f64>,
}

impl Candidates {
    fn at<D: PointDistance + ?Sized>(
        a: TimeSeriesView<'_>,
        b: TimeSeriesView<'_>,
        dist: &D,
        band: BandConstraint,
        i: usize,
        j: usize,
    ) -> Self {
        let (n, m) = (a.len(), b.len());
        let diagonal = (i + 1 < n && j + 1 < m).then(|| point_cost(dist, a[i + 1], b[j + 1]));
        let down = (i + 1 < n && band.contains(i + 1, j)).then(|| point_cost(dist, a[i + 1], b[j]));
        let right = (j + 1 < m && band.contains(i, j + 1)).then(|| point_cost(dist, a[i], b[j + 1]));
        Self {
            diagonal,
            down,
            right,
        }
    }

    fn cost(&self, mv: Move) -> Option<f64> {
        match mv {
            Move::Diagonal => self.diagonal,
            Move::Down => self.down,
            Move::Right => self.right,
        }
    }

    fn is_valid(&self, mv: Move) -> bool {
        self.cost(mv).is_some()
    }

    /// Cost with invalid moves replaced by [`UNREACHABLE_COST`].
    fn sentinel_cost(&self, mv: Move) -> f64 {
        self.cost(mv).unwrap_or(UNREACHABLE_COST)
    }

    /// Return `chosen` with its cost, falling back to the cheapest valid move.
    fn resolve(&self, chosen: Move, i: usize, j: usize) -> Result<(Move, f64), DtwError> {
        match self.cost(chosen) {
            Some(c) => Ok((chosen, c)),
            None => self
                .cheapest()
                .ok_or(DtwError::NoValidMove { row: i, col: j }),
        }
    }

    /// Cheapest valid move, diagonal first on ties.
    fn cheapest(&self) -> Option<(Move, f64)> {
        [Move::Diagonal, Move::Right, Move::Down]
            .into_iter()
            .filter_map(|mv| self.cost(mv).map(|c| (mv, c)))
            .min_by(|x, y| x.1.total_cmp(&y.1))
    }
}

impl<R: Rng> AlignmentEngine<R> {
    /// Approximate alignment taking the locally cheapest move at every step.
    ///
    /// Invalid moves cost [`UNREACHABLE_COST`]. The diagonal wins every tie
    /// it is part of; a down/right tie strictly below the diagonal is broken
    /// by a fair coin from the engine's random source. Never backtracks, so
    /// the result can exceed the exact distance; work is O(path length).
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::CapacityExceeded`] | `a.len()` or `b.len()` exceeds the engine capacity |
    #[instrument(level = "trace", skip_all, fields(len_a = a.len(), len_b = b.len(), window = window.value()))]
    pub fn align_greedy<D: PointDistance + ?Sized>(
        &mut self,
        a: TimeSeriesView<'_>,
        b: TimeSeriesView<'_>,
        dist: &D,
        window: WindowPercent,
    ) -> Result<Alignment, DtwError> {
        self.walk(a, b, dist, window, greedy_move::<R>)
    }

    /// Approximate alignment sampling each move with weights `exp(-5 * cost)`.
    ///
    /// With `h = (w_right + w_diag + w_down) / 2`, the thresholds
    /// `p0 = w_right / h` and `p1 = p0 + w_diag / h` split `[0, 2]` into
    /// right, diagonal and down spans. A draw below `p0` moves right, above
    /// `p1` moves down, anything else moves diagonally; a draw landing on an
    /// invalid move is redrawn. Repeated calls give different paths, so
    /// callers wanting a stable estimate keep the minimum over several runs.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::CapacityExceeded`] | `a.len()` or `b.len()` exceeds the engine capacity |
    #[instrument(level = "trace", skip_all, fields(len_a = a.len(), len_b = b.len(), window = window.value(), %sampling))]
    pub fn align_stochastic<D: PointDistance + ?Sized>(
        &mut self,
        a: TimeSeriesView<'_>,
        b: TimeSeriesView<'_>,
        dist: &D,
        window: WindowPercent,
        sampling: Sampling,
    ) -> Result<Alignment, DtwError> {
        self.walk(a, b, dist, window, |candidates, rng| {
            stochastic_move(candidates, sampling, rng)
        })
    }

    /// Drive the `AT_CELL(i, j) -> DONE` walk with a move selection rule.
    fn walk<D, F>(
        &mut self,
        a: TimeSeriesView<'_>,
        b: TimeSeriesView<'_>,
        dist: &D,
        window: WindowPercent,
        mut choose: F,
    ) -> Result<Alignment, DtwError>
    where
        D: PointDistance + ?Sized,
        F: FnMut(&Candidates, &mut R) -> Move,
    {
        let (n, m) = self.prepare(a, b)?;
        let band = window.constraint(n, m);
        let terminal = (n - 1, m - 1);

        let (mut i, mut j) = (0, 0);
        self.matrix[(0, 0)] = point_cost(dist, a[0], b[0]);
        let mut steps = Vec::with_capacity(n + m - 1);
        steps.push(WarpingStep::ORIGIN);

        while (i, j) != terminal {
            let candidates = Candidates::at(a, b, dist, band, i, j);
            let chosen = choose(&candidates, &mut self.rng);
            let (mv, step_cost) = candidates.resolve(chosen, i, j)?;
            let (next_i, next_j) = mv.apply(i, j);
            self.matrix[(next_i, next_j)] = self.matrix[(i, j)] + step_cost;
            i = next_i;
            j = next_j;
            steps.push(WarpingStep::new(i, j));
        }

        Ok(Alignment::new(self.matrix[terminal], WarpingPath::new(steps)))
    }
}

fn greedy_move<R: Rng>(candidates: &Candidates, rng: &mut R) -> Move {
    let diag = candidates.sentinel_cost(Move::Diagonal);
    let down = candidates.sentinel_cost(Move::Down);
    let right = candidates.sentinel_cost(Move::Right);

    if diag <= right && diag <= down {
        Move::Diagonal
    } else if right < diag && right < down {
        Move::Right
    } else if down < diag && down < right {
        Move::Down
    } else if rng.gen_bool(0.5) {
        Move::Down
    } else {
        Move::Right
    }
}

/// Cumulative thresholds `(p0, p1)` over `[0, 2]` for the right, diagonal
/// and down spans.
///
/// Weights are `exp(-5 * cost)` normalized by half their sum. If every
/// weight underflows, the valid moves are weighted equally.
fn thresholds(candidates: &Candidates) -> (f64, f64) {
    let weight = |mv| (-STEEPNESS * candidates.sentinel_cost(mv)).exp();
    let mut w_right = weight(Move::Right);
    let mut w_diag = weight(Move::Diagonal);
    let mut w_down = weight(Move::Down);

    if w_right + w_diag + w_down == 0.0 {
        let indicator = |mv| if candidates.is_valid(mv) { 1.0 } else { 0.0 };
        w_right = indicator(Move::Right);
        w_diag = indicator(Move::Diagonal);
        w_down = indicator(Move::Down);
    }

    let half = (w_right + w_diag + w_down) / 2.0;
    let p0 = w_right / half;
    (p0, p0 + w_diag / half)
}

fn stochastic_move<R: Rng>(candidates: &Candidates, sampling: Sampling, rng: &mut R) -> Move {
    let (p0, p1) = thresholds(candidates);

    for _ in 0..MAX_DRAWS {
        let s = sampling.draw(rng);
        if s < p0 && candidates.is_valid(Move::Right) {
            return Move::Right;
        }
        if s > p1 && candidates.is_valid(Move::Down) {
            return Move::Down;
        }
        if candidates.is_valid(Move::Diagonal) {
            return Move::Diagonal;
        }
    }

    candidates
        .cheapest()
        .map_or(Move::Diagonal, |(mv, _)| mv)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::metric::PointMetric;
    use crate::series::TimeSeries;

    fn ts(values: &[f64]) -> TimeSeries {
        TimeSeries::new(values.to_vec()).unwrap()
    }

    fn window(p: u32) -> WindowPercent {
        WindowPercent::new(p).unwrap()
    }

    fn candidates(diagonal: Option<f64>, down: Option<f64>, right: Option<f64>) -> Candidates {
        Candidates {
            diagonal,
            down,
            right,
        }
    }

    #[test]
    fn greedy_prefers_diagonal_on_ties() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let c = candidates(Some(1.0), Some(1.0), Some(1.0));
        for _ in 0..20 {
            assert_eq!(greedy_move(&c, &mut rng), Move::Diagonal);
        }
    }

    #[test]
    fn greedy_takes_strict_minimum() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            greedy_move(&candidates(Some(2.0), Some(3.0), Some(1.0)), &mut rng),
            Move::Right
        );
        assert_eq!(
            greedy_move(&candidates(Some(2.0), Some(1.0), Some(3.0)), &mut rng),
            Move::Down
        );
    }

    #[test]
    fn greedy_coin_flip_uses_both_orthogonal_moves() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let c = candidates(Some(5.0), Some(1.0), Some(1.0));
        let picks: Vec<Move> = (0..200).map(|_| greedy_move(&c, &mut rng)).collect();
        assert!(picks.contains(&Move::Down));
        assert!(picks.contains(&Move::Right));
        assert!(!picks.contains(&Move::Diagonal));
    }

    #[test]
    fn greedy_treats_invalid_moves_as_unreachable() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            greedy_move(&candidates(None, None, Some(1e6)), &mut rng),
            Move::Right
        );
    }

    #[test]
    fn stochastic_only_returns_valid_moves() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let only_down = candidates(None, Some(0.4), None);
        let only_right = candidates(None, None, Some(0.4));
        for sampling in [Sampling::Uniform, Sampling::Gaussian] {
            for _ in 0..200 {
                assert_eq!(stochastic_move(&only_down, sampling, &mut rng), Move::Down);
                assert_eq!(stochastic_move(&only_right, sampling, &mut rng), Move::Right);
            }
        }
    }

    #[test]
    fn stochastic_survives_underflowing_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let c = candidates(None, Some(1e4), Some(2e4));
        for _ in 0..100 {
            let mv = stochastic_move(&c, Sampling::Uniform, &mut rng);
            assert!(matches!(mv, Move::Down | Move::Right));
        }
    }

    #[test]
    fn stochastic_favours_cheap_moves() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let c = candidates(Some(0.0), Some(2.0), Some(2.0));
        let diagonal = (0..1000)
            .filter(|_| stochastic_move(&c, Sampling::Uniform, &mut rng) == Move::Diagonal)
            .count();
        // w_diag = 1, w_down = w_right = exp(-10): the diagonal takes almost all draws.
        assert!(diagonal > 990, "diagonal chosen {diagonal} times");
    }

    #[test]
    fn thresholds_normalize_by_half_the_weight_sum() {
        let c = candidates(Some(0.2), Some(0.3), Some(0.1));
        let (p0, p1) = thresholds(&c);
        assert!((p0 - 1.012_960_8).abs() < 1e-6, "p0 = {p0}");
        assert!((p1 - 1.627_352_6).abs() < 1e-6, "p1 = {p1}");
    }

    #[test]
    fn thresholds_split_evenly_after_underflow() {
        let c = candidates(None, Some(1e4), Some(2e4));
        assert_eq!(thresholds(&c), (1.0, 1.0));
    }

    #[test]
    fn gaussian_move_frequencies_follow_thresholds() {
        // With draws from N(1, 1/3): P(right) = Phi(3 (p0 - 1)),
        // P(down) = 1 - Phi(3 (p1 - 1)), diagonal takes the rest.
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let c = candidates(Some(0.2), Some(0.3), Some(0.1));
        let trials = 20_000;
        let (mut right, mut diag, mut down) = (0usize, 0usize, 0usize);
        for _ in 0..trials {
            match stochastic_move(&c, Sampling::Gaussian, &mut rng) {
                Move::Right => right += 1,
                Move::Diagonal => diag += 1,
                Move::Down => down += 1,
            }
        }
        let freq = |k: usize| k as f64 / trials as f64;
        assert!((freq(right) - 0.515_508).abs() < 0.015, "right {}", freq(right));
        assert!((freq(diag) - 0.454_578).abs() < 0.015, "diagonal {}", freq(diag));
        assert!((freq(down) - 0.029_914).abs() < 0.006, "down {}", freq(down));
    }

    #[test]
    fn uniform_move_frequencies_follow_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let c = candidates(Some(0.2), Some(0.3), Some(0.1));
        let trials = 20_000;
        let right = (0..trials)
            .filter(|_| stochastic_move(&c, Sampling::Uniform, &mut rng) == Move::Right)
            .count();
        // Uniform on [0, 2): P(right) = p0 / 2 = w_right / sum.
        let expected = (-0.5f64).exp() / ((-0.5f64).exp() + (-1.0f64).exp() + (-1.5f64).exp());
        let freq = right as f64 / trials as f64;
        assert!((freq - expected).abs() < 0.015, "right {freq} vs {expected}");
    }

    #[test]
    fn resolve_keeps_valid_choice_and_falls_back_otherwise() {
        let c = candidates(None, Some(0.7), Some(0.2));
        assert_eq!(c.resolve(Move::Down, 1, 2).unwrap(), (Move::Down, 0.7));
        assert_eq!(c.resolve(Move::Diagonal, 1, 2).unwrap(), (Move::Right, 0.2));
    }

    #[test]
    fn resolve_reports_stranded_cell() {
        let c = candidates(None, None, None);
        assert!(matches!(
            c.resolve(Move::Diagonal, 4, 1),
            Err(DtwError::NoValidMove { row: 4, col: 1 })
        ));
    }

    #[test]
    fn sampling_draws_within_expected_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..1000 {
            let s = Sampling::Uniform.draw(&mut rng);
            assert!((0.0..2.0).contains(&s));
        }
        let mean = (0..4000).map(|_| Sampling::Gaussian.draw(&mut rng)).sum::<f64>() / 4000.0;
        assert!((mean - 1.0).abs() < 0.05, "gaussian mean {mean}");
    }

    #[test]
    fn parse_sampling_names() {
        assert_eq!("uniform".parse::<Sampling>().unwrap(), Sampling::Uniform);
        assert_eq!("Normal".parse::<Sampling>().unwrap(), Sampling::Gaussian);
        assert_eq!("1".parse::<Sampling>().unwrap(), Sampling::Uniform);
        assert!("poisson".parse::<Sampling>().is_err());
    }

    #[test]
    fn single_cell_walk_finishes_immediately() {
        let mut engine = AlignmentEngine::with_seed(1, 1, 0).unwrap();
        let a = ts(&[2.0]);
        let b = ts(&[5.0]);
        let greedy = engine
            .align_greedy(a.as_view(), b.as_view(), &PointMetric::Absolute, window(0))
            .unwrap();
        let stochastic = engine
            .align_stochastic(a.as_view(), b.as_view(), &PointMetric::Absolute, window(0), Sampling::Gaussian)
            .unwrap();
        for result in [greedy, stochastic] {
            assert_eq!(result.distance().value(), 3.0);
            assert_eq!(result.path_len(), 1);
        }
    }

    #[test]
    fn greedy_follows_cheap_diagonal() {
        let mut engine = AlignmentEngine::with_seed(4, 4, 0).unwrap();
        let a = ts(&[1.0, 2.0, 3.0, 4.0]);
        let result = engine
            .align_greedy(a.as_view(), a.as_view(), &PointMetric::Absolute, window(50))
            .unwrap();
        assert_eq!(result.distance().value(), 0.0);
        assert_eq!(result.path_len(), 4);
        for step in result.path() {
            assert_eq!(step.a, step.b);
        }
    }

    #[test]
    fn greedy_walks_off_the_diagonal_when_lengths_differ() {
        let mut engine = AlignmentEngine::with_seed(3, 5, 0).unwrap();
        let a = ts(&[0.0, 0.0, 0.0]);
        let b = ts(&[0.0, 0.0, 0.0, 0.0, 0.0]);
        let result = engine
            .align_greedy(a.as_view(), b.as_view(), &PointMetric::Absolute, window(0))
            .unwrap();
        assert_eq!(result.path().last(), Some(WarpingStep::new(2, 4)));
        assert_eq!(result.distance().value(), 0.0);
    }

    #[test]
    fn seeded_engines_repeat_stochastic_walks() {
        let a = ts(&[0.1, 0.4, 0.2, 0.8, 0.5, 0.3]);
        let b = ts(&[0.2, 0.3, 0.6, 0.7, 0.4, 0.1, 0.0]);
        let mut first = AlignmentEngine::with_seed(6, 7, 99).unwrap();
        let mut second = AlignmentEngine::with_seed(6, 7, 99).unwrap();
        for _ in 0..10 {
            let x = first
                .align_stochastic(a.as_view(), b.as_view(), &PointMetric::Absolute, window(50), Sampling::Uniform)
                .unwrap();
            let y = second
                .align_stochastic(a.as_view(), b.as_view(), &PointMetric::Absolute, window(50), Sampling::Uniform)
                .unwrap();
            assert_eq!(x, y);
        }
    }
}
