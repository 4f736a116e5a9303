//! Run orchestration for the nearest-neighbour sweep.
//!
//! Each run fans the test set out over rayon with one [`AlignmentEngine`] per
//! worker. Every query gets its own seed, drawn up front from a master stream,
//! so predictions do not depend on how instances are scheduled.

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use meander_dtw::{AlignmentEngine, DtwDistance, DtwError, LabeledSeries};

use crate::config::NearestNeighborConfig;
use crate::error::KnnError;
use crate::result::{ClassificationResult, PairRecord, Prediction, RunResult};

/// Prediction for one query plus the pair records it produced.
struct QueryOutcome {
    prediction: Prediction,
    pairs: Vec<PairRecord>,
}

/// Run every configured pass over `test`. Inputs are already validated.
#[instrument(
    skip_all,
    fields(solver = %config.solver, window = config.window.value(), runs = config.runs,
           n_train = train.len(), n_test = test.len())
)]
pub(crate) fn sweep(
    config: &NearestNeighborConfig,
    train: &[LabeledSeries],
    test: &[LabeledSeries],
) -> Result<ClassificationResult, KnnError> {
    let max_test = test.iter().map(LabeledSeries::len).max().unwrap_or(0);
    let max_train = train.iter().map(LabeledSeries::len).max().unwrap_or(0);
    let template = AlignmentEngine::with_seed(max_test, max_train, config.seed)?;

    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let started = Instant::now();
    let mut runs = Vec::with_capacity(config.runs);
    let mut pairs = Vec::new();

    for run in 0..config.runs {
        let seeds: Vec<u64> = (0..test.len()).map(|_| master_rng.r#gen()).collect();
        let (result, run_pairs) = run_once(config, train, test, run, &seeds, &template)?;
        info!(
            run,
            accuracy = result.accuracy(),
            elapsed_ms = result.elapsed_ms,
            "run complete"
        );
        runs.push(result);
        pairs.extend(run_pairs);
    }

    let total_elapsed_ms = started.elapsed().as_secs_f64() * 1e3;
    let result = ClassificationResult {
        solver: config.solver,
        window: config.window,
        n_train: train.len(),
        n_test: test.len(),
        runs,
        pairs,
        total_elapsed_ms,
    };
    info!(
        mean_accuracy = result.mean_accuracy(),
        total_elapsed_ms, "classification complete"
    );
    Ok(result)
}

/// One pass over the test set.
fn run_once(
    config: &NearestNeighborConfig,
    train: &[LabeledSeries],
    test: &[LabeledSeries],
    run: usize,
    seeds: &[u64],
    template: &AlignmentEngine,
) -> Result<(RunResult, Vec<PairRecord>), KnnError> {
    let started = Instant::now();

    let outcomes: Vec<QueryOutcome> = test
        .par_iter()
        .zip(seeds.par_iter())
        .enumerate()
        .map_init(
            || template.clone(),
            |engine, (index, (query, &seed))| {
                engine.reseed(seed);
                classify_query(engine, config, train, query, run, index)
            },
        )
        .collect::<Result<_, DtwError>>()?;

    let mut predictions = Vec::with_capacity(outcomes.len());
    let mut pairs = Vec::new();
    for outcome in outcomes {
        predictions.push(outcome.prediction);
        pairs.extend(outcome.pairs);
    }

    let result = RunResult {
        run,
        predictions,
        elapsed_ms: started.elapsed().as_secs_f64() * 1e3,
    };
    Ok((result, pairs))
}

/// Find the nearest reference for one query.
///
/// Each pair keeps the minimum distance over its trials; the query takes the
/// label of the first reference with the smallest such distance.
fn classify_query(
    engine: &mut AlignmentEngine,
    config: &NearestNeighborConfig,
    train: &[LabeledSeries],
    query: &LabeledSeries,
    run: usize,
    test_index: usize,
) -> Result<QueryOutcome, DtwError> {
    let trials = config.effective_trials();
    let mut pairs = Vec::new();
    let mut nearest = (0, DtwDistance::INFINITY);

    for (train_index, reference) in train.iter().enumerate() {
        let started = Instant::now();
        let mut best_distance = DtwDistance::INFINITY;
        let mut best_path_len = 0;
        for _ in 0..trials {
            let alignment = engine.align(
                query.as_view(),
                reference.as_view(),
                &config.metric,
                config.window,
                config.solver,
            )?;
            let distance = alignment.distance();
            if distance.improves_on(best_distance) {
                best_distance = distance;
                best_path_len = alignment.path_len();
            }
        }

        if config.record_pairs {
            pairs.push(PairRecord {
                run,
                test: test_index,
                train: train_index,
                elapsed_ms: started.elapsed().as_secs_f64() * 1e3,
                path_len: best_path_len,
                distance: best_distance.value(),
            });
        }

        if best_distance.improves_on(nearest.1) {
            nearest = (train_index, best_distance);
        }
    }

    let (nearest, distance) = (nearest.0, nearest.1.value());
    let prediction = Prediction {
        test: test_index,
        actual: query.label(),
        predicted: train[nearest].label(),
        nearest,
        distance,
    };
    debug!(
        run,
        test = test_index,
        nearest,
        distance,
        correct = prediction.is_correct(),
        "query classified"
    );
    Ok(QueryOutcome { prediction, pairs })
}
