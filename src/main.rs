use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use meander_dtw::{
    AlignmentEngine, PointMetric, Sampling, Solver, TimeSeries, WindowPercent, compute_band_width,
};
use meander_io::{ExperimentName, ResultWriter, UcrReader};
use meander_knn::NearestNeighborConfig;

#[derive(Parser)]
#[command(name = "meander")]
#[command(about = "Banded DTW alignment and 1-NN time-series classification")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Shared alignment parameters.
#[derive(Args, Debug, Clone)]
struct AlignmentArgs {
    /// Sakoe-Chiba window as a percentage of the first series' length (100 = unrestricted)
    #[arg(long, default_value = "100", value_parser = parse_window)]
    window: WindowPercent,

    /// Path-construction strategy: "exact", "greedy", or "stochastic"
    #[arg(long, default_value = "exact")]
    solver: Solver,

    /// Selection-draw distribution for the stochastic solver: "uniform" or "gaussian"
    #[arg(long)]
    sampling: Option<Sampling>,

    /// Element distance: "absolute" or "squared"
    #[arg(long, default_value = "absolute")]
    metric: PointMetric,
}

impl AlignmentArgs {
    /// Return the solver with any `--sampling` override applied.
    fn resolved_solver(&self) -> Solver {
        match (self.solver, self.sampling) {
            (Solver::Stochastic(_), Some(sampling)) => Solver::Stochastic(sampling),
            (solver, Some(sampling)) => {
                warn!(%solver, %sampling, "--sampling only applies to the stochastic solver");
                solver
            }
            (solver, None) => solver,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Classify a test split by its nearest neighbour in a training split
    Classify {
        /// Path to the training split (UCR text format)
        #[arg(long)]
        train: PathBuf,

        /// Path to the test split (UCR text format)
        #[arg(long)]
        test: PathBuf,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Number of times the whole sweep is repeated
        #[arg(long, default_value_t = 10)]
        runs: usize,

        /// Alignments per (test, train) pair for randomized solvers
        #[arg(long, default_value_t = 10)]
        trials: usize,

        /// Skip the per-pair timing file
        #[arg(long, default_value_t = false)]
        no_pairs: bool,

        #[command(flatten)]
        alignment: AlignmentArgs,
    },

    /// Align two inline sequences and print the warping path
    Align {
        /// First sequence, e.g. "1,2,3"
        #[arg(long, allow_hyphen_values = true)]
        a: String,

        /// Second sequence, e.g. "1,2,2,3"
        #[arg(long, allow_hyphen_values = true)]
        b: String,

        #[command(flatten)]
        alignment: AlignmentArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct ClassifyOutput {
    experiment: String,
    solver: String,
    window: u32,
    n_train: usize,
    n_test: usize,
    runs: usize,
    accuracies: Vec<f64>,
    mean_accuracy: f64,
    total_elapsed_ms: f64,
    files: Vec<PathBuf>,
}

#[derive(Serialize)]
struct AlignOutput {
    solver: String,
    metric: String,
    window: u32,
    band_width: Option<usize>,
    distance: f64,
    path_len: usize,
    path: Vec<[usize; 2]>,
}

fn parse_window(s: &str) -> Result<WindowPercent, String> {
    let value: u32 = s
        .parse()
        .map_err(|_| format!("window must be an integer in [0, 100], got {s}"))?;
    WindowPercent::new(value).map_err(|e| e.to_string())
}

fn parse_sequence(name: &str, raw: &str) -> Result<TimeSeries> {
    let values = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|f| !f.is_empty())
        .map(|f| {
            f.parse::<f64>()
                .with_context(|| format!("invalid value \"{f}\" in --{name}"))
        })
        .collect::<Result<Vec<_>>>()?;
    TimeSeries::new(values).with_context(|| format!("invalid sequence in --{name}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Classify {
            train,
            test,
            experiment,
            output_dir,
            runs,
            trials,
            no_pairs,
            alignment,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            let train_set = UcrReader::new(&train)
                .read()
                .with_context(|| format!("failed to read training split {}", train.display()))?;
            let test_set = UcrReader::new(&test)
                .read()
                .with_context(|| format!("failed to read test split {}", test.display()))?;

            let config = NearestNeighborConfig::new(alignment.resolved_solver())
                .with_window(alignment.window)
                .with_metric(alignment.metric)
                .with_runs(runs)
                .with_trials_per_pair(trials)
                .with_seed(cli.seed)
                .with_record_pairs(!no_pairs);

            let result = config
                .classify(train_set.series(), test_set.series())
                .context("classification failed")?;

            // Write result artifacts
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            let mut files = Vec::with_capacity(3);
            if !no_pairs {
                files.push(writer.write_pairs(&result)?);
            }
            files.push(writer.write_accuracy(&result)?);
            files.push(writer.write_summary(&config, &result)?);

            // Build and print stdout summary
            let output = ClassifyOutput {
                experiment,
                solver: result.solver.to_string(),
                window: result.window.value(),
                n_train: result.n_train,
                n_test: result.n_test,
                runs: result.runs.len(),
                accuracies: result.accuracies(),
                mean_accuracy: result.mean_accuracy(),
                total_elapsed_ms: result.total_elapsed_ms,
                files,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Align { a, b, alignment } => {
            let a = parse_sequence("a", &a)?;
            let b = parse_sequence("b", &b)?;
            let solver = alignment.resolved_solver();

            let mut engine = AlignmentEngine::with_seed(a.len(), b.len(), cli.seed)?;
            let result = engine
                .align(a.as_view(), b.as_view(), &alignment.metric, alignment.window, solver)
                .context("alignment failed")?;

            let band_width = (!alignment.window.is_unrestricted())
                .then(|| compute_band_width(alignment.window, a.len(), b.len()));

            let (distance, path) = result.into_parts();
            let output = AlignOutput {
                solver: solver.to_string(),
                metric: alignment.metric.to_string(),
                window: alignment.window.value(),
                band_width,
                distance: distance.value(),
                path_len: path.len(),
                path: path.steps().iter().map(|s| [s.a, s.b]).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
