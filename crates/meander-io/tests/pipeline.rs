//! End-to-end integration tests: UCR text -> classify -> CSV/JSON -> read back.

use std::fs;
use std::path::{Path, PathBuf};

use meander_dtw::{PointMetric, Sampling, Solver, WindowPercent};
use meander_io::{ExperimentName, IoError, ResultWriter, UcrReader};
use meander_knn::NearestNeighborConfig;
use tempfile::TempDir;

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn exact_round_trip() {
    // 1. Read both splits
    let train = UcrReader::new(&fixture_path("two_class_TRAIN.txt"))
        .read()
        .expect("train fixture should parse");
    let test = UcrReader::new(&fixture_path("two_class_TEST.txt"))
        .read()
        .expect("test fixture should parse");
    assert_eq!(train.len(), 6);
    assert_eq!(test.len(), 4);
    assert_eq!(train.class_labels(), vec![1, 2]);
    assert_eq!(test.max_len(), 26);

    // 2. Classify; the two classes are far apart
    let config = NearestNeighborConfig::new(Solver::Exact)
        .with_window(WindowPercent::new(20).unwrap())
        .with_runs(2)
        .with_record_pairs(true);
    let result = config.classify(train.series(), test.series()).unwrap();
    assert_eq!(result.mean_accuracy(), 1.0);

    // 3. Write every artifact
    let dir = TempDir::new().unwrap();
    let experiment = ExperimentName::new("two_class_rt".into()).unwrap();
    let writer = ResultWriter::new(dir.path(), experiment).unwrap();
    let pairs_path = writer.write_pairs(&result).unwrap();
    let accuracy_path = writer.write_accuracy(&result).unwrap();
    let summary_path = writer.write_summary(&config, &result).unwrap();

    // 4. Read back and verify
    let mut pairs = csv::Reader::from_path(&pairs_path).unwrap();
    let pair_rows: Vec<csv::StringRecord> = pairs.records().map(Result::unwrap).collect();
    assert_eq!(pair_rows.len(), 2 * 4 * 6);
    for row in &pair_rows {
        assert_eq!(&row[1], "20");
        let path_len: usize = row[5].parse().unwrap();
        let distance: f64 = row[6].parse().unwrap();
        assert!(path_len >= 22, "path shorter than the longer series");
        assert!(distance.is_finite() && distance >= 0.0);
    }

    let mut accuracy = csv::Reader::from_path(&accuracy_path).unwrap();
    for row in accuracy.records() {
        let row = row.unwrap();
        assert_eq!(&row[3], &row[4], "prediction should match actual label");
    }

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(summary["experiment"], "two_class_rt");
    assert_eq!(summary["solver"], "exact");
    assert_eq!(summary["n_train"], 6);
    assert_eq!(summary["n_test"], 4);
    assert_eq!(summary["mean_accuracy"].as_f64().unwrap(), 1.0);
}

#[test]
fn comma_and_space_formats_agree() {
    let spaced = UcrReader::new(&fixture_path("two_class_TEST.txt")).read().unwrap();
    let commas = UcrReader::new(&fixture_path("two_class_TEST.csv")).read().unwrap();
    assert_eq!(spaced.len(), commas.len());
    for (a, b) in spaced.series().iter().zip(commas.series()) {
        assert_eq!(a.label(), b.label());
        assert_eq!(a.len(), b.len());
        for (x, y) in a.series().as_ref().iter().zip(b.series().as_ref()) {
            assert!((x - y).abs() < 1e-4);
        }
    }
}

#[test]
fn stochastic_round_trip_is_reproducible() {
    let train = UcrReader::new(&fixture_path("two_class_TRAIN.txt")).read().unwrap();
    let test = UcrReader::new(&fixture_path("two_class_TEST.txt")).read().unwrap();
    let config = NearestNeighborConfig::new(Solver::Stochastic(Sampling::Gaussian))
        .with_window(WindowPercent::new(10).unwrap())
        .with_metric(PointMetric::Squared)
        .with_runs(1)
        .with_trials_per_pair(3)
        .with_seed(7);

    let dir = TempDir::new().unwrap();
    let mut contents = Vec::new();
    for name in ["first", "second"] {
        let result = config.classify(train.series(), test.series()).unwrap();
        let writer = ResultWriter::new(dir.path(), ExperimentName::new(name.into()).unwrap()).unwrap();
        let path = writer.write_accuracy(&result).unwrap();
        contents.push(fs::read_to_string(path).unwrap());
    }
    assert_eq!(contents[0], contents[1]);
}

#[test]
fn reader_fixture_files_match_expected_errors() {
    let result = UcrReader::new(&fixture_path("blank_only.txt")).read();
    assert!(
        matches!(result, Err(IoError::EmptyDataset { .. })),
        "blank_only.txt should give EmptyDataset, got: {result:?}"
    );

    let result = UcrReader::new(&fixture_path("fractional_label.txt")).read();
    assert!(
        matches!(result, Err(IoError::InvalidLabel { line: 2, .. })),
        "fractional_label.txt should give InvalidLabel, got: {result:?}"
    );

    let result = UcrReader::new(&fixture_path("nan.txt")).read();
    assert!(
        matches!(result, Err(IoError::NonFiniteValue { .. })),
        "nan.txt should give NonFiniteValue, got: {result:?}"
    );

    let result = UcrReader::new(&fixture_path("label_only.txt")).read();
    assert!(
        matches!(result, Err(IoError::EmptySeries { line: 2, .. })),
        "label_only.txt should give EmptySeries, got: {result:?}"
    );

    let result = UcrReader::new(&fixture_path("missing.txt")).read();
    assert!(matches!(result, Err(IoError::FileNotFound { .. })));
}
