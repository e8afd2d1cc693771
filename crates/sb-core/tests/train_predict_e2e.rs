//! End-to-end pipeline tests: CSV in, artifact out, predictions out.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn semibayes() -> Command {
    Command::cargo_bin("semibayes").expect("semibayes binary should exist")
}

fn write(path: &Path, contents: &str) {
    std::fs::write(path, contents).unwrap();
}

/// The four fully labeled instances: class 0 = [T,F],[T,T]; class 1 = [F,F],[F,T].
const FULLY_LABELED: &str = "f0,f1,label\n1,0,0\n1,1,0\n0,0,1\n0,1,1\n";

/// Same table with the second row's label blanked.
const PARTIALLY_LABELED: &str = "f0,f1,label\n1,0,0\n1,1,\n0,0,1\n0,1,1\n";

#[test]
fn train_writes_closed_form_posteriors() {
    let dir = tempfile::tempdir().unwrap();
    let train_csv = dir.path().join("train.csv");
    let model = dir.path().join("model.json");
    write(&train_csv, FULLY_LABELED);

    semibayes()
        .args(["train", "--train"])
        .arg(&train_csv)
        .arg("--out-model")
        .arg(&model)
        .assert()
        .success()
        .stdout(predicate::str::contains("Model saved to"));

    let artifact: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&model).unwrap()).unwrap();
    assert_eq!(artifact["schema_version"], 1);
    assert_eq!(artifact["num_classes"], 2);
    assert_eq!(artifact["num_features"], 2);
    assert_eq!(artifact["converged"], true);

    // Labeled data reduces to exact-count conjugate updates:
    // feature 0 under class 0 is Beta(3,1).
    let cell = &artifact["feature_prob"][0][0];
    assert_eq!(cell["alpha"], 3.0);
    assert_eq!(cell["beta"], 1.0);
    assert!((cell["mean"].as_f64().unwrap() - 0.75).abs() < 1e-12);

    let class_prob = artifact["class_prob"].as_array().unwrap();
    assert!((class_prob[0].as_f64().unwrap() - 0.5).abs() < 1e-12);
}

#[test]
fn predict_scores_only_unlabeled_rows() {
    let dir = tempfile::tempdir().unwrap();
    let train_csv = dir.path().join("train.csv");
    let input_csv = dir.path().join("input.csv");
    let model = dir.path().join("model.json");
    let out = dir.path().join("predictions.csv");
    write(&train_csv, FULLY_LABELED);
    // Rows 0-1 are labeled (skipped); row 2 is scored.
    write(&input_csv, "f0,f1,label\n1,0,0\n0,1,1\n1,0,\n");

    semibayes()
        .args(["train", "--train"])
        .arg(&train_csv)
        .arg("--out-model")
        .arg(&model)
        .assert()
        .success();

    semibayes()
        .args(["predict", "--model"])
        .arg(&model)
        .arg("--input")
        .arg(&input_csv)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 3 rows scored"));

    // P(c0 | [T,F]) = 0.5·0.75·0.5 / (0.5·0.75·0.5 + 0.5·0.25·0.5) = 0.75
    let predictions = std::fs::read_to_string(&out).unwrap();
    let mut lines = predictions.lines();
    assert_eq!(lines.next(), Some("instance,p0,p1,predicted"));
    assert_eq!(lines.next(), Some("2,0.750000,0.250000,0"));
    assert_eq!(lines.next(), None);
}

#[test]
fn semi_supervised_soft_labels_favor_the_matching_class() {
    let dir = tempfile::tempdir().unwrap();
    let train_csv = dir.path().join("train.csv");
    let model = dir.path().join("model.json");
    let soft = dir.path().join("soft.csv");
    write(&train_csv, PARTIALLY_LABELED);

    semibayes()
        .args(["train", "--tolerance", "1e-6", "--max-cycles", "100", "--train"])
        .arg(&train_csv)
        .arg("--out-model")
        .arg(&model)
        .arg("--predict-unlabeled")
        .arg(&soft)
        .assert()
        .success()
        .stdout(predicate::str::contains("Soft posteriors"));

    // The blanked [T,T] row resembles the class-0 labeled instance.
    let soft_rows = std::fs::read_to_string(&soft).unwrap();
    let row = soft_rows
        .lines()
        .nth(1)
        .expect("one unlabeled row expected");
    let fields: Vec<&str> = row.split(',').collect();
    assert_eq!(fields[0], "1");
    let p0: f64 = fields[1].parse().unwrap();
    assert!(p0 > 0.5, "expected class 0 favored, got p0={p0}");
    assert_eq!(fields[3], "0");

    // The artifact carries the same soft posteriors.
    let artifact: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&model).unwrap()).unwrap();
    let posteriors = artifact["label_posteriors"].as_array().unwrap();
    assert_eq!(posteriors.len(), 1);
    assert_eq!(posteriors[0]["instance"], 1);
}

#[test]
fn dimension_mismatch_fails_without_writing_output() {
    let dir = tempfile::tempdir().unwrap();
    let train_csv = dir.path().join("train.csv");
    let wide_csv = dir.path().join("wide.csv");
    let model = dir.path().join("model.json");
    let out = dir.path().join("predictions.csv");
    write(&train_csv, FULLY_LABELED);
    // Three feature columns against a two-feature model.
    write(&wide_csv, "f0,f1,f2,label\n1,0,1,\n");

    semibayes()
        .args(["train", "--train"])
        .arg(&train_csv)
        .arg("--out-model")
        .arg(&model)
        .assert()
        .success();

    semibayes()
        .args(["predict", "--model"])
        .arg(&model)
        .arg("--input")
        .arg(&wide_csv)
        .arg("--output")
        .arg(&out)
        .assert()
        .code(13)
        .stderr(predicate::str::contains("Dimension Mismatch"));

    assert!(!out.exists(), "no partial output on dimension mismatch");
}

#[test]
fn cycle_cap_is_reported_via_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let train_csv = dir.path().join("train.csv");
    let model = dir.path().join("model.json");
    write(&train_csv, PARTIALLY_LABELED);

    semibayes()
        .args(["train", "--tolerance", "1e-300", "--max-cycles", "2", "--train"])
        .arg(&train_csv)
        .arg("--out-model")
        .arg(&model)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("cycle cap reached"));

    // The artifact is still written and loadable.
    semibayes()
        .args(["check", "--model"])
        .arg(&model)
        .assert()
        .success()
        .stdout(predicate::str::contains("cycle cap reached after 2 cycles"));
}

#[test]
fn check_validates_a_fresh_artifact_and_priors() {
    let dir = tempfile::tempdir().unwrap();
    let train_csv = dir.path().join("train.csv");
    let model = dir.path().join("model.json");
    let priors = dir.path().join("priors.json");
    write(&train_csv, FULLY_LABELED);
    write(
        &priors,
        r#"{ "feature_alpha": 2.0, "feature_beta": 2.0, "class_alpha": 1.0 }"#,
    );

    semibayes()
        .args(["train", "--priors"])
        .arg(&priors)
        .arg("--train")
        .arg(&train_csv)
        .arg("--out-model")
        .arg(&model)
        .assert()
        .success();

    semibayes()
        .args(["check", "--priors"])
        .arg(&priors)
        .arg("--model")
        .arg(&model)
        .assert()
        .success()
        .stdout(predicate::str::contains("priors: ok"))
        .stdout(predicate::str::contains("2 classes × 2 features"))
        .stdout(predicate::str::contains("0 repaired cells"));
}

#[test]
fn json_format_emits_structured_payloads() {
    let dir = tempfile::tempdir().unwrap();
    let train_csv = dir.path().join("train.csv");
    let input_csv = dir.path().join("input.csv");
    let model = dir.path().join("model.json");
    let out = dir.path().join("predictions.json");
    write(&train_csv, FULLY_LABELED);
    write(&input_csv, "f0,f1,label\n1,1,\n");

    semibayes()
        .args(["--format", "json", "train", "--train"])
        .arg(&train_csv)
        .arg("--out-model")
        .arg(&model)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"converged\": true"));

    semibayes()
        .args(["--format", "json", "predict", "--model"])
        .arg(&model)
        .arg("--input")
        .arg(&input_csv)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let records: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["instance"], 0);
    let probs = records[0]["probs"].as_array().unwrap();
    let sum: f64 = probs.iter().map(|p| p.as_f64().unwrap()).sum();
    assert!((sum - 1.0).abs() < 1e-9);
}
