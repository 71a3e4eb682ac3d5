use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

// One scenario with capacity [1, 1, 1, 1]: holding one flight one period is optimal.
const SPEC: &str = r#"
name: single
horizon:
  start: 2017-07-15T12:00:00Z
  end: 2017-07-15T13:00:00Z
  period_minutes: 15
scenarios:
  earliest_change: 0
  latest_change: 1
  low_rate: 4
  high_rate: 4
demand:
  inline:
    buckets:
      1: [2, 0, 0, 0]
costs:
  ground_cost: 1.0
  air_cost: 10.0
cases:
  - name: base
    formulations: [extended-base, per-flight]
"#;

fn write_spec(dir: &Path) -> PathBuf {
    let path = dir.join("single.yaml");
    fs::write(&path, SPEC).unwrap();
    path
}

#[test]
fn scenarios_low_to_high_prints_tree() {
    cargo_bin_cmd!("gdp")
        .args([
            "scenarios",
            "low-to-high",
            "--periods",
            "8",
            "--earliest",
            "2",
            "--latest",
            "6",
            "--low",
            "4",
            "--high",
            "8",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.250000"))
        .stdout(predicate::str::contains("nodes (lookahead 0, grouping window)"));
}

#[test]
fn scenarios_low_to_high_json() {
    let output = cargo_bin_cmd!("gdp")
        .args([
            "scenarios",
            "low-to-high",
            "--periods",
            "8",
            "--earliest",
            "2",
            "--latest",
            "6",
            "--low",
            "4",
            "--high",
            "8",
            "--lookahead",
            "1",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["scenarios"].as_array().unwrap().len(), 4);
    assert_eq!(value["nodes"].as_array().unwrap().len(), 8);
    assert_eq!(value["lookahead"], 1);
}

#[test]
fn scenarios_reject_empty_change_window() {
    cargo_bin_cmd!("gdp")
        .args([
            "scenarios",
            "low-to-high",
            "--periods",
            "8",
            "--earliest",
            "4",
            "--latest",
            "4",
            "--low",
            "4",
            "--high",
            "8",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("earliest change"));
}

#[test]
fn solve_prints_json_summary() {
    let dir = tempdir().unwrap();
    let spec = write_spec(dir.path());
    let output = cargo_bin_cmd!("gdp")
        .args([
            "solve",
            "--spec",
            spec.to_str().unwrap(),
            "--formulation",
            "extended-base",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["status"], "optimal");
    let objective = summary["objective"].as_f64().unwrap();
    assert!((objective - 1.0).abs() < 1e-6);
    assert_eq!(summary["backend"], "microlp");
}

#[test]
fn solve_rejects_unknown_case() {
    let dir = tempdir().unwrap();
    let spec = write_spec(dir.path());
    cargo_bin_cmd!("gdp")
        .args(["solve", "--spec", spec.to_str().unwrap(), "--case", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no case 'nope'"));
}

#[test]
fn solve_rejects_unknown_formulation() {
    let dir = tempdir().unwrap();
    let spec = write_spec(dir.path());
    cargo_bin_cmd!("gdp")
        .args([
            "solve",
            "--spec",
            spec.to_str().unwrap(),
            "--formulation",
            "hoffkin",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown formulation"));
}

#[test]
fn batch_writes_results_and_manifest() {
    let dir = tempdir().unwrap();
    let spec = write_spec(dir.path());
    let out = dir.path().join("out");
    cargo_bin_cmd!("gdp")
        .args([
            "batch",
            "--spec",
            spec.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--threads",
            "1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("batch 2 -> 2/0 ok/fail, 0 mismatched pairs"));

    let results = fs::read_to_string(out.join("results.csv")).unwrap();
    assert_eq!(results.lines().count(), 3);
    assert!(results.contains("base:per-flight"));
    assert!(out.join("batch_manifest.json").exists());
}
