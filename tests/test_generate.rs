//! End-to-end tests for `calcforge generate`

use std::fs;

mod support;
use support::harness::{stderr, stdout, TestHarness};

const MORTGAGE: &str = r#"
title: Mortgage Calc
description: Monthly payment of a fixed-rate loan.
inputs:
  - name: Loan Amount
    type: number
    min: 0
    unit: USD
  - name: Term
    type: select
    options:
      - {label: 15 years, value: 15}
      - {label: 30 years, value: 30}
outputs:
  - name: payment
    label: Monthly payment
    precision: 2
steps:
  - Enter the loan amount.
"#;

#[test]
fn test_mortgage_scenario() {
    let harness = TestHarness::new();
    harness.write_spec("mortgage.yaml", MORTGAGE);

    let output = harness.run(&["generate"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    assert!(text.contains("generated: 1"), "stdout: {}", text);
    assert!(text.contains("failed: 0"));

    let component = fs::read_to_string(harness.out_dir.join("mortgage-calc.jsx")).unwrap();
    assert!(component.contains("const [Loan_Amount, setLoan_Amount] = useState(0);"));
    assert!(component.contains("import { compute } from \"../formulas/mortgage-calc\";"));

    let manifest = fs::read_to_string(harness.out_dir.join("generation-manifest.json")).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&manifest).unwrap();
    assert_eq!(manifest["generated"], 1);
    assert_eq!(manifest["failed"], 0);
}

#[test]
fn test_rerun_rewrites_nothing() {
    let harness = TestHarness::new();
    harness.write_spec("mortgage.yaml", MORTGAGE);

    assert!(harness.run(&["generate"]).status.success());
    let first = fs::read(harness.out_dir.join("mortgage-calc.jsx")).unwrap();

    let output = harness.run(&["generate"]);
    assert!(stdout(&output).contains("unchanged: 1"));
    assert_eq!(fs::read(harness.out_dir.join("mortgage-calc.jsx")).unwrap(), first);
}

#[test]
fn test_invalid_spec_is_reported_not_fatal() {
    let harness = TestHarness::new();
    harness.write_spec("mortgage.yaml", MORTGAGE);
    harness.write_spec("broken.json", r#"{"title": "", "inputs": []}"#);

    let output = harness.run(&["generate"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("generated: 1"));
    assert!(text.contains("failed: 1"));
    assert!(text.contains("broken.json failed"));
    assert!(text.contains("title: title is required"));
}

#[test]
fn test_json_events() {
    let harness = TestHarness::new();
    harness.write_spec("mortgage.yaml", MORTGAGE);

    let output = harness.run(&["generate", "--json"]);
    assert!(output.status.success());

    let events: Vec<serde_json::Value> = stdout(&output)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let generated = events
        .iter()
        .find(|e| e["level"] == "counter" && e["msg"] == "generated")
        .unwrap();
    assert_eq!(generated["count"], 1);
}

#[test]
fn test_flags_override_config() {
    let harness = TestHarness::new();
    harness.write_config("generation:\n  specs_dir: nowhere\n");
    fs::create_dir_all(harness.path().join("specs")).unwrap();
    fs::write(harness.path().join("specs/mortgage.yml"), MORTGAGE).unwrap();

    let output = harness.run(&[
        "generate",
        "--specs-dir",
        "specs",
        "--out-dir",
        "build",
        "--jobs",
        "1",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(harness.path().join("build/mortgage-calc.jsx").exists());
}

#[test]
fn test_dry_run() {
    let harness = TestHarness::new();
    harness.write_spec("mortgage.yaml", MORTGAGE);

    let output = harness.run(&["generate", "--dry-run"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("generated: 1"));
    assert!(!harness.out_dir.exists());
}

#[test]
fn test_missing_specs_dir_fails() {
    let harness = TestHarness::new();

    let output = harness.run(&["generate", "--specs-dir", "missing"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("does not exist"));
}

#[test]
fn test_invalid_config_fails() {
    let harness = TestHarness::new();
    harness.write_config("generation:\n  jobs: 0\n");

    let output = harness.run(&["generate"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("generation.jobs"));
}
