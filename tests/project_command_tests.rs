use assert_fs::prelude::*;
use predicates::prelude::*;

const SNAPSHOT: &str = r#"cohorts:
  version: 2
  bands:
    - { label: Early, lower: 16, upper: 34 }
    - { label: Middle, lower: 35, upper: 54 }
    - { label: Late, lower: 55, upper: 80 }
entities:
  - { id: E-1, age: 28, org_unit: Sales, annual_cost: 52000 }
  - { id: E-2, age: 44, org_unit: Sales, fte: 0.5, annual_cost: 30000 }
  - { id: E-3, age: 58, org_unit: Ops, annual_cost: 64000 }
  - { id: E-4, age: 66, org_unit: Ops, annual_cost: 71000 }
  - { id: V-1, org_unit: Ops, annual_cost: 50000, state: vacant }
"#;

const SCENARIO: &str = r#"name: baseline
parameters:
  horizon_years: 3
  default_attrition_rate: 0.1
  atz_enrollment_rate: 0.5
  atz_phase_length_years: 2
  trials: 25
"#;

#[test]
fn project_writes_yaml_report_and_summary() {
    let temp = assert_fs::TempDir::new().unwrap();
    let snapshot = temp.child("staff.yaml");
    snapshot.write_str(SNAPSHOT).unwrap();
    let scenario = temp.child("baseline.yaml");
    scenario.write_str(SCENARIO).unwrap();
    let output = temp.child("forecast.yaml");

    let mut cmd = assert_cmd::cargo_bin_cmd!("workforce");
    cmd.args([
        "project",
        "-i",
        snapshot.path().to_str().unwrap(),
        "-c",
        scenario.path().to_str().unwrap(),
        "-o",
        output.path().to_str().unwrap(),
        "-y",
        "2026",
        "--monte-carlo",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Workforce Projection"))
        .stdout(predicate::str::contains("Scenario: baseline"))
        .stdout(predicate::str::contains("Cohort bands: v2"))
        .stdout(predicate::str::contains("2026 | 4.00 | 3.50"))
        .stdout(predicate::str::contains("Monte Carlo headcount (25 trials, seed 42):"))
        .stdout(predicate::str::contains("Projection for scenario baseline written to"));

    let contents = std::fs::read_to_string(output.path()).unwrap();
    assert!(contents.contains("scenario: baseline"));
    assert!(contents.contains("data_source: staff.yaml"));
    assert!(contents.contains("series:"));
    assert!(contents.contains("by_cohort:"));
    assert!(contents.contains("Middle:"));
    assert!(contents.contains("waterfall:"));
    assert!(contents.contains("monte_carlo:"));
    assert!(contents.contains("open_positions:"));
}

#[test]
fn project_writes_json_when_requested() {
    let temp = assert_fs::TempDir::new().unwrap();
    let snapshot = temp.child("staff.yaml");
    snapshot.write_str(SNAPSHOT).unwrap();
    let output = temp.child("forecast.json");

    let mut cmd = assert_cmd::cargo_bin_cmd!("workforce");
    cmd.args([
        "project",
        "-i",
        snapshot.path().to_str().unwrap(),
        "-o",
        output.path().to_str().unwrap(),
        "-y",
        "2030",
        "--horizon",
        "2",
        "-f",
        "json",
    ]);
    cmd.assert().success();

    let contents = std::fs::read_to_string(output.path()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(report["scenario"], "baseline");
    assert_eq!(report["series"]["years"], serde_json::json!([0, 1, 2]));
    assert_eq!(report["series"]["calendar_years"][0], 2030);
    assert!(report.get("monte_carlo").is_none());
}

#[test]
fn project_fails_on_invalid_scenario() {
    let temp = assert_fs::TempDir::new().unwrap();
    let snapshot = temp.child("staff.yaml");
    snapshot.write_str(SNAPSHOT).unwrap();
    let scenario = temp.child("broken.yaml");
    scenario
        .write_str("parameters:\n  replacement_ratio: 1.5\n")
        .unwrap();
    let output = temp.child("forecast.yaml");

    let mut cmd = assert_cmd::cargo_bin_cmd!("workforce");
    cmd.args([
        "project",
        "-i",
        snapshot.path().to_str().unwrap(),
        "-c",
        scenario.path().to_str().unwrap(),
        "-o",
        output.path().to_str().unwrap(),
    ]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("replacement_ratio must be within [0, 1]"));
    output.assert(predicate::path::missing());
}

#[test]
fn project_fails_on_missing_snapshot() {
    let temp = assert_fs::TempDir::new().unwrap();
    let output = temp.child("forecast.yaml");

    let mut cmd = assert_cmd::cargo_bin_cmd!("workforce");
    cmd.args([
        "project",
        "-i",
        temp.path().join("missing.yaml").to_str().unwrap(),
        "-o",
        output.path().to_str().unwrap(),
    ]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to read snapshot yaml file"));
}

#[test]
fn project_keeps_scenario_start_year_without_flag() {
    let temp = assert_fs::TempDir::new().unwrap();
    let snapshot = temp.child("staff.yaml");
    snapshot.write_str(SNAPSHOT).unwrap();
    let scenario = temp.child("dated.yaml");
    scenario
        .write_str("name: dated\nparameters:\n  horizon_years: 2\n  start_year: 2040\n")
        .unwrap();
    let output = temp.child("forecast.json");

    let mut cmd = assert_cmd::cargo_bin_cmd!("workforce");
    cmd.args([
        "project",
        "-i",
        snapshot.path().to_str().unwrap(),
        "-c",
        scenario.path().to_str().unwrap(),
        "-o",
        output.path().to_str().unwrap(),
        "-f",
        "json",
    ]);
    cmd.assert().success();

    let contents = std::fs::read_to_string(output.path()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(report["series"]["calendar_years"], serde_json::json!([2040, 2041, 2042]));
}
