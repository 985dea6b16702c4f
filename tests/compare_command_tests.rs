use assert_fs::prelude::*;
use predicates::prelude::*;

fn snapshot_yaml(count: usize) -> String {
    let mut yaml = String::from("entities:\n");
    for idx in 0..count {
        let age = 25 + (idx % 30);
        yaml.push_str(&format!(
            "  - {{ id: E-{idx}, age: {age}, org_unit: Unit-{}, annual_cost: 50000 }}\n",
            idx % 2
        ));
    }
    yaml
}

#[test]
fn compare_writes_deltas_and_waterfalls() {
    let temp = assert_fs::TempDir::new().unwrap();
    let snapshot = temp.child("staff.yaml");
    snapshot.write_str(&snapshot_yaml(100)).unwrap();
    let a = temp.child("a.yaml");
    a.write_str("name: steady\nparameters:\n  default_attrition_rate: 0.05\n")
        .unwrap();
    let b = temp.child("b.yaml");
    b.write_str("name: churn\nparameters:\n  default_attrition_rate: 0.15\n")
        .unwrap();
    let output = temp.child("comparison.yaml");

    let mut cmd = assert_cmd::cargo_bin_cmd!("workforce");
    cmd.args([
        "compare",
        "-i",
        snapshot.path().to_str().unwrap(),
        "-a",
        a.path().to_str().unwrap(),
        "-b",
        b.path().to_str().unwrap(),
        "-o",
        output.path().to_str().unwrap(),
        "-y",
        "2026",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Scenario Comparison"))
        .stdout(predicate::str::contains("A: steady"))
        .stdout(predicate::str::contains("B: churn"))
        .stdout(predicate::str::contains("2026 | 100.00 | 100.00 | +0.00"))
        .stdout(predicate::str::contains("Comparison of steady and churn written to"));

    let contents = std::fs::read_to_string(output.path()).unwrap();
    assert!(contents.contains("deltas:"));
    assert!(contents.contains("waterfall:"));
    assert!(contents.contains("scenario: steady"));
    assert!(contents.contains("scenario: churn"));
}

#[test]
fn compare_fails_when_scenario_is_missing() {
    let temp = assert_fs::TempDir::new().unwrap();
    let snapshot = temp.child("staff.yaml");
    snapshot.write_str(&snapshot_yaml(3)).unwrap();
    let a = temp.child("a.yaml");
    a.write_str("name: steady\n").unwrap();
    let output = temp.child("comparison.yaml");

    let mut cmd = assert_cmd::cargo_bin_cmd!("workforce");
    cmd.args([
        "compare",
        "-i",
        snapshot.path().to_str().unwrap(),
        "-a",
        a.path().to_str().unwrap(),
        "-b",
        temp.path().join("missing.yaml").to_str().unwrap(),
        "-o",
        output.path().to_str().unwrap(),
    ]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to read scenario yaml file"));
}
