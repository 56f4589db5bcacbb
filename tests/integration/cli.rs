//! The `anchorage` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use anchorage::test_utils::write_tree;

use super::fixture;

fn anchorage() -> Command {
    Command::cargo_bin("anchorage").unwrap()
}

#[test]
fn test_check_pipeline_fixture() {
    anchorage()
        .arg("check")
        .arg(fixture("pipeline/main.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("6 anchor(s)"))
        .stdout(predicate::str::contains("3 dependency edge(s), no cycles"));
}

#[test]
fn test_check_without_includes() {
    anchorage()
        .args(["check", "--no-includes"])
        .arg(fixture("pipeline/main.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("4 anchor(s)"));
}

#[test]
fn test_check_reports_cycle() {
    anchorage()
        .arg("check")
        .arg(fixture("self_dependency.yml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cycle detected at node: release"));
}

#[test]
fn test_check_missing_input() {
    let temp = TempDir::new().unwrap();
    anchorage()
        .current_dir(temp.path())
        .args(["check", "nope.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found: nope.yml"))
        .stderr(predicate::str::contains("Configuration error").not());
}

#[test]
fn test_check_rejects_parent_traversal() {
    let temp = TempDir::new().unwrap();
    write_tree(temp.path(), &[("ci/main.yml", "x: !include ../outside.yml\n"), ("outside.yml", "y: 1\n")])
        .unwrap();

    anchorage()
        .current_dir(temp.path())
        .args(["check", "ci/main.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parent traversal forbidden"));
}

#[test]
fn test_policy_flag_allows_diamond_includes() {
    let temp = TempDir::new().unwrap();
    write_tree(
        temp.path(),
        &[
            ("main.yml", "left: !include a.yml\nright: !include b.yml\n"),
            ("a.yml", "common: !include c.yml\n"),
            ("b.yml", "common: !include c.yml\n"),
            ("c.yml", "shared: true\n"),
        ],
    )
    .unwrap();

    anchorage()
        .current_dir(temp.path())
        .args(["check", "main.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Recursive inclusion detected"));

    anchorage()
        .current_dir(temp.path())
        .args(["check", "main.yml", "--policy", "active-chain"])
        .assert()
        .success();
}

#[test]
fn test_settings_file_in_working_directory() {
    let temp = TempDir::new().unwrap();
    write_tree(
        temp.path(),
        &[
            ("anchorage.toml", "dependency-field = \"needs\"\n"),
            ("main.yml", "a: &a {}\nb: &b {needs: [*a]}\nc: &c {needs: [*b, *a]}\n"),
        ],
    )
    .unwrap();

    anchorage()
        .current_dir(temp.path())
        .args(["check", "main.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 anchor(s), 3 dependency edge(s)"));
}

#[test]
fn test_graph_text() {
    anchorage()
        .arg("graph")
        .arg(fixture("pipeline/main.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("job1    <- build\n"))
        .stdout(predicate::str::contains("deploy  <- job1, build\n"));
}

#[test]
fn test_graph_tree() {
    anchorage()
        .args(["graph", "--tree", "deploy"])
        .arg(fixture("pipeline/main.yml"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("deploy\n"))
        .stdout(predicate::str::contains("├── job1"))
        .stdout(predicate::str::contains("└── build"));
}

#[test]
fn test_graph_tree_unknown_root() {
    anchorage()
        .args(["graph", "--tree", "ghost"])
        .arg(fixture("pipeline/main.yml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No anchor named 'ghost'"));
}

#[test]
fn test_graph_json() {
    let output = anchorage()
        .args(["graph", "--format", "json"])
        .arg(fixture("pipeline/main.yml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["field"], "depends_on");

    let order: Vec<&str> = report["order"].as_array().unwrap().iter().map(|v| v.as_str().unwrap()).collect();
    assert_eq!(order.len(), 6);
    let pos = |id: &str| order.iter().position(|n| *n == id).unwrap();
    assert!(pos("build") < pos("job1"));
    assert!(pos("job1") < pos("deploy"));

    let deploy = report["nodes"].as_array().unwrap().iter().find(|n| n["id"] == "deploy").unwrap();
    assert_eq!(deploy["dependencies"], serde_json::json!(["job1", "build"]));
}

#[test]
fn test_graph_invalid_format() {
    anchorage()
        .args(["graph", "--format", "dot"])
        .arg(fixture("pipeline/main.yml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format"));
}

#[test]
fn test_render_expands_includes() {
    anchorage()
        .arg("render")
        .arg(fixture("pipeline/main.yml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("retries: 3"))
        .stdout(predicate::str::contains("cargo clippy"));
}
