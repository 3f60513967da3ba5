//! End-to-end tests for the `morph` binary

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

fn morph() -> Command {
    Command::cargo_bin("morph").unwrap()
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout is JSON")
}

#[test]
fn test_normalize() {
    morph()
        .args(["normalize", "a.b"])
        .assert()
        .success()
        .stdout("$.a.b\n");

    morph()
        .args(["normalize", "[0].name"])
        .assert()
        .success()
        .stdout("$[0].name\n");
}

#[test]
fn test_query_prints_all_matches() {
    let temp = TempDir::new().unwrap();
    let source = write(temp.path(), "doc.json", &json!({"items": [{"v": 1}, {"v": 2}]}));

    let output = morph()
        .arg("query")
        .arg("--source")
        .arg(&source)
        .arg("items[*].v")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output.stdout), json!([1, 2]));
}

#[test]
fn test_eval_pass() {
    let temp = TempDir::new().unwrap();
    let origin = write(
        temp.path(),
        "origin.json",
        &json!({"people": [{"name": "ada"}, {"name": "grace"}]}),
    );
    let defaults = write(temp.path(), "defaults.json", &json!({"title": "untitled"}));
    let nodes = write(
        temp.path(),
        "nodes.json",
        &json!([
            {"path": "people[*].name", "operators": {"query": "+", "symbol": "#names"}},
            {"path": "title", "operators": {"constraints": "?"}},
            {"path": "names", "operators": {"constraints": "!=tags"}, "pipes": {"$1": "join:-", "$2": "upper"}},
            {"path": "people[0]", "operators": {"symbol": "#"}}
        ]),
    );

    let output = morph()
        .arg("eval")
        .arg("--nodes")
        .arg(&nodes)
        .arg("--source")
        .arg(format!("origin={}", origin.display()))
        .arg("--source")
        .arg(format!("default={}", defaults.display()))
        .args(["--context", "out"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let result = stdout_json(&output.stdout);
    assert_eq!(
        result["values"],
        json!([["ada", "grace"], "untitled", "ADA-GRACE", {"name": "ada"}])
    );
    assert_eq!(result["tags"]["$.names"], json!(["ada", "grace"]));
    assert_eq!(result["tags"]["$.out[3]"], json!({"name": "ada"}));
}

#[test]
fn test_eval_with_config() {
    let temp = TempDir::new().unwrap();
    let root = write(temp.path(), "root.json", &json!({"n": 7}));
    let nodes = write(temp.path(), "nodes.json", &json!({"path": "n"}));
    let config = temp.path().join("morph.toml");
    fs::write(&config, "origin_source = \"root\"\n").unwrap();

    let output = morph()
        .arg("eval")
        .arg("--nodes")
        .arg(&nodes)
        .arg("--source")
        .arg(format!("root={}", root.display()))
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output.stdout)["values"], json!([7]));
}

#[test]
fn test_eval_reports_fatal_errors() {
    let temp = TempDir::new().unwrap();
    let origin = write(temp.path(), "origin.json", &json!({"a": 1}));
    let nodes = write(
        temp.path(),
        "nodes.json",
        &json!([{"path": "a", "pipes": {"$1": "frobnicate"}}]),
    );

    morph()
        .arg("eval")
        .arg("--nodes")
        .arg(&nodes)
        .arg("--source")
        .arg(format!("origin={}", origin.display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not resolve function name [frobnicate]"));
}

#[test]
fn test_eval_rejects_unknown_operator() {
    let temp = TempDir::new().unwrap();
    let nodes = write(
        temp.path(),
        "nodes.json",
        &json!([{"path": "a", "operators": {"enumerate": "***"}}]),
    );

    morph()
        .arg("eval")
        .arg("--nodes")
        .arg(&nodes)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid node at index 0"));
}

#[test]
fn test_bad_source_argument() {
    morph()
        .args(["eval", "--nodes", "nodes.json", "--source", "no-equals-sign"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected name=file"));
}
