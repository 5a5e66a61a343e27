//! Integration tests for the listing commands and their output formats.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

fn populated() -> (TestEnv, i64) {
    let env = TestEnv::new();
    let ws = env.add_resource("ws-01");
    let first = env.reserve("alice", ws, 1, 2);
    env.approve(first);
    env.reserve("bob", ws, 10, 10);
    (env, ws)
}

#[test]
fn test_table_is_default() {
    let (env, ws) = populated();
    env.as_user("alice")
        .args(["list", "--resource", &ws.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ID\tRESOURCE\tOWNER"))
        .stdout(predicate::str::contains("alice"))
        .stdout(predicate::str::contains("bob"));
}

#[test]
fn test_csv_has_header_row() {
    let (env, ws) = populated();
    let output = env
        .as_user("alice")
        .args(["list", "--resource", &ws.to_string(), "--format", "csv"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let mut lines = stdout.lines();
    assert!(lines.next().unwrap().starts_with("id,resource,owner,"));
    assert_eq!(lines.count(), 2);
}

#[test]
fn test_status_filter() {
    let (env, ws) = populated();
    let rows = env.list_json(&["--resource", &ws.to_string(), "--status", "pending"]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["owner"], "bob");

    env.as_user("alice")
        .args(["list", "--status", "sleeping"])
        .assert()
        .code(4);
}

#[test]
fn test_list_defaults_to_acting_user() {
    let (env, _) = populated();
    let output = env
        .as_user("bob")
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    let rows: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["owner"], "bob");
    assert!(rows[0]["decision_reason"].is_null());
}

#[test]
fn test_resource_listings() {
    let env = TestEnv::new();
    env.as_admin()
        .args(["resource", "add", "ws-01", "--location", "room 4"])
        .assert()
        .success();
    env.as_admin()
        .args(["resource", "add", "ws-02"])
        .assert()
        .success();
    env.as_admin()
        .args(["resource", "maintenance", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("maintenance"));

    env.as_user("alice")
        .args(["resource", "list", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("room 4"));

    env.as_user("alice")
        .args(["resource", "available", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("maintenance"));
}

#[test]
fn test_duplicate_label_is_invalid() {
    let env = TestEnv::new();
    env.add_resource("ws-01");
    env.as_admin()
        .args(["resource", "add", "ws-01"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_configured_output_format() {
    let (env, ws) = populated();
    fs::write(env.data_dir.join("config.yaml"), "output_format: json\n").unwrap();

    let output = env
        .as_user("alice")
        .args(["list", "--resource", &ws.to_string()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn test_releases_need_a_target() {
    let (env, _) = populated();
    env.as_user("alice").arg("releases").assert().failure();
}
