//! Integration tests for global flags and the non-ledger commands.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_show_data_dir_uses_flag() {
    let env = TestEnv::new();
    env.command()
        .arg("show-data-dir")
        .assert()
        .success()
        .stdout(predicate::str::contains("labres-data"));
}

#[test]
fn test_show_data_dir_uses_env() {
    let env = TestEnv::new();
    let dir = env.path().join("from-env");
    env.command_bare()
        .env("LABRES_DATA_DIR", &dir)
        .arg("show-data-dir")
        .assert()
        .success()
        .stdout(predicate::str::contains("from-env"));
}

#[test]
fn test_acting_commands_need_a_user() {
    let env = TestEnv::new();
    env.command()
        .args(["resource", "add", "ws-01"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("--as"));
}

#[test]
fn test_user_from_env() {
    let env = TestEnv::new();
    env.command()
        .env("LABRES_USER", "carol")
        .env("LABRES_ROLE", "admin")
        .args(["resource", "add", "ws-01"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_dry_run_leaves_state_unchanged() {
    let env = TestEnv::new();
    let ws = env.add_resource("ws-01");

    env.as_user("alice")
        .arg("--dry-run")
        .arg("reserve")
        .args(["--resource", &ws.to_string(), "--from", &common::june(1)])
        .args(["--start", "09:00", "--end", "12:00", "--reason", "x"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Dry run"));

    assert!(env.list_json(&["--resource", &ws.to_string()]).is_empty());
}

#[test]
fn test_dry_run_still_reports_errors() {
    let env = TestEnv::new();
    env.as_user("alice")
        .args(["--dry-run", "approve", "1"])
        .assert()
        .code(8);
}

#[test]
fn test_validate_accepts_good_config() {
    let env = TestEnv::new();
    let path = env.path().join("config.yaml");
    fs::write(
        &path,
        "policy:\n  max_span_days: 14\navailability:\n  day_start: \"08:00\"\n  day_end: \"20:00\"\noutput_format: json\n",
    )
    .unwrap();

    env.command()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn test_validate_rejects_bad_config() {
    let env = TestEnv::new();
    let path = env.path().join("config.yaml");
    fs::write(
        &path,
        "availability:\n  day_start: \"20:00\"\n  day_end: \"08:00\"\n",
    )
    .unwrap();

    env.command()
        .arg("validate")
        .arg(&path)
        .assert()
        .code(7)
        .stderr(predicate::str::contains("day_end"));

    fs::write(&path, "no_such_setting: 1\n").unwrap();
    env.command().arg("validate").arg(&path).assert().code(7);
}

#[test]
fn test_validate_missing_file() {
    let env = TestEnv::new();
    env.command()
        .arg("validate")
        .arg(env.path().join("absent.yaml"))
        .assert()
        .code(4);
}

#[test]
fn test_broken_user_config_is_a_config_error() {
    let env = TestEnv::new();
    fs::create_dir_all(&env.data_dir).unwrap();
    fs::write(env.data_dir.join("config.yaml"), "policy: [not, a, map]\n").unwrap();

    env.as_user("alice").arg("list").assert().code(7);
}

#[test]
fn test_completions_generate_script() {
    let env = TestEnv::new();
    env.command()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("labres"));
}

#[test]
fn test_unknown_subcommand_fails() {
    let env = TestEnv::new();
    env.command().arg("frobnicate").assert().failure();
}
