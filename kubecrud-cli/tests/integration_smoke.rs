//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_top_level_help() {
    let mut cmd = Command::cargo_bin("kubecrud").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("init-db"));
}

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("kubecrud").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Address to bind to"))
        .stdout(predicate::str::contains("--wait-for-bootstrap"));
}

#[test]
fn test_init_db_help() {
    let mut cmd = Command::cargo_bin("kubecrud").unwrap();
    cmd.arg("init-db").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Connect attempts"));
}

#[test]
fn test_serve_rejects_bad_bind_address() {
    let mut cmd = Command::cargo_bin("kubecrud").unwrap();
    cmd.arg("serve").arg("--bind").arg("not-an-address");

    cmd.assert().failure();
}

#[test]
fn test_init_db_fails_without_database() {
    let mut cmd = Command::cargo_bin("kubecrud").unwrap();
    cmd.arg("init-db")
        .arg("--attempts")
        .arg("1")
        .env("POSTGRES_HOST", "127.0.0.1")
        .env("POSTGRES_PORT", "1")
        .env("DB_CONNECT_TIMEOUT_SECS", "1");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("database bootstrap failed"));
}
