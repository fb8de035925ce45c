use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("tagman").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_arguments_is_a_usage_error() {
    let mut cmd = Command::cargo_bin("tagman").unwrap();
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_single_argument_is_a_usage_error() {
    let mut cmd = Command::cargo_bin("tagman").unwrap();
    cmd.arg("123456")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("CONTAINER_NAME"));
}

#[test]
fn test_unknown_flag_is_a_usage_error() {
    let mut cmd = Command::cargo_bin("tagman").unwrap();
    cmd.arg("123456")
        .arg("greetings")
        .arg("--frobnicate")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_run_without_credentials_exits_with_auth_code() {
    // Point the credential cache at an empty directory.
    let config_home = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("tagman").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .arg("123456")
        .arg("greetings")
        .arg("--dry-run")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("auth login"));
}

#[test]
fn test_auth_status_reports_missing_credentials() {
    let config_home = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("tagman").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .arg("auth")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No stored credentials"));
}

#[test]
fn test_config_path_prints_a_toml_path() {
    let config_home = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("tagman").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .arg("config")
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}
