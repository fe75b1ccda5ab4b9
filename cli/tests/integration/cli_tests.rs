//! Integration tests for argument parsing, configuration and the service
//! commands that are safe to run unprivileged.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn rexray() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("rexray"));
    cmd.env("NO_COLOR", "1").env_remove("REXRAY_HOME").env_remove("REXRAY_LOG");
    cmd
}

#[cfg(unix)]
fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(not(unix))]
fn is_root() -> bool {
    false
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    rexray()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_help_lists_commands() {
    rexray()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("uninstall"))
        .stdout(predicate::str::contains("service"))
        .stdout(predicate::str::contains("connect"));
}

#[test]
fn test_version_command_shows_version_and_binary_path() {
    rexray()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rexray 0.1.0"))
        .stdout(predicate::str::contains("/usr/bin/rexray"));
}

#[test]
fn test_version_command_follows_prefix() {
    rexray()
        .env("REXRAY_HOME", "/opt/custom")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("/opt/custom/usr/bin/rexray"));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    rexray().arg("frobnicate").assert().code(2);
}

// --- Configuration ---

#[test]
fn test_invalid_config_file_fails() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let config = dir.path().join("config.yml");
    std::fs::write(&config, "rexray: [unclosed\n").expect("write");
    rexray()
        .arg("--config")
        .arg(&config)
        .args(["service", "initsys"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot parse"));
}

#[test]
fn test_invalid_log_level_fails() {
    rexray()
        .args(["--log-level", "loud", "service", "initsys"])
        .env("REXRAY_CONFIG_FILE", "/nonexistent/config.yml")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid value for rexray.logLevel"));
}

// --- Service commands ---

#[test]
fn test_service_initsys_prints_a_known_name() {
    rexray()
        .env("REXRAY_CONFIG_FILE", "/nonexistent/config.yml")
        .args(["service", "initsys"])
        .assert()
        .success()
        .stdout(
            predicate::str::is_match("^(systemd|update-rc\\.d|chkconfig|unknown)\n$")
                .expect("regex"),
        );
}

#[test]
fn test_install_requires_root() {
    if is_root() {
        return;
    }
    rexray()
        .env("REXRAY_CONFIG_FILE", "/nonexistent/config.yml")
        .arg("install")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("REX-Ray can only be installed by root"));
}

#[test]
fn test_uninstall_requires_root() {
    if is_root() {
        return;
    }
    rexray()
        .env("REXRAY_CONFIG_FILE", "/nonexistent/config.yml")
        .args(["uninstall", "--package"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("REX-Ray can only be uninstalled by root"));
}

#[test]
fn test_service_start_requires_root() {
    if is_root() {
        return;
    }
    rexray()
        .env("REXRAY_CONFIG_FILE", "/nonexistent/config.yml")
        .args(["service", "start"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("REX-Ray can only be started by root"));
}
