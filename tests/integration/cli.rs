#[path = "common/mod.rs"]
mod common;

use std::fs;

use assert_cmd::Command;
use common::{recorded_calls, write_printing_stub, write_stub};
use predicates::prelude::*;
use tempfile::tempdir;

fn unitops() -> Command {
    Command::cargo_bin("unitops").unwrap()
}

#[test]
fn help_lists_subcommands() {
    unitops()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("install")
                .and(predicate::str::contains("remove"))
                .and(predicate::str::contains("run"))
                .and(predicate::str::contains("logs")),
        );
}

#[test]
fn run_dispatches_to_the_control_program() {
    let temp = tempdir().unwrap();
    let dir = temp.path();
    let calls = dir.join("calls.log");
    let systemctl = write_stub(dir, "systemctl", &calls, 0);

    unitops()
        .env("UNITOPS_SYSTEMCTL", &systemctl)
        .args(["run", "--service", "demo", "--action", "start"])
        .assert()
        .success();

    assert_eq!(recorded_calls(&calls), vec!["start demo"]);
}

#[test]
fn run_surfaces_control_failure_as_nonzero_exit() {
    let temp = tempdir().unwrap();
    let dir = temp.path();
    let systemctl = write_stub(dir, "systemctl", &dir.join("calls.log"), 1);
    let journalctl = write_stub(dir, "journalctl", &dir.join("journal.log"), 0);

    unitops()
        .env("UNITOPS_SYSTEMCTL", &systemctl)
        .env("UNITOPS_JOURNALCTL", &journalctl)
        .args(["run", "--service", "demo", "--action", "stop"])
        .assert()
        .failure();
}

#[test]
fn run_rejects_unknown_action() {
    unitops()
        .args(["run", "--service", "demo", "--action", "bounce"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid"));
}

#[test]
fn run_rejects_zero_timeout() {
    unitops()
        .args([
            "run", "--service", "demo", "--action", "start", "--timeout", "0",
        ])
        .assert()
        .failure();
}

#[test]
fn logs_prints_journal_and_file_tails() {
    let temp = tempdir().unwrap();
    let dir = temp.path();
    let journalctl = write_printing_stub(dir, "journalctl", "journal says hello");

    let log = dir.join("app.log");
    fs::write(&log, "file says hello\n").unwrap();

    unitops()
        .env("UNITOPS_JOURNALCTL", &journalctl)
        .args([
            "logs",
            "--service",
            "demo",
            "--log-path",
            log.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("journal says hello")
                .and(predicate::str::contains("file says hello")),
        );
}

#[test]
fn install_requires_service_and_template() {
    unitops().arg("install").assert().failure();
}
