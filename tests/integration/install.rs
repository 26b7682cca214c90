#[path = "common/mod.rs"]
mod common;

use std::{
    fs,
    path::Path,
    sync::{Arc, atomic::AtomicBool},
};

use common::{EnvGuard, recorded_calls, write_stub};
use tempfile::tempdir;
use unitops::{
    action::ActionRunner,
    error::UnitOpsError,
    install::UnitInstaller,
    template::TemplateVars,
};

const TEMPLATE: &str = "\
[Unit]
Description=__APP__ service

[Service]
ExecStart=__INSTALL_DIR__/bin/__APP__ serve

[Install]
WantedBy=multi-user.target
";

struct Sandbox {
    _guard: EnvGuard,
    calls: std::path::PathBuf,
    unit_dir: std::path::PathBuf,
    template: std::path::PathBuf,
}

/// Builds a sandbox with stubbed control programs, a temporary unit/state
/// directory pair, and a template on disk.
fn sandbox(dir: &Path) -> Sandbox {
    let calls = dir.join("calls.log");
    let systemctl = write_stub(dir, "systemctl", &calls, 0);
    let journalctl = write_stub(dir, "journalctl", &dir.join("journal.log"), 0);

    let unit_dir = dir.join("units");
    let state_dir = dir.join("state");

    let guard = EnvGuard::set(&[
        ("UNITOPS_SYSTEMCTL", systemctl.to_str().unwrap()),
        ("UNITOPS_JOURNALCTL", journalctl.to_str().unwrap()),
        ("UNITOPS_UNIT_DIR", unit_dir.to_str().unwrap()),
        ("UNITOPS_STATE_DIR", state_dir.to_str().unwrap()),
    ]);

    let template = dir.join("demo.service.tmpl");
    fs::write(&template, TEMPLATE).unwrap();

    Sandbox {
        _guard: guard,
        calls,
        unit_dir,
        template,
    }
}

fn demo_vars() -> TemplateVars {
    TemplateVars {
        install_dir: Some("/opt/demo".to_string()),
        app: Some("demo".to_string()),
    }
}

#[test]
fn install_renders_template_and_registers_unit() {
    let temp = tempdir().unwrap();
    let sandbox = sandbox(temp.path());

    UnitInstaller::new()
        .install("demo", &sandbox.template, &demo_vars())
        .unwrap();

    let unit_file = sandbox.unit_dir.join("demo.service");
    let content = fs::read_to_string(&unit_file).unwrap();
    assert!(content.contains("Description=demo service"));
    assert!(content.contains("ExecStart=/opt/demo/bin/demo serve"));
    assert!(!content.contains("__APP__"));

    assert_eq!(
        recorded_calls(&sandbox.calls),
        vec!["enable demo", "daemon-reload"]
    );

    // The managed write is tracked for later drift detection.
    assert!(temp.path().join("state/checksums.json").exists());
}

#[test]
fn install_overwrites_a_manually_edited_unit_file() {
    let temp = tempdir().unwrap();
    let sandbox = sandbox(temp.path());
    let installer = UnitInstaller::new();

    installer
        .install("demo", &sandbox.template, &demo_vars())
        .unwrap();

    let unit_file = sandbox.unit_dir.join("demo.service");
    fs::write(&unit_file, "[Unit]\nDescription=edited by hand\n").unwrap();

    installer
        .install("demo", &sandbox.template, &demo_vars())
        .unwrap();

    let content = fs::read_to_string(&unit_file).unwrap();
    assert!(content.contains("Description=demo service"));
}

#[test]
fn missing_template_field_fails_before_any_write() {
    let temp = tempdir().unwrap();
    let sandbox = sandbox(temp.path());

    let vars = TemplateVars {
        install_dir: Some("/opt/demo".to_string()),
        app: None,
    };

    let err = UnitInstaller::new()
        .install("demo", &sandbox.template, &vars)
        .unwrap_err();

    assert!(matches!(err, UnitOpsError::Template(_)));
    assert!(!sandbox.unit_dir.join("demo.service").exists());
    assert!(recorded_calls(&sandbox.calls).is_empty());
}

#[test]
fn remove_stops_disables_and_deletes() {
    let temp = tempdir().unwrap();
    let sandbox = sandbox(temp.path());
    let installer = UnitInstaller::new();

    installer
        .install("demo", &sandbox.template, &demo_vars())
        .unwrap();
    fs::remove_file(&sandbox.calls).unwrap();

    let runner = ActionRunner::new(Arc::new(AtomicBool::new(false)));
    installer.remove("demo", &runner).unwrap();

    assert!(!sandbox.unit_dir.join("demo.service").exists());
    assert_eq!(
        recorded_calls(&sandbox.calls),
        vec!["stop demo", "disable demo", "daemon-reload"]
    );
}

#[test]
fn remove_of_absent_unit_is_a_silent_noop_twice() {
    let temp = tempdir().unwrap();
    let sandbox = sandbox(temp.path());
    let installer = UnitInstaller::new();
    let runner = ActionRunner::new(Arc::new(AtomicBool::new(false)));

    installer.remove("demo", &runner).unwrap();
    installer.remove("demo", &runner).unwrap();

    // No unit file, so no init-system traffic at all.
    assert!(recorded_calls(&sandbox.calls).is_empty());
}
