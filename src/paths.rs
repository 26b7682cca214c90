//! Runtime path and program resolution.
//!
//! Defaults target a real host (`/etc/systemd/system`, `/var/lib/unitops`,
//! `systemctl`/`journalctl` from `PATH`); each can be overridden through the
//! environment so tests can point the helpers at temporary directories and
//! recording stubs.

use std::{env, path::PathBuf};

use crate::constants::{
    DEFAULT_STATE_DIR, DEFAULT_UNIT_DIR, JOURNALCTL_ENV, STATE_DIR_ENV, SYSTEMCTL_ENV,
    UNIT_DIR_ENV,
};

/// Directory into which unit files are installed.
pub fn unit_dir() -> PathBuf {
    env::var(UNIT_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_UNIT_DIR))
}

/// Directory holding unitops state (the checksum store).
pub fn state_dir() -> PathBuf {
    env::var(STATE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_DIR))
}

/// Path of the installed unit file for `service`.
pub fn unit_file(service: &str) -> PathBuf {
    unit_dir().join(format!("{service}.service"))
}

/// Program used for init-system control.
pub fn systemctl_program() -> String {
    env::var(SYSTEMCTL_ENV).unwrap_or_else(|_| "systemctl".to_string())
}

/// Program used for journal access.
pub fn journalctl_program() -> String {
    env::var(JOURNALCTL_ENV).unwrap_or_else(|_| "journalctl".to_string())
}
