//! Thin wrapper around the init system's control command.

use std::process::Command;

use tracing::debug;

use crate::{error::UnitOpsError, paths};

/// Handle for issuing `systemctl` commands.
///
/// The program name resolves through [`paths::systemctl_program`], so tests
/// can substitute a recording stub for the real binary.
#[derive(Debug, Clone)]
pub struct Systemctl {
    program: String,
}

impl Default for Systemctl {
    fn default() -> Self {
        Self {
            program: paths::systemctl_program(),
        }
    }
}

impl Systemctl {
    /// Issues a lifecycle verb (`start`, `stop`, `restart`, `reload-or-restart`)
    /// against `unit`, blocking until the init system responds.
    pub fn control(&self, verb: &str, unit: &str) -> Result<(), UnitOpsError> {
        self.run(&[verb, unit])
    }

    /// Enables `unit` for auto-start.
    pub fn enable(&self, unit: &str) -> Result<(), UnitOpsError> {
        self.run(&["enable", unit])
    }

    /// Disables auto-start for `unit`.
    pub fn disable(&self, unit: &str) -> Result<(), UnitOpsError> {
        self.run(&["disable", unit])
    }

    /// Reloads the init system's unit cache.
    pub fn daemon_reload(&self) -> Result<(), UnitOpsError> {
        self.run(&["daemon-reload"])
    }

    fn run(&self, args: &[&str]) -> Result<(), UnitOpsError> {
        debug!("Running '{} {}'", self.program, args.join(" "));

        let status = Command::new(&self.program).args(args).status().map_err(
            |source| UnitOpsError::ControlSpawn {
                program: self.program.clone(),
                source,
            },
        )?;

        if status.success() {
            Ok(())
        } else {
            Err(UnitOpsError::ControlFailed {
                program: self.program.clone(),
                verb: args.first().copied().unwrap_or_default().to_string(),
                unit: args.get(1).copied().unwrap_or_default().to_string(),
                code: status.code(),
            })
        }
    }
}
