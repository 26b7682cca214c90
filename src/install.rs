//! Unit file installation and removal.

use std::{fs, io::ErrorKind, path::Path};

use nix::unistd::{self, Gid, Uid};
use tracing::{debug, info, warn};

use crate::{
    action::{ActionRequest, ActionRunner, ServiceAction},
    checksum::{ChecksumStore, Drift},
    error::UnitOpsError,
    paths,
    systemctl::Systemctl,
    template::{self, TemplateVars},
};

/// Installs and removes managed unit files.
pub struct UnitInstaller {
    systemctl: Systemctl,
}

impl Default for UnitInstaller {
    fn default() -> Self {
        Self {
            systemctl: Systemctl::default(),
        }
    }
}

impl UnitInstaller {
    /// Creates an installer using the default control program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `template_path` with `vars` and installs the result as
    /// `<unit-dir>/<service>.service`, then enables the unit and reloads the
    /// unit cache.
    ///
    /// An existing unit file is always overwritten; a checksum mismatch
    /// against the last managed write only produces a warning.
    pub fn install(
        &self,
        service: &str,
        template_path: &Path,
        vars: &TemplateVars,
    ) -> Result<(), UnitOpsError> {
        let rendered = template::render_file(template_path, vars)?;
        let target = paths::unit_file(service);

        let mut store = ChecksumStore::load()?;
        if target.exists() {
            match store.compare(&target) {
                Ok(Drift::Changed) => warn!(
                    "Unit file {} was modified since it was last installed; overwriting",
                    target.display()
                ),
                Ok(_) => {}
                Err(err) => debug!(
                    "Checksum comparison for {} failed: {err}",
                    target.display()
                ),
            }
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, rendered)?;
        store.record(&target)?;

        set_root_ownership(&target)?;

        self.systemctl.enable(service)?;
        self.systemctl.daemon_reload()?;

        info!("Installed unit file {}", target.display());
        Ok(())
    }

    /// Stops and disables `service` and deletes its unit file.
    ///
    /// When the unit file does not exist this is a silent no-op, so removal
    /// is idempotent.
    pub fn remove(&self, service: &str, runner: &ActionRunner) -> Result<(), UnitOpsError> {
        let target = paths::unit_file(service);
        if !target.exists() {
            debug!(
                "Unit file {} not present; nothing to remove",
                target.display()
            );
            return Ok(());
        }

        runner.run(&ActionRequest::new(service, ServiceAction::Stop))?;
        self.systemctl.disable(service)?;

        if let Err(err) = fs::remove_file(&target)
            && err.kind() != ErrorKind::NotFound
        {
            return Err(err.into());
        }

        match ChecksumStore::load() {
            Ok(mut store) => {
                if let Err(err) = store.forget(&target) {
                    debug!("Failed to drop checksum for {}: {err}", target.display());
                }
            }
            Err(err) => debug!("Checksum store unavailable: {err}"),
        }

        self.systemctl.daemon_reload()?;

        info!("Removed unit file {}", target.display());
        Ok(())
    }
}

/// Sets root ownership on an installed unit file.
///
/// Skipped when not running as root, so unprivileged runs can still exercise
/// the installer against an overridden unit directory.
fn set_root_ownership(path: &Path) -> Result<(), UnitOpsError> {
    if !Uid::effective().is_root() {
        debug!(
            "Not running as root; leaving ownership of {} unchanged",
            path.display()
        );
        return Ok(());
    }

    unistd::chown(path, Some(Uid::from_raw(0)), Some(Gid::from_raw(0))).map_err(|source| {
        UnitOpsError::Chown {
            path: path.to_path_buf(),
            source,
        }
    })
}
