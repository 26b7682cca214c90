//! Constants and default values for unitops.
//!
//! This module centralizes the defaults, placeholder tokens, and environment
//! override names used throughout the crate.

use std::time::Duration;

// ============================================================================
// Readiness Wait
// ============================================================================

/// Default readiness wait budget, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default number of journal/log lines included in diagnostic tails.
pub const DEFAULT_ERROR_LOG_LINES: usize = 20;

/// Cadence of the readiness poll loop.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Number of unmatched poll iterations before progress dots are emitted.
pub const PROGRESS_AFTER_POLLS: u64 = 3;

/// Cadence at which a file follower checks for appended bytes.
pub const FILE_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// `--log-path` sentinel selecting the unit's journal instead of a file.
pub const JOURNAL_SENTINEL: &str = "systemd";

// ============================================================================
// Templates
// ============================================================================

/// Placeholder token replaced with the application's installation directory.
pub const INSTALL_DIR_TOKEN: &str = "__INSTALL_DIR__";

/// Placeholder token replaced with the application identifier.
pub const APP_TOKEN: &str = "__APP__";

// ============================================================================
// Paths and Programs
// ============================================================================

/// Default directory for installed unit files.
pub const DEFAULT_UNIT_DIR: &str = "/etc/systemd/system";

/// Default state directory holding the checksum store.
pub const DEFAULT_STATE_DIR: &str = "/var/lib/unitops";

/// Environment override for the unit file directory.
pub const UNIT_DIR_ENV: &str = "UNITOPS_UNIT_DIR";

/// Environment override for the state directory.
pub const STATE_DIR_ENV: &str = "UNITOPS_STATE_DIR";

/// Environment override for the init-system control program.
pub const SYSTEMCTL_ENV: &str = "UNITOPS_SYSTEMCTL";

/// Environment override for the journal reader program.
pub const JOURNALCTL_ENV: &str = "UNITOPS_JOURNALCTL";
