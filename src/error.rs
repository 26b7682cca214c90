//! Error handling for unitops.
use std::path::PathBuf;

use thiserror::Error;

/// Defines all possible errors surfaced by the unit helpers.
#[derive(Debug, Error)]
pub enum UnitOpsError {
    /// Error reading or writing a unit file.
    #[error("Unit file I/O failed: {0}")]
    UnitFileIo(#[from] std::io::Error),

    /// The init-system control command exited with a failure status.
    #[error("'{program} {verb} {unit}' exited with status {code:?}")]
    ControlFailed {
        /// Program that was invoked.
        program: String,
        /// Verb that was issued.
        verb: String,
        /// Unit the verb was issued against.
        unit: String,
        /// Exit code, if the command was not killed by a signal.
        code: Option<i32>,
    },

    /// The init-system control command could not be spawned at all.
    #[error("Failed to invoke '{program}': {source}")]
    ControlSpawn {
        /// Program that could not be spawned.
        program: String,
        /// The underlying error that occurred.
        #[source]
        source: std::io::Error,
    },

    /// Error starting the log follower for a readiness wait.
    #[error("Failed to start log follower for '{unit}': {source}")]
    FollowerStart {
        /// Unit whose log stream could not be followed.
        unit: String,
        /// The underlying error that occurred.
        #[source]
        source: std::io::Error,
    },

    /// Ownership change on an installed unit file failed.
    #[error("Failed to set ownership on {path}: {source}")]
    Chown {
        /// File whose ownership could not be changed.
        path: PathBuf,
        /// The underlying errno.
        #[source]
        source: nix::errno::Errno,
    },

    /// Error rendering a unit template.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Error in the checksum store.
    #[error("Checksum store error: {0}")]
    ChecksumStore(#[from] ChecksumStoreError),
}

/// Error type for unit template rendering.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Error reading the template file.
    #[error("Failed to read template: {0}")]
    ReadError(#[from] std::io::Error),

    /// A placeholder occurs in the template but its field was not provided.
    #[error("Template references {token} but no non-empty {field} was provided")]
    MissingField {
        /// The placeholder token found in the template.
        token: &'static str,
        /// The CLI field that would fill it.
        field: &'static str,
    },
}

/// Error type for checksum store operations.
#[derive(Debug, Error)]
pub enum ChecksumStoreError {
    /// Error reading the store or a tracked file.
    #[error("Failed to read checksum store: {0}")]
    ReadError(#[from] std::io::Error),

    /// Error parsing the JSON contents of the store.
    #[error("Failed to parse checksum store: {0}")]
    ParseError(#[from] serde_json::Error),
}
