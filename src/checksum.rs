//! Checksum bookkeeping for installed unit files.
//!
//! Digests of managed files are kept in a JSON map under the state directory
//! so later installs can tell whether an operator edited a file since the
//! last managed write.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{error::ChecksumStoreError, paths};

/// Result of comparing a file against its stored digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drift {
    /// File content matches the stored digest.
    Unchanged,
    /// File content differs from the stored digest.
    Changed,
    /// No digest is stored for the file.
    Unknown,
}

/// Represents the checksum store file structure.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct ChecksumStore {
    /// Map of managed file paths to their hex digests.
    files: HashMap<PathBuf, String>,
}

impl ChecksumStore {
    /// Returns the checksum store path.
    fn path() -> PathBuf {
        paths::state_dir().join("checksums.json")
    }

    /// Loads the store from disk, defaulting to empty when absent.
    pub fn load() -> Result<Self, ChecksumStoreError> {
        let path = Self::path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Saves the current state to disk.
    pub fn save(&self) -> Result<(), ChecksumStoreError> {
        let path = Self::path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Records the current digest of `path` and saves.
    pub fn record(&mut self, path: &Path) -> Result<(), ChecksumStoreError> {
        let digest = digest_file(path)?;
        self.files.insert(path.to_path_buf(), digest);
        self.save()
    }

    /// Compares `path` against its stored digest.
    pub fn compare(&self, path: &Path) -> Result<Drift, ChecksumStoreError> {
        let Some(stored) = self.files.get(path) else {
            return Ok(Drift::Unknown);
        };

        if digest_file(path)? == *stored {
            Ok(Drift::Unchanged)
        } else {
            Ok(Drift::Changed)
        }
    }

    /// Drops the digest entry for `path`, if any, and saves.
    pub fn forget(&mut self, path: &Path) -> Result<(), ChecksumStoreError> {
        if self.files.remove(path).is_some() {
            self.save()?;
        }
        Ok(())
    }
}

/// Hex SHA-256 digest of a file's content.
fn digest_file(path: &Path) -> Result<String, ChecksumStoreError> {
    let contents = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&contents);
    Ok(format!("{:x}", hasher.finalize()))
}
