//! Access to the init system's journal for a unit.

use std::{
    io,
    process::{Child, Command, Stdio},
};

use crate::paths;

/// Handle for reading a unit's journal.
///
/// The program name resolves through [`paths::journalctl_program`], so tests
/// can substitute a stub for the real binary.
#[derive(Debug, Clone)]
pub struct Journal {
    program: String,
}

impl Default for Journal {
    fn default() -> Self {
        Self {
            program: paths::journalctl_program(),
        }
    }
}

impl Journal {
    /// Returns the last `lines` journal lines for `unit` as one block of text.
    pub fn last_lines(&self, unit: &str, lines: usize) -> io::Result<String> {
        let output = Command::new(&self.program)
            .args(["-u", unit, "-n", &lines.to_string(), "--no-pager"])
            .stderr(Stdio::null())
            .output()?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Spawns a follower streaming new journal entries for `unit`.
    ///
    /// History is not replayed; only lines emitted after the spawn appear on
    /// the child's stdout. The caller owns the child and must terminate it.
    pub fn spawn_follow(&self, unit: &str) -> io::Result<Child> {
        Command::new(&self.program)
            .args(["-u", unit, "-f", "-n", "0", "-o", "cat"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
    }
}
