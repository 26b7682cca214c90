//! Log followers and the watch handle that owns them.
//!
//! A [`LogWatch`] is started before a service action is issued and scans the
//! unit's log stream for a readiness marker. The handle owns the follower
//! resources for its whole lifetime: a reader thread, plus the journal
//! follower child when the source is the journal. Resources are released
//! exactly once, through [`LogWatch::cancel`] or on drop, so no exit path can
//! leak the follower.

use std::{
    convert::Infallible,
    fs::{File, OpenOptions},
    io::{self, BufRead, BufReader, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
    process::Child,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use nix::{
    errno::Errno,
    sys::signal::{self, Signal},
    unistd::Pid,
};
use tracing::{debug, warn};

use crate::{
    constants::{FILE_POLL_INTERVAL, JOURNAL_SENTINEL},
    journal::Journal,
};

/// Where a readiness marker is looked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSource {
    /// The unit's journal stream.
    Journal,
    /// A log file on disk, tailed from its current end.
    File(PathBuf),
}

impl FromStr for LogSource {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == JOURNAL_SENTINEL {
            Ok(LogSource::Journal)
        } else {
            Ok(LogSource::File(PathBuf::from(s)))
        }
    }
}

/// Scans a unit's log stream for a pattern in the background.
///
/// Matches are recorded in a shared flag read via [`LogWatch::matched`]; the
/// readiness poll loop never touches the stream itself.
pub struct LogWatch {
    matched: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
    follower: Option<Child>,
}

impl LogWatch {
    /// Starts a follower for `source`, scanning for `pattern`.
    ///
    /// The follower is attached before this returns, so lines emitted after
    /// the call are never missed. Journal followers stream new entries only;
    /// file followers start at the file's current end, creating the file when
    /// possible and tolerating one that cannot be created yet.
    pub fn start(
        unit: &str,
        source: &LogSource,
        pattern: &str,
        journal: &Journal,
    ) -> io::Result<Self> {
        let matched = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(AtomicBool::new(false));
        let pattern = pattern.as_bytes().to_vec();

        let (reader, follower) = match source {
            LogSource::Journal => {
                let mut child = journal.spawn_follow(unit)?;
                let stdout = child
                    .stdout
                    .take()
                    .ok_or_else(|| io::Error::other("journal follower has no stdout"))?;

                let handle = thread::spawn({
                    let matched = Arc::clone(&matched);
                    let stop = Arc::clone(&stop);
                    move || scan_stream(stdout, &pattern, &matched, &stop)
                });

                (handle, Some(child))
            }
            LogSource::File(path) => {
                let path = path.clone();
                // Best-effort creation; the tail also copes with the file
                // appearing later.
                if let Err(err) = OpenOptions::new().create(true).append(true).open(&path) {
                    debug!("Could not create log file {}: {err}", path.display());
                }
                // The starting offset is recorded before this call returns, so
                // lines appended from here on are inside the watch window.
                let offset = std::fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
                let handle = thread::spawn({
                    let matched = Arc::clone(&matched);
                    let stop = Arc::clone(&stop);
                    move || tail_path(&path, offset, &pattern, &matched, &stop)
                });

                (handle, None)
            }
        };

        Ok(Self {
            matched,
            stop,
            reader: Some(reader),
            follower,
        })
    }

    /// Whether the pattern has been observed so far.
    pub fn matched(&self) -> bool {
        self.matched.load(Ordering::SeqCst)
    }

    /// Stops the follower and releases its resources.
    ///
    /// Idempotent. A follower process that already exited is not an error,
    /// and failures here are reported as warnings at most.
    pub fn cancel(&mut self) {
        let Some(reader) = self.reader.take() else {
            return;
        };

        self.stop.store(true, Ordering::SeqCst);

        if let Some(child) = self.follower.take() {
            terminate_follower(child);
        }

        if reader.join().is_err() {
            warn!("Log follower reader thread panicked");
        }
    }
}

impl Drop for LogWatch {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Gracefully stops a follower child, escalating only if it lingers.
fn terminate_follower(mut child: Child) {
    let pid = Pid::from_raw(child.id() as i32);

    match signal::kill(pid, Signal::SIGTERM) {
        Ok(()) => debug!("Sent SIGTERM to log follower (PID {pid})"),
        Err(Errno::ESRCH) => debug!("Log follower (PID {pid}) already exited"),
        Err(err) => warn!("Failed to signal log follower (PID {pid}): {err}"),
    }

    const CHECKS: usize = 10;
    const INTERVAL: Duration = Duration::from_millis(100);

    for _ in 0..CHECKS {
        match child.try_wait() {
            Ok(Some(_)) => return,
            Ok(None) => thread::sleep(INTERVAL),
            Err(err) => {
                warn!("Failed to wait on log follower (PID {pid}): {err}");
                break;
            }
        }
    }

    warn!("Log follower (PID {pid}) did not exit after SIGTERM; killing");
    let _ = child.kill();
    let _ = child.wait();
}

/// Scans lines from a follower's stdout for the pattern.
///
/// Exits on match, on EOF (the follower died), or when asked to stop.
fn scan_stream(stream: impl Read, pattern: &[u8], matched: &AtomicBool, stop: &AtomicBool) {
    let reader = BufReader::new(stream);

    for line in reader.lines() {
        if stop.load(Ordering::SeqCst) {
            break;
        }

        let Ok(line) = line else {
            break;
        };

        if contains(line.as_bytes(), pattern) {
            matched.store(true, Ordering::SeqCst);
            break;
        }
    }
}

/// Tails `path` from its current end, scanning appended bytes for the pattern.
///
/// The file may not exist yet; it is picked up once created. A carry of the
/// last `pattern.len() - 1` bytes is kept across reads so a marker split
/// between chunks still matches, and a shrinking file (rotation, truncation)
/// restarts the tail from the beginning.
fn tail_path(
    path: &Path,
    mut offset: u64,
    pattern: &[u8],
    matched: &AtomicBool,
    stop: &AtomicBool,
) {
    let mut carry: Vec<u8> = Vec::new();

    while !stop.load(Ordering::SeqCst) {
        match read_appended(path, &mut offset) {
            Ok(chunk) if !chunk.is_empty() => {
                carry.extend_from_slice(&chunk);

                if contains(&carry, pattern) {
                    matched.store(true, Ordering::SeqCst);
                    return;
                }

                let keep = pattern.len().saturating_sub(1).min(carry.len());
                carry.drain(..carry.len() - keep);
            }
            Ok(_) => thread::sleep(FILE_POLL_INTERVAL),
            Err(err) => {
                debug!("Tail of {} failed: {err}; retrying", path.display());
                thread::sleep(FILE_POLL_INTERVAL);
            }
        }
    }
}

/// Reads bytes appended to `path` since `offset`, advancing the offset.
///
/// A missing file reads as empty; a file shorter than the offset resets the
/// offset to zero so the next read starts over.
fn read_appended(path: &Path, offset: &mut u64) -> io::Result<Vec<u8>> {
    let Ok(metadata) = std::fs::metadata(path) else {
        return Ok(Vec::new());
    };

    let len = metadata.len();
    if len < *offset {
        *offset = 0;
    }
    if len == *offset {
        return Ok(Vec::new());
    }

    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(*offset))?;

    let mut buf = Vec::with_capacity((len - *offset) as usize);
    file.take(len - *offset).read_to_end(&mut buf)?;
    *offset += buf.len() as u64;
    Ok(buf)
}

/// Plain byte-level containment check.
fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}
