//! The service action runner.
//!
//! Issues a lifecycle action against a unit and, when a readiness marker is
//! requested, waits for it to appear in the unit's log stream, bounded by a
//! timeout. The follower is always attached before the action is issued and
//! is released on every exit path.

use std::{
    io::Write as _,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use strum_macros::{Display, EnumString};
use tracing::{debug, info, warn};

use crate::{
    constants::{
        DEFAULT_ERROR_LOG_LINES, DEFAULT_TIMEOUT_SECS, POLL_INTERVAL, PROGRESS_AFTER_POLLS,
    },
    error::UnitOpsError,
    follow::{LogSource, LogWatch},
    journal::Journal,
    logs,
    systemctl::Systemctl,
};

/// Lifecycle actions a unit can be asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Reload,
}

impl ServiceAction {
    /// The verb actually issued to the init system.
    ///
    /// A plain `reload` against a stopped unit fails, so reload requests are
    /// issued as `reload-or-restart`.
    pub fn wire_verb(&self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
            ServiceAction::Reload => "reload-or-restart",
        }
    }
}

/// A single service action with its optional readiness wait.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    /// Unit the action is issued against.
    pub service: String,
    /// Lifecycle action to perform.
    pub action: ServiceAction,
    /// Readiness marker to wait for; absent or empty disables the wait phase.
    pub line_match: Option<String>,
    /// Where the marker is looked for.
    pub log_source: LogSource,
    /// Wait budget in seconds.
    pub timeout_secs: u64,
    /// Journal/log lines included in diagnostic tails.
    pub error_log_lines: usize,
}

impl ActionRequest {
    /// Builds a request with no wait phase and the default timeout and
    /// diagnostics length.
    pub fn new(service: impl Into<String>, action: ServiceAction) -> Self {
        Self {
            service: service.into(),
            action,
            line_match: None,
            log_source: LogSource::Journal,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            error_log_lines: DEFAULT_ERROR_LOG_LINES,
        }
    }
}

/// Result of the readiness wait phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The marker appeared before the timeout.
    Matched,
    /// The wait budget elapsed (or the wait was aborted) without a match.
    TimedOut,
    /// No marker was requested; no wait took place.
    NotWaited,
}

/// Internal result of the poll loop.
enum Poll {
    Matched,
    TimedOut,
    Aborted,
}

/// Issues service actions and runs the readiness wait.
pub struct ActionRunner {
    systemctl: Systemctl,
    journal: Journal,
    abort: Arc<AtomicBool>,
}

impl ActionRunner {
    /// Creates a runner. `abort` is checked between poll iterations; a
    /// caller-registered interrupt handler can set it to end the wait early
    /// (follower cleanup still runs).
    pub fn new(abort: Arc<AtomicBool>) -> Self {
        Self {
            systemctl: Systemctl::default(),
            journal: Journal::default(),
            abort,
        }
    }

    /// Runs `request` to completion.
    ///
    /// Only a failed control invocation is an error. A readiness timeout is
    /// surfaced as a warning plus a diagnostic tail and still returns
    /// `Ok(WaitOutcome::TimedOut)`; an aborted wait is reported the same way
    /// minus the tail.
    pub fn run(&self, request: &ActionRequest) -> Result<WaitOutcome, UnitOpsError> {
        let pattern = request.line_match.as_deref().filter(|p| !p.is_empty());

        // Attach the follower before the action so a marker logged during
        // startup cannot be missed.
        let mut watch = match pattern {
            Some(pattern) => Some(
                LogWatch::start(&request.service, &request.log_source, pattern, &self.journal)
                    .map_err(|source| UnitOpsError::FollowerStart {
                        unit: request.service.clone(),
                        source,
                    })?,
            ),
            None => None,
        };

        let result = self.issue_and_wait(request, watch.as_mut());

        if let Some(watch) = watch.as_mut() {
            watch.cancel();
        }

        result
    }

    fn issue_and_wait(
        &self,
        request: &ActionRequest,
        watch: Option<&mut LogWatch>,
    ) -> Result<WaitOutcome, UnitOpsError> {
        let verb = request.action.wire_verb();
        debug!("Issuing '{verb}' against unit '{}'", request.service);

        if let Err(err) = self.systemctl.control(verb, &request.service) {
            self.emit_diagnostics(request);
            return Err(err);
        }

        let Some(watch) = watch else {
            return Ok(WaitOutcome::NotWaited);
        };

        match self.poll(request, watch) {
            Poll::Matched => {
                info!(
                    "Unit '{}' reported readiness after '{verb}'",
                    request.service
                );
                Ok(WaitOutcome::Matched)
            }
            Poll::TimedOut => {
                warn!(
                    "Unit '{}' did not report readiness within {}s of '{verb}'",
                    request.service, request.timeout_secs
                );
                self.emit_diagnostics(request);
                Ok(WaitOutcome::TimedOut)
            }
            Poll::Aborted => {
                warn!(
                    "Wait for readiness of unit '{}' aborted",
                    request.service
                );
                Ok(WaitOutcome::TimedOut)
            }
        }
    }

    /// Checks the watch once per second, up to the request's wait budget.
    fn poll(&self, request: &ActionRequest, watch: &mut LogWatch) -> Poll {
        let mut progress_emitted = false;

        for iteration in 1..=request.timeout_secs {
            if self.abort.load(Ordering::SeqCst) {
                finish_progress(progress_emitted);
                return Poll::Aborted;
            }

            if watch.matched() {
                finish_progress(progress_emitted);
                return Poll::Matched;
            }

            // Operator-visible heartbeat once the wait stops being instant.
            if iteration > PROGRESS_AFTER_POLLS {
                eprint!(".");
                let _ = std::io::stderr().flush();
                progress_emitted = true;
            }

            thread::sleep(POLL_INTERVAL);
        }

        finish_progress(progress_emitted);
        if watch.matched() {
            Poll::Matched
        } else {
            Poll::TimedOut
        }
    }

    /// Prints the journal tail and, when the log source is an existing file,
    /// the file tail, to the diagnostic stream.
    fn emit_diagnostics(&self, request: &ActionRequest) {
        let lines = request.error_log_lines;
        if lines == 0 {
            return;
        }

        match self.journal.last_lines(&request.service, lines) {
            Ok(tail) if !tail.is_empty() => {
                warn!("Last {lines} journal lines for '{}':", request.service);
                for line in tail.lines() {
                    eprintln!("{line}");
                }
            }
            Ok(_) => {}
            Err(err) => {
                debug!("Journal tail for '{}' unavailable: {err}", request.service)
            }
        }

        if let LogSource::File(path) = &request.log_source
            && path.exists()
        {
            match logs::tail_file(path, lines) {
                Ok(tail) if !tail.is_empty() => {
                    warn!("Last {lines} lines of {}:", path.display());
                    for line in tail {
                        eprintln!("{line}");
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    debug!("Log tail of {} unavailable: {err}", path.display())
                }
            }
        }
    }
}

fn finish_progress(progress_emitted: bool) {
    if progress_emitted {
        eprintln!();
    }
}
