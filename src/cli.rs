//! Command-line interface for unitops.
use std::{path::PathBuf, str::FromStr};

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    action::ServiceAction,
    constants::{DEFAULT_ERROR_LOG_LINES, DEFAULT_TIMEOUT_SECS},
    follow::LogSource,
};

/// Wrapper around `LevelFilter` so clap can parse log levels from their
/// string names ("info", "debug", etc.).
#[derive(Clone, Copy, Debug)]
pub struct LogLevelArg(LevelFilter);

impl LogLevelArg {
    /// String representation suitable for `RUST_LOG`.
    pub fn as_str(&self) -> &'static str {
        match self.0 {
            LevelFilter::OFF => "off",
            LevelFilter::ERROR => "error",
            LevelFilter::WARN => "warn",
            LevelFilter::INFO => "info",
            LevelFilter::DEBUG => "debug",
            LevelFilter::TRACE => "trace",
        }
    }
}

impl FromStr for LogLevelArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let level = match trimmed.to_ascii_lowercase().as_str() {
            "off" => LevelFilter::OFF,
            "error" => LevelFilter::ERROR,
            "warn" => LevelFilter::WARN,
            "info" => LevelFilter::INFO,
            "debug" => LevelFilter::DEBUG,
            "trace" => LevelFilter::TRACE,
            _ => return Err(format!("invalid log level '{trimmed}'")),
        };

        Ok(LogLevelArg(level))
    }
}

/// Command-line interface for unitops.
#[derive(Parser)]
#[command(name = "unitops", version, author)]
#[command(about = "Systemd unit lifecycle helper for packaging scripts", long_about = None)]
pub struct Cli {
    /// Override the logging verbosity for this invocation only.
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for unitops.
#[derive(Subcommand)]
pub enum Commands {
    /// Install a unit file rendered from a template and enable the unit.
    Install {
        /// Name of the service unit.
        #[arg(short, long)]
        service: String,

        /// Path to the unit file template.
        #[arg(short, long)]
        template: PathBuf,

        /// Application installation directory substituted into the template.
        #[arg(long, value_name = "DIR")]
        install_dir: Option<String>,

        /// Application identifier substituted into the template.
        #[arg(long, value_name = "ID")]
        app: Option<String>,
    },

    /// Stop and disable a unit and delete its unit file.
    Remove {
        /// Name of the service unit.
        #[arg(short, long)]
        service: String,
    },

    /// Run a lifecycle action, optionally waiting for a readiness marker.
    Run {
        /// Name of the service unit.
        #[arg(short, long)]
        service: String,

        /// Action to perform: start, stop, restart or reload.
        #[arg(short, long)]
        action: ServiceAction,

        /// Log line to wait for after the action succeeds.
        #[arg(short, long, value_name = "PATTERN")]
        line_match: Option<String>,

        /// Log file to scan for the marker, or "systemd" for the journal.
        #[arg(long, default_value = "systemd", value_name = "PATH")]
        log_path: LogSource,

        /// Maximum number of seconds to wait for the marker.
        #[arg(
            long,
            default_value_t = DEFAULT_TIMEOUT_SECS,
            value_name = "SECONDS",
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        timeout: u64,

        /// Number of journal/log lines shown when diagnostics are emitted.
        #[arg(long, default_value_t = DEFAULT_ERROR_LOG_LINES, value_name = "LINES")]
        length: usize,
    },

    /// Show the tail of a unit's journal and optionally a log file.
    Logs {
        /// Name of the service unit.
        #[arg(short, long)]
        service: String,

        /// Log file to include alongside the journal.
        #[arg(long, value_name = "PATH")]
        log_path: Option<PathBuf>,

        /// Number of lines to show (default: 50).
        #[arg(short = 'n', long, default_value = "50")]
        lines: usize,
    },
}

/// Parses command-line arguments and returns a `Cli` struct.
pub fn parse_args() -> Cli {
    Cli::parse()
}
