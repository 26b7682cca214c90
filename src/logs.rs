use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::journal::Journal;

/// Reads the last `lines` lines of a log file.
///
/// # Arguments
/// * `path` - Path of the log file.
/// * `lines` - The number of log lines to return.
///
/// # Returns
/// * The tail window of the file, or an empty vector if the file is missing.
pub fn tail_file(path: &Path, lines: usize) -> io::Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let all_lines: Vec<String> = reader.lines().map_while(Result::ok).collect();

    let start = if all_lines.len() > lines {
        all_lines.len() - lines
    } else {
        0
    };
    Ok(all_lines[start..].to_vec())
}

/// Prints the last `lines` journal lines for `service` and, when given, the
/// tail of `log_path`.
pub fn show_logs(
    journal: &Journal,
    service: &str,
    log_path: Option<&Path>,
    lines: usize,
) -> io::Result<()> {
    let journal_tail = journal.last_lines(service, lines)?;
    if journal_tail.is_empty() {
        println!("No journal entries for service '{service}'.");
    } else {
        for line in journal_tail.lines() {
            println!("{line}");
        }
    }

    if let Some(path) = log_path {
        if !path.exists() {
            eprintln!("Error: Log file {} not found.", path.display());
            return Ok(());
        }

        for line in tail_file(path, lines)? {
            println!("{line}");
        }
    }

    Ok(())
}
