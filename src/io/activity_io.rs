use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::model::activity::ActivityEntry;

/// Maximum size of the activity log before it is trimmed (256 KB).
const MAX_LOG_SIZE: u64 = 262_144;

/// Lines kept when the log is trimmed
const KEEP_LINES: usize = 1_000;

/// The activity log lives next to the data file
pub fn activity_log_path(data_file: &Path) -> PathBuf {
    data_file.with_file_name("activity.log")
}

/// Append entries to the log. Errors are logged, never returned: a failed
/// audit write must not fail the operation that produced it.
pub fn log_activity(path: &Path, entries: &[ActivityEntry]) {
    if entries.is_empty() {
        return;
    }
    if let Err(e) = append_entries(path, entries) {
        tracing::warn!(path = %path.display(), error = %e, "could not write activity log");
    }
}

fn append_entries(path: &Path, entries: &[ActivityEntry]) -> io::Result<()> {
    if let Ok(meta) = fs::metadata(path)
        && meta.len() > MAX_LOG_SIZE
    {
        trim_log(path)?;
    }
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for entry in entries {
        writeln!(file, "{}", entry)?;
    }
    Ok(())
}

/// Keep only the newest `KEEP_LINES` lines
fn trim_log(path: &Path) -> io::Result<()> {
    let content = fs::read_to_string(path)?;
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(KEEP_LINES);
    let mut trimmed = lines[start..].join("\n");
    trimmed.push('\n');
    crate::io::store_io::atomic_write(path, trimmed.as_bytes())
}

/// Read the newest `limit` entries, oldest first. Unparseable lines are
/// skipped; a missing log is empty.
pub fn read_recent(path: &Path, limit: usize) -> Vec<ActivityEntry> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };
    let entries: Vec<ActivityEntry> = content.lines().filter_map(ActivityEntry::parse_line).collect();
    let start = entries.len().saturating_sub(limit);
    entries[start..].to_vec()
}
