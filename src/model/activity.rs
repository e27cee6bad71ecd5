use std::fmt;

use chrono::NaiveDateTime;

use super::record::{TIMESTAMP_FORMAT, now_minute, parse_timestamp};

/// A human-readable record of one mutation, for the activity panel / log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub timestamp: NaiveDateTime,
    pub message: String,
}

impl ActivityEntry {
    pub fn now(message: impl Into<String>) -> Self {
        ActivityEntry {
            timestamp: now_minute(),
            message: message.into(),
        }
    }

    /// Parse a line written by the `Display` impl: `[YYYY-MM-DD HH:MM] message`
    pub fn parse_line(line: &str) -> Option<Self> {
        let rest = line.strip_prefix('[')?;
        let (stamp, message) = rest.split_once("] ")?;
        Some(ActivityEntry {
            timestamp: parse_timestamp(stamp)?,
            message: message.to_string(),
        })
    }
}

impl fmt::Display for ActivityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.message
        )
    }
}
