use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::task::{Task, TaskStatus};

/// Format used for `created_at` / `completed_at` in JSON documents
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format used for `due_date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Error converting a JSON task record into a [`Task`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("task title cannot be empty")]
    EmptyTitle,
    #[error("invalid {field} '{value}': expected {expected}")]
    InvalidDate {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Title given to a record whose title is blank when it is repaired
pub const UNTITLED: &str = "Untitled task";

/// The on-disk shape of a task.
///
/// Only `title` is required. Everything else is defaulted so hand-written or
/// older documents still load; an explicit `null` counts as missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        TaskRecord {
            id: Some(task.id),
            completed: Some(task.is_completed()),
            title: Some(task.title),
            description: Some(task.description),
            due_date: task.due_date.map(|d| d.format(DATE_FORMAT).to_string()),
            priority: Some(task.priority),
            category: Some(task.category),
            created_at: Some(format_timestamp(task.created_at)),
            completed_at: task.completed_at.map(format_timestamp),
            status: Some(task.status.as_str().to_string()),
        }
    }
}

/// Parse an optional field; blank means absent, garbage is reported in
/// `problems` and treated as absent.
fn optional_field<T>(
    value: Option<&str>,
    field: &'static str,
    expected: &'static str,
    parse: impl Fn(&str) -> Option<T>,
    problems: &mut Vec<RecordError>,
) -> Option<T> {
    let s = value.map(str::trim).filter(|s| !s.is_empty())?;
    let parsed = parse(s);
    if parsed.is_none() {
        problems.push(RecordError::InvalidDate {
            field,
            value: s.to_string(),
            expected,
        });
    }
    parsed
}

impl TaskRecord {
    /// Convert without failing. A blank title becomes [`UNTITLED`] and
    /// unparseable dates are dropped; each repair is returned as the error
    /// a strict conversion would have raised.
    pub fn into_task_lossy(self) -> (Task, Vec<RecordError>) {
        let mut problems = Vec::new();

        let title = self.title.as_deref().map(str::trim).unwrap_or_default();
        let title = if title.is_empty() {
            problems.push(RecordError::EmptyTitle);
            UNTITLED.to_string()
        } else {
            title.to_string()
        };

        let due_date = optional_field(
            self.due_date.as_deref(),
            "due_date",
            "YYYY-MM-DD",
            parse_date,
            &mut problems,
        );
        let created_at = optional_field(
            self.created_at.as_deref(),
            "created_at",
            "YYYY-MM-DD HH:MM",
            parse_timestamp,
            &mut problems,
        )
        .unwrap_or_else(now_minute);
        let completed_at = optional_field(
            self.completed_at.as_deref(),
            "completed_at",
            "YYYY-MM-DD HH:MM",
            parse_timestamp,
            &mut problems,
        );

        let status = reconcile_status(&title, self.status.as_deref(), self.completed);
        let completed_at = if status == TaskStatus::Done {
            Some(completed_at.unwrap_or(created_at))
        } else {
            None
        };

        let task = Task {
            id: self.id.unwrap_or_default(),
            title,
            description: self.description.unwrap_or_default(),
            due_date,
            priority: self.priority.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            status,
            created_at,
            completed_at,
        };
        (task, problems)
    }
}

impl TryFrom<TaskRecord> for Task {
    type Error = RecordError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let (task, problems) = record.into_task_lossy();
        match problems.into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(task),
        }
    }
}

/// Resolve the stored `status` string against the `completed` flag.
///
/// `completed` wins whenever the two disagree about completion; an
/// unrecognized status falls back to whatever `completed` says.
fn reconcile_status(title: &str, status: Option<&str>, completed: Option<bool>) -> TaskStatus {
    let parsed = status.and_then(TaskStatus::parse_status);
    if status.is_some() && parsed.is_none() {
        tracing::warn!(
            task = title,
            status = status.unwrap_or_default(),
            "unrecognized status, deriving from completion flag"
        );
    }
    match (parsed, completed) {
        (_, Some(true)) => TaskStatus::Done,
        (Some(TaskStatus::Done), Some(false)) => TaskStatus::Todo,
        (Some(s), _) => s,
        (None, _) => TaskStatus::Todo,
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Parse a timestamp in any of the accepted forms, truncated to the minute
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    const FORMATS: [&str; 4] = [
        TIMESTAMP_FORMAT,
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    let parsed = FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Local).naive_local())
        })?;
    Some(truncate_to_minute(parsed))
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Current local time at minute precision, matching what the file stores
pub fn now_minute() -> NaiveDateTime {
    truncate_to_minute(Local::now().naive_local())
}

fn truncate_to_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn minimal_record_gets_defaults() {
        let task: Task = serde_json::from_str(r#"{"title": "Water plants"}"#).unwrap();
        assert_eq!(task.id, 0);
        assert_eq!(task.title, "Water plants");
        assert_eq!(task.description, "");
        assert_eq!(task.due_date, None);
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn empty_title_is_rejected() {
        let err = serde_json::from_str::<Task>(r#"{"title": "   "}"#).unwrap_err();
        assert!(err.to_string().contains("title cannot be empty"));
    }

    #[test]
    fn malformed_due_date_is_rejected() {
        let err = serde_json::from_str::<Task>(r#"{"title": "x", "due_date": "10/01/2024"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid due_date"));
    }

    #[test]
    fn null_fields_count_as_missing() {
        let task: Task = serde_json::from_str(
            r#"{"id": null, "title": "x", "description": null, "due_date": null,
                "priority": null, "category": null, "completed": null, "status": null}"#,
        )
        .unwrap();
        assert_eq!(task.id, 0);
        assert_eq!(task.description, "");
        assert_eq!(task.priority, "");
        assert_eq!(task.due_date, None);
        assert_eq!(task.status, TaskStatus::Todo);
    }

    #[test]
    fn lossy_conversion_repairs_and_reports() {
        let record: TaskRecord = serde_json::from_str(
            r#"{"title": " ", "due_date": "2024/01/11", "created_at": "2024-01-02 09:30"}"#,
        )
        .unwrap();
        let (task, problems) = record.into_task_lossy();
        assert_eq!(task.title, UNTITLED);
        assert_eq!(task.due_date, None);
        assert_eq!(task.created_at, ts("2024-01-02 09:30"));
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0], RecordError::EmptyTitle);
        assert!(problems[1].to_string().contains("invalid due_date '2024/01/11'"));
    }

    #[test]
    fn blank_due_date_means_none() {
        let task: Task = serde_json::from_str(r#"{"title": "x", "due_date": ""}"#).unwrap();
        assert_eq!(task.due_date, None);
    }

    #[test]
    fn completed_flag_overrides_status() {
        let task: Task = serde_json::from_str(
            r#"{"title": "x", "status": "todo", "completed": true, "created_at": "2024-01-02 09:30"}"#,
        )
        .unwrap();
        assert_eq!(task.status, TaskStatus::Done);
        // missing completed_at is filled from created_at
        assert_eq!(task.completed_at, Some(ts("2024-01-02 09:30")));

        let task: Task = serde_json::from_str(
            r#"{"title": "x", "status": "done", "completed": false, "completed_at": "2024-01-02 09:30"}"#,
        )
        .unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn unknown_status_falls_back_to_completion_flag() {
        let task: Task =
            serde_json::from_str(r#"{"title": "x", "status": "blocked", "completed": false}"#)
                .unwrap();
        assert_eq!(task.status, TaskStatus::Todo);

        let task: Task = serde_json::from_str(r#"{"title": "x", "status": "in_progress"}"#).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
    }

    #[test]
    fn serializes_completed_flag_and_formatted_dates() {
        let task = Task {
            id: 7,
            title: "Ship it".into(),
            description: String::new(),
            due_date: parse_date("2024-03-01"),
            priority: "High".into(),
            category: "Work".into(),
            status: TaskStatus::Done,
            created_at: ts("2024-02-01 08:00"),
            completed_at: Some(ts("2024-02-03 17:45")),
        };
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["completed"], true);
        assert_eq!(value["status"], "done");
        assert_eq!(value["due_date"], "2024-03-01");
        assert_eq!(value["created_at"], "2024-02-01 08:00");
        assert_eq!(value["completed_at"], "2024-02-03 17:45");

        let back: Task = serde_json::from_value(value).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn accepts_alternate_timestamp_forms() {
        assert_eq!(parse_timestamp("2024-01-02 09:30:59"), Some(ts("2024-01-02 09:30")));
        assert_eq!(parse_timestamp("2024-01-02T09:30"), Some(ts("2024-01-02 09:30")));
        assert_eq!(parse_timestamp("2024-01-02T09:30:12.5"), Some(ts("2024-01-02 09:30")));
        assert!(parse_timestamp("yesterday").is_none());
    }
}
