use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::record::TaskRecord;

/// Board column a task lives in. `Done` is the only completed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// All statuses in board column order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// The wire name (`todo`, `in_progress`, `done`)
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }

    /// Parse a wire name. Accepts `-` in place of `_`.
    pub fn parse_status(s: &str) -> Option<TaskStatus> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "todo" => Some(TaskStatus::Todo),
            "in_progress" => Some(TaskStatus::InProgress),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }

    /// Column heading used by the board view
    pub fn heading(self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single to-do item.
///
/// `status` is the source of truth for completion; `completed` only exists in
/// the JSON form (see [`crate::model::record`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "TaskRecord", try_from = "TaskRecord")]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub priority: String,
    pub category: String,
    pub status: TaskStatus,
    pub created_at: NaiveDateTime,
    /// Set iff `status == Done`
    pub completed_at: Option<NaiveDateTime>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

/// Fields for a task about to be added. Missing priority/category fall back
/// to the store defaults.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<String>,
    pub category: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// A partial update to an existing task. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` clears the due date
    pub due_date: Option<Option<NaiveDate>>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub status: Option<TaskStatus>,
    /// Ignored when `status` is also given
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.status.is_none()
            && self.completed.is_none()
    }

    /// The status this patch asks for, if any
    pub fn target_status(&self) -> Option<TaskStatus> {
        self.status.or(self.completed.map(|c| {
            if c {
                TaskStatus::Done
            } else {
                TaskStatus::Todo
            }
        }))
    }
}
