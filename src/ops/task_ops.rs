use chrono::NaiveDate;

use crate::model::record::{now_minute, parse_date};
use crate::model::store::TaskStore;
use crate::model::task::{NewTask, Task, TaskPatch, TaskStatus};
use crate::model::vocab::{default_categories, default_priorities};

/// Error type for task operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    #[error("task title cannot be empty")]
    EmptyTitle,
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("task not found: {0}")]
    NotFound(u64),
}

impl TaskError {
    /// Validation errors are the user's to correct; not-found means a stale id
    pub fn is_validation(&self) -> bool {
        matches!(self, TaskError::EmptyTitle | TaskError::InvalidDate(_))
    }
}

/// Parse a user-supplied due date. Blank input means "no due date".
pub fn parse_due_date(input: &str) -> Result<Option<NaiveDate>, TaskError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_date(trimmed)
        .map(Some)
        .ok_or_else(|| TaskError::InvalidDate(trimmed.to_string()))
}

// ---------------------------------------------------------------------------
// State transitions
// ---------------------------------------------------------------------------

/// Direct status set. Keeps `completed_at` in step with entering or leaving
/// `Done`.
pub fn set_status(task: &mut Task, new_status: TaskStatus) {
    if task.status == new_status {
        return;
    }
    let was_done = task.is_completed();
    task.status = new_status;

    if new_status == TaskStatus::Done {
        task.completed_at = Some(now_minute());
    } else if was_done {
        task.completed_at = None;
    }
}

/// Flip completion: done → todo, anything else → done.
/// Returns the new completion state.
pub fn toggle_completion(store: &mut TaskStore, id: u64) -> Result<bool, TaskError> {
    let task = store.find_mut(id).ok_or(TaskError::NotFound(id))?;
    let target = if task.is_completed() {
        TaskStatus::Todo
    } else {
        TaskStatus::Done
    };
    set_status(task, target);
    let completed = task.is_completed();
    let message = if completed {
        format!("Completed task: {}", task.title)
    } else {
        format!("Marked incomplete task: {}", task.title)
    };
    store.log(message);
    Ok(completed)
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// Add a task and return its id. The store is untouched on error.
pub fn add_task(store: &mut TaskStore, new: NewTask) -> Result<u64, TaskError> {
    let title = new.title.trim().to_string();
    if title.is_empty() {
        return Err(TaskError::EmptyTitle);
    }

    let priority = new
        .priority
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| store.default_priority());
    let category = new
        .category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| store.default_category());

    let id = store.allocate_id();
    store.tasks.push(Task {
        id,
        title: title.clone(),
        description: new.description,
        due_date: new.due_date,
        priority,
        category,
        status: TaskStatus::Todo,
        created_at: now_minute(),
        completed_at: None,
    });
    store.log(format!("Added task: {}", title));
    Ok(id)
}

/// Apply a partial update. Validation happens before any field changes.
pub fn edit_task(store: &mut TaskStore, id: u64, patch: TaskPatch) -> Result<(), TaskError> {
    let title = match patch.title.as_deref().map(str::trim) {
        Some("") => return Err(TaskError::EmptyTitle),
        Some(t) => Some(t.to_string()),
        None => None,
    };
    let target_status = patch.target_status();
    // Blank labels fall back to the defaults, as in `add_task`
    let priority = patch.priority.map(|p| {
        if p.trim().is_empty() {
            store.default_priority()
        } else {
            p
        }
    });
    let category = patch.category.map(|c| {
        if c.trim().is_empty() {
            store.default_category()
        } else {
            c
        }
    });

    let task = store.find_mut(id).ok_or(TaskError::NotFound(id))?;
    if let Some(title) = title {
        task.title = title;
    }
    if let Some(description) = patch.description {
        task.description = description;
    }
    if let Some(due_date) = patch.due_date {
        task.due_date = due_date;
    }
    if let Some(priority) = priority {
        task.priority = priority;
    }
    if let Some(category) = category {
        task.category = category;
    }
    if let Some(status) = target_status {
        set_status(task, status);
    }
    let message = format!("Updated task: {}", task.title);
    store.log(message);
    Ok(())
}

/// Permanently remove a task, returning it
pub fn delete_task(store: &mut TaskStore, id: u64) -> Result<Task, TaskError> {
    let pos = store
        .tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or(TaskError::NotFound(id))?;
    let task = store.tasks.remove(pos);
    store.log(format!("Deleted task: {}", task.title));
    Ok(task)
}

/// Drop every task and restore the default vocabularies. The theme is kept.
pub fn reset(store: &mut TaskStore) -> usize {
    let removed = store.tasks.len();
    store.tasks.clear();
    store.categories = default_categories();
    store.priorities = default_priorities();
    store.next_id = 1;
    store.log("Reset all data");
    removed
}
