use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::store::TaskStore;
use crate::model::task::Task;

/// Version written into backup documents
pub const BACKUP_VERSION: u64 = 1;

/// Error type for export/import/backup documents
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array of tasks")]
    NotAnArray,
    #[error("entry {index} is not an object")]
    NotAnObject { index: usize },
    #[error("entry {index} has no title")]
    MissingTitle { index: usize },
    #[error("entry {index}: {source}")]
    InvalidTask {
        index: usize,
        source: serde_json::Error,
    },
    #[error("backup must be a JSON object with a 'tasks' array")]
    NotABackup,
    #[error("unsupported backup version {0} (newest supported is {max})", max = BACKUP_VERSION)]
    UnsupportedVersion(u64),
}

/// Result of an import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    /// Ids given to the imported tasks, in document order
    pub assigned_ids: Vec<u64>,
}

#[derive(Serialize)]
struct BackupOut<'a> {
    tasks: &'a [Task],
    categories: &'a [String],
    priorities: &'a [String],
    colors: &'a IndexMap<String, String>,
    version: u64,
}

#[derive(Deserialize)]
struct BackupIn {
    tasks: Value,
    #[serde(default)]
    categories: Option<Vec<String>>,
    #[serde(default)]
    priorities: Option<Vec<String>>,
    #[serde(default)]
    colors: Option<IndexMap<String, String>>,
    #[serde(default)]
    version: Option<u64>,
}

// ---------------------------------------------------------------------------
// Export / import
// ---------------------------------------------------------------------------

/// Serialize tasks as a pretty-printed JSON array (two-space indent)
pub fn export_tasks(tasks: &[Task]) -> Result<String, TransferError> {
    Ok(serde_json::to_string_pretty(tasks)?)
}

/// Validate a JSON array of task objects. Every entry is checked before
/// anything is returned.
pub fn parse_task_array(value: Value) -> Result<Vec<Task>, TransferError> {
    let Value::Array(entries) = value else {
        return Err(TransferError::NotAnArray);
    };
    let mut tasks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let Value::Object(ref map) = entry else {
            return Err(TransferError::NotAnObject { index });
        };
        if !map.get("title").is_some_and(Value::is_string) {
            return Err(TransferError::MissingTitle { index });
        }
        let task: Task = serde_json::from_value(entry)
            .map_err(|source| TransferError::InvalidTask { index, source })?;
        tasks.push(task);
    }
    Ok(tasks)
}

/// Merge an exported document into the store. Imported tasks get fresh ids
/// above every existing one; nothing is merged if any entry is invalid.
pub fn import_tasks(store: &mut TaskStore, document: &str) -> Result<ImportResult, TransferError> {
    let value: Value = serde_json::from_str(document)?;
    let tasks = parse_task_array(value)?;

    let priority = store.default_priority();
    let category = store.default_category();
    let mut assigned_ids = Vec::with_capacity(tasks.len());
    for mut task in tasks {
        task.id = store.allocate_id();
        if task.priority.trim().is_empty() {
            task.priority = priority.clone();
        }
        if task.category.trim().is_empty() {
            task.category = category.clone();
        }
        assigned_ids.push(task.id);
        store.tasks.push(task);
    }
    tracing::info!(count = assigned_ids.len(), "imported tasks");
    store.log(format!("Imported {} tasks", assigned_ids.len()));
    Ok(ImportResult { assigned_ids })
}

// ---------------------------------------------------------------------------
// Backup / restore
// ---------------------------------------------------------------------------

/// Serialize the whole store (tasks, vocabularies, theme) with a version tag
pub fn backup_document(store: &TaskStore) -> Result<String, TransferError> {
    let out = BackupOut {
        tasks: &store.tasks,
        categories: &store.categories,
        priorities: &store.priorities,
        colors: &store.colors,
        version: BACKUP_VERSION,
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

/// Replace the store with the contents of a backup. The store is untouched
/// on error. Missing vocabularies or theme fall back to defaults.
pub fn restore_backup(store: &mut TaskStore, document: &str) -> Result<usize, TransferError> {
    let value: Value = serde_json::from_str(document)?;
    if !value.get("tasks").is_some_and(Value::is_array) {
        return Err(TransferError::NotABackup);
    }
    let backup: BackupIn = serde_json::from_value(value)?;
    let version = backup.version.unwrap_or(BACKUP_VERSION);
    if version > BACKUP_VERSION {
        return Err(TransferError::UnsupportedVersion(version));
    }
    let tasks = parse_task_array(backup.tasks)?;

    let mut restored = TaskStore::default();
    restored.tasks = tasks;
    restored.next_id = 0;
    restored.defaults = store.defaults.clone();
    if let Some(categories) = backup.categories {
        restored.categories = categories;
    }
    if let Some(priorities) = backup.priorities {
        restored.priorities = priorities;
    }
    if let Some(colors) = backup.colors {
        restored.colors = colors;
    }
    restored.normalize();

    let count = restored.tasks.len();
    store.tasks = restored.tasks;
    store.categories = restored.categories;
    store.priorities = restored.priorities;
    store.colors = restored.colors;
    store.next_id = restored.next_id;
    tracing::info!(count, version, "restored backup");
    store.log("Restored backup");
    Ok(count)
}
