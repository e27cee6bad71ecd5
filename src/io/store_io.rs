use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::model::record::TaskRecord;
use crate::model::store::{TaskDefaults, TaskStore};
use crate::ops::transfer::{self, ImportResult, TransferError};

/// Error type for data file and document I/O
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{path}: {source}")]
    Document {
        path: PathBuf,
        source: TransferError,
    },
    #[error("could not serialize data: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Name of the data file inside the data directory
pub const DATA_FILE_NAME: &str = "tasks.json";

/// Default data file path, respecting XDG_DATA_HOME
pub fn default_data_path() -> PathBuf {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| crate::io::home_dir().join(".local").join("share"));
    data_dir.join("taskdesk").join(DATA_FILE_NAME)
}

// ---------------------------------------------------------------------------
// Atomic file write
// ---------------------------------------------------------------------------

/// Write `content` to `path` atomically using a temp file + rename.
/// Creates the parent directory if needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn read_text(path: &Path) -> Result<String, PersistenceError> {
    fs::read_to_string(path).map_err(|e| PersistenceError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_text(path: &Path, content: &str) -> Result<(), PersistenceError> {
    atomic_write(path, content.as_bytes()).map_err(|e| PersistenceError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Data file
// ---------------------------------------------------------------------------

/// A data file as it was read
#[derive(Debug)]
pub struct LoadedStore {
    pub store: TaskStore,
    /// Task records that had to be repaired or were skipped
    pub repaired: usize,
    /// The file exists but could not be read at all
    pub unreadable: bool,
}

impl LoadedStore {
    /// Saving this store over the file would lose something the file holds
    pub fn is_lossy(&self) -> bool {
        self.unreadable || self.repaired > 0
    }
}

fn empty_store(defaults: TaskDefaults) -> TaskStore {
    let mut store = TaskStore::new();
    store.defaults = defaults;
    store
}

/// Parse the data file document. The document shape is strict; task
/// records are read one by one so a bad record cannot take the others with it.
fn parse_store(text: &str, defaults: TaskDefaults) -> Result<LoadedStore, serde_json::Error> {
    let mut doc: Value = serde_json::from_str(text)?;
    let records = doc
        .as_object_mut()
        .and_then(|map| map.remove("tasks"))
        .unwrap_or(Value::Null);
    let records: Vec<Value> = match records {
        Value::Null => Vec::new(),
        other => serde_json::from_value(other)?,
    };
    let mut store: TaskStore = serde_json::from_value(doc)?;

    let mut repaired = 0;
    for (index, value) in records.into_iter().enumerate() {
        match serde_json::from_value::<TaskRecord>(value) {
            Ok(record) => {
                let (task, problems) = record.into_task_lossy();
                for problem in &problems {
                    tracing::warn!(index, id = task.id, problem = %problem, "repaired task record");
                }
                if !problems.is_empty() {
                    repaired += 1;
                }
                store.tasks.push(task);
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping unreadable task record");
                repaired += 1;
            }
        }
    }

    store.defaults = defaults;
    store.normalize();
    Ok(LoadedStore {
        store,
        repaired,
        unreadable: false,
    })
}

/// Read the data file, returning the typed error when the document itself
/// is unreadable. A missing file is an empty store, not an error.
pub fn read_store(path: &Path, defaults: TaskDefaults) -> Result<LoadedStore, PersistenceError> {
    if !path.exists() {
        return Ok(LoadedStore {
            store: empty_store(defaults),
            repaired: 0,
            unreadable: false,
        });
    }
    let text = read_text(path)?;
    let loaded = parse_store(&text, defaults).map_err(|e| PersistenceError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(
        path = %path.display(),
        tasks = loaded.store.tasks.len(),
        repaired = loaded.repaired,
        "loaded data file"
    );
    Ok(loaded)
}

/// Strict load: the typed error on any document-level failure
pub fn try_load_store(path: &Path, defaults: TaskDefaults) -> Result<TaskStore, PersistenceError> {
    read_store(path, defaults).map(|loaded| loaded.store)
}

/// Read the data file, falling back to an empty default store on any
/// read or parse failure. The result says whether the fallback happened.
pub fn open_store(path: &Path, defaults: TaskDefaults) -> LoadedStore {
    match read_store(path, defaults.clone()) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::warn!(error = %e, "could not load data file, starting from defaults");
            LoadedStore {
                store: empty_store(defaults),
                repaired: 0,
                unreadable: true,
            }
        }
    }
}

/// Load the data file, falling back to an empty default store on any
/// read or parse failure.
pub fn load_store(path: &Path, defaults: TaskDefaults) -> TaskStore {
    open_store(path, defaults).store
}

/// Move a damaged data file out of the way, to `<name>.corrupt` or the first
/// free `<name>.corrupt.N`. Returns where it went.
pub fn set_aside(path: &Path) -> Result<PathBuf, PersistenceError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DATA_FILE_NAME.to_string());
    let mut target = path.with_file_name(format!("{}.corrupt", name));
    let mut n = 1;
    while target.exists() {
        target = path.with_file_name(format!("{}.corrupt.{}", name, n));
        n += 1;
    }
    fs::rename(path, &target).map_err(|e| PersistenceError::WriteError {
        path: target.clone(),
        source: e,
    })?;
    tracing::warn!(from = %path.display(), to = %target.display(), "kept damaged data file");
    Ok(target)
}

/// Save the whole store (tasks, vocabularies, theme, id counter)
pub fn save_store(path: &Path, store: &TaskStore) -> Result<(), PersistenceError> {
    let content = serde_json::to_string_pretty(store)?;
    write_text(path, &content)?;
    tracing::debug!(path = %path.display(), tasks = store.tasks.len(), "saved data file");
    Ok(())
}

// ---------------------------------------------------------------------------
// Export / import / backup / restore files
// ---------------------------------------------------------------------------

fn document_error(path: &Path, source: TransferError) -> PersistenceError {
    PersistenceError::Document {
        path: path.to_path_buf(),
        source,
    }
}

pub fn export_to_file(path: &Path, store: &TaskStore) -> Result<usize, PersistenceError> {
    let doc = transfer::export_tasks(&store.tasks).map_err(|e| document_error(path, e))?;
    write_text(path, &doc)?;
    Ok(store.tasks.len())
}

pub fn import_from_file(path: &Path, store: &mut TaskStore) -> Result<ImportResult, PersistenceError> {
    let doc = read_text(path)?;
    transfer::import_tasks(store, &doc).map_err(|e| document_error(path, e))
}

pub fn backup_to_file(path: &Path, store: &TaskStore) -> Result<(), PersistenceError> {
    let doc = transfer::backup_document(store).map_err(|e| document_error(path, e))?;
    write_text(path, &doc)
}

pub fn restore_from_file(path: &Path, store: &mut TaskStore) -> Result<usize, PersistenceError> {
    let doc = read_text(path)?;
    transfer::restore_backup(store, &doc).map_err(|e| document_error(path, e))
}
