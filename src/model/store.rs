use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::activity::ActivityEntry;
use super::task::Task;
use super::vocab::{
    DEFAULT_CATEGORY, DEFAULT_PRIORITY, default_categories, default_colors, default_priorities,
    pick_default,
};

/// Preferred labels for new tasks, usually taken from the config file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDefaults {
    pub priority: Option<String>,
    pub category: Option<String>,
}

/// The whole in-memory state: tasks, vocabularies and theme.
///
/// This is also the shape of the persisted data file. Activity entries are
/// kept in memory only until the caller drains them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStore {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default = "default_priorities")]
    pub priorities: Vec<String>,
    #[serde(default = "default_colors")]
    pub colors: IndexMap<String, String>,
    /// Next id to hand out. Never lowered, so ids are not reused.
    #[serde(default)]
    pub next_id: u64,
    #[serde(skip)]
    pub defaults: TaskDefaults,
    #[serde(skip)]
    activity: Vec<ActivityEntry>,
}

impl Default for TaskStore {
    fn default() -> Self {
        TaskStore {
            tasks: Vec::new(),
            categories: default_categories(),
            priorities: default_priorities(),
            colors: default_colors(),
            next_id: 1,
            defaults: TaskDefaults::default(),
            activity: Vec::new(),
        }
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn find_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn max_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0)
    }

    /// Hand out the next id and advance the counter
    pub fn allocate_id(&mut self) -> u64 {
        let floor = self.max_id() + 1;
        if self.next_id < floor {
            self.next_id = floor;
        }
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Priority label for a task created without one
    pub fn default_priority(&self) -> String {
        let preferred = self.defaults.priority.as_deref().unwrap_or(DEFAULT_PRIORITY);
        pick_default(&self.priorities, preferred)
            .unwrap_or(preferred)
            .to_string()
    }

    /// Category label for a task created without one
    pub fn default_category(&self) -> String {
        let preferred = self.defaults.category.as_deref().unwrap_or(DEFAULT_CATEGORY);
        pick_default(&self.categories, preferred)
            .unwrap_or(preferred)
            .to_string()
    }

    /// Restore the store invariants after reading a document: unique non-zero
    /// ids, a counter above every id, non-empty vocabularies and labels.
    pub fn normalize(&mut self) {
        if self.priorities.is_empty() {
            self.priorities = default_priorities();
        }
        if self.categories.is_empty() {
            self.categories = default_categories();
        }
        for (key, value) in default_colors() {
            self.colors.entry(key).or_insert(value);
        }

        let mut seen = HashSet::new();
        let mut needs_id = Vec::new();
        for (i, task) in self.tasks.iter().enumerate() {
            if task.id == 0 || !seen.insert(task.id) {
                needs_id.push(i);
            }
        }
        if self.next_id <= self.max_id() {
            self.next_id = self.max_id() + 1;
        }
        for i in needs_id {
            let id = self.allocate_id();
            tracing::debug!(old = self.tasks[i].id, new = id, "reassigned task id");
            self.tasks[i].id = id;
        }

        let priority = self.default_priority();
        let category = self.default_category();
        for task in &mut self.tasks {
            if task.priority.trim().is_empty() {
                task.priority = priority.clone();
            }
            if task.category.trim().is_empty() {
                task.category = category.clone();
            }
        }
    }

    /// Record an activity entry for the presentation layer
    pub fn log(&mut self, message: impl Into<String>) {
        let entry = ActivityEntry::now(message);
        tracing::info!(activity = %entry.message);
        self.activity.push(entry);
    }

    /// Entries recorded since the last drain, oldest first
    pub fn activity(&self) -> &[ActivityEntry] {
        &self.activity
    }

    pub fn take_activity(&mut self) -> Vec<ActivityEntry> {
        std::mem::take(&mut self.activity)
    }
}
