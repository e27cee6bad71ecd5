use indexmap::IndexMap;

use crate::model::task::Task;

/// Completed vs. total for one slice of tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Breakdown {
    pub completed: usize,
    pub total: usize,
}

impl Breakdown {
    /// Completion percentage, 0 for an empty slice
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }

    pub fn pending(&self) -> usize {
        self.total - self.completed
    }

    fn count(&mut self, task: &Task) {
        self.total += 1;
        if task.is_completed() {
            self.completed += 1;
        }
    }
}

/// The progress view
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub overall: Breakdown,
    pub by_priority: IndexMap<String, Breakdown>,
    pub by_category: IndexMap<String, Breakdown>,
}

impl Statistics {
    pub fn completion_rate(&self) -> f64 {
        self.overall.rate()
    }
}

/// Seed a breakdown map with every vocabulary label so empty labels still show
fn seeded(vocab: &[String]) -> IndexMap<String, Breakdown> {
    vocab
        .iter()
        .map(|label| (label.clone(), Breakdown::default()))
        .collect()
}

/// Compute overall and per-label completion. Labels follow vocabulary order;
/// labels used by tasks but missing from the vocabulary come after.
pub fn statistics(tasks: &[Task], priorities: &[String], categories: &[String]) -> Statistics {
    let mut overall = Breakdown::default();
    let mut by_priority = seeded(priorities);
    let mut by_category = seeded(categories);

    for task in tasks {
        overall.count(task);
        by_priority
            .entry(task.priority.clone())
            .or_default()
            .count(task);
        by_category
            .entry(task.category.clone())
            .or_default()
            .count(task);
    }

    Statistics {
        overall,
        by_priority,
        by_category,
    }
}
