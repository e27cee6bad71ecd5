use chrono::NaiveDate;

use crate::model::task::Task;
use crate::model::vocab::priority_rank;

/// Which tasks the list view shows
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListFilter {
    #[default]
    All,
    /// Due exactly on `today`
    DueToday,
    /// Due on or after `today`
    Upcoming,
    Completed,
    Category(String),
    Priority(String),
    /// Case-insensitive substring over title and description
    Search(String),
}

impl ListFilter {
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            ListFilter::All => true,
            ListFilter::DueToday => task.due_date == Some(today),
            ListFilter::Upcoming => task.due_date.is_some_and(|d| d >= today),
            ListFilter::Completed => task.is_completed(),
            ListFilter::Category(c) => task.category == *c,
            ListFilter::Priority(p) => task.priority == *p,
            ListFilter::Search(query) => matches_query(task, &query.to_lowercase()),
        }
    }

    /// Short description for headings and log lines
    pub fn describe(&self) -> String {
        match self {
            ListFilter::All => "all".to_string(),
            ListFilter::DueToday => "due today".to_string(),
            ListFilter::Upcoming => "upcoming".to_string(),
            ListFilter::Completed => "completed".to_string(),
            ListFilter::Category(c) => format!("category {}", c),
            ListFilter::Priority(p) => format!("priority {}", p),
            ListFilter::Search(q) => format!("search \"{}\"", q),
        }
    }
}

/// `query` must already be lowercased. An empty query matches everything.
fn matches_query(task: &Task, query: &str) -> bool {
    query.is_empty()
        || task.title.to_lowercase().contains(query)
        || task.description.to_lowercase().contains(query)
}

/// Sentinel for tasks without a due date so they sort after every real date
const NO_DUE_DATE: NaiveDate = NaiveDate::MAX;

/// Sort key: incomplete first, then priority rank, then due date
fn sort_key(task: &Task, priorities: &[String]) -> (bool, usize, NaiveDate) {
    (
        task.is_completed(),
        priority_rank(priorities, &task.priority),
        task.due_date.unwrap_or(NO_DUE_DATE),
    )
}

/// Filter and sort tasks for the list view.
///
/// The sort is stable, so ties keep store order.
pub fn list_tasks<'a>(
    tasks: &'a [Task],
    filter: &ListFilter,
    priorities: &[String],
    today: NaiveDate,
) -> Vec<&'a Task> {
    let mut result: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t, today)).collect();
    result.sort_by_key(|t| sort_key(t, priorities));
    result
}

/// Free-text search over title and description, sorted like the list view
pub fn search_tasks<'a>(
    tasks: &'a [Task],
    query: &str,
    priorities: &[String],
    today: NaiveDate,
) -> Vec<&'a Task> {
    list_tasks(tasks, &ListFilter::Search(query.to_string()), priorities, today)
}
