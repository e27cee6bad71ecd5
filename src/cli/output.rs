use chrono::NaiveDate;
use serde::Serialize;

use crate::model::activity::ActivityEntry;
use crate::model::record::format_timestamp;
use crate::model::task::{Task, TaskStatus};
use crate::ops::board::Board;
use crate::ops::calendar::CalendarMonth;
use crate::ops::stats::{Breakdown, Statistics};
use crate::util::unicode::{display_width, fit_to_width};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskListJson<'a> {
    pub filter: String,
    pub tasks: Vec<&'a Task>,
}

#[derive(Serialize)]
pub struct BoardJson<'a> {
    pub todo: Vec<&'a Task>,
    pub in_progress: Vec<&'a Task>,
    pub done: Vec<&'a Task>,
}

#[derive(Serialize)]
pub struct CalendarJson {
    pub year: i32,
    pub month: u32,
    pub leading_blanks: u32,
    pub days_in_month: u32,
    pub days: Vec<CalendarDayJson>,
}

#[derive(Serialize)]
pub struct CalendarDayJson {
    pub date: String,
    pub due: usize,
}

#[derive(Serialize)]
pub struct StatsJson {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub completion_rate: f64,
    pub by_priority: Vec<BreakdownJson>,
    pub by_category: Vec<BreakdownJson>,
}

#[derive(Serialize)]
pub struct BreakdownJson {
    pub label: String,
    pub completed: usize,
    pub total: usize,
    pub rate: f64,
}

#[derive(Serialize)]
pub struct ActivityJson {
    pub timestamp: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct IdJson {
    pub id: u64,
}

#[derive(Serialize)]
pub struct ImportJson {
    pub imported: usize,
    pub ids: Vec<u64>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn board_to_json<'a>(board: &Board<'a>) -> BoardJson<'a> {
    BoardJson {
        todo: board.todo.clone(),
        in_progress: board.in_progress.clone(),
        done: board.done.clone(),
    }
}

pub fn calendar_to_json(cal: &CalendarMonth) -> CalendarJson {
    let days = (1..=cal.days_in_month)
        .filter_map(|day| {
            NaiveDate::from_ymd_opt(cal.year, cal.month, day).map(|date| CalendarDayJson {
                date: date.to_string(),
                due: cal.due_on(day),
            })
        })
        .collect();
    CalendarJson {
        year: cal.year,
        month: cal.month,
        leading_blanks: cal.leading_blanks,
        days_in_month: cal.days_in_month,
        days,
    }
}

fn breakdowns_to_json<'a>(
    entries: impl Iterator<Item = (&'a String, &'a Breakdown)>,
) -> Vec<BreakdownJson> {
    entries
        .map(|(label, b)| BreakdownJson {
            label: label.clone(),
            completed: b.completed,
            total: b.total,
            rate: b.rate(),
        })
        .collect()
}

pub fn stats_to_json(stats: &Statistics) -> StatsJson {
    StatsJson {
        total: stats.overall.total,
        completed: stats.overall.completed,
        pending: stats.overall.pending(),
        completion_rate: stats.completion_rate(),
        by_priority: breakdowns_to_json(stats.by_priority.iter()),
        by_category: breakdowns_to_json(stats.by_category.iter()),
    }
}

pub fn activity_to_json(entry: &ActivityEntry) -> ActivityJson {
    ActivityJson {
        timestamp: format_timestamp(entry.timestamp),
        message: entry.message.clone(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn status_char(status: TaskStatus) -> char {
    match status {
        TaskStatus::Todo => ' ',
        TaskStatus::InProgress => '>',
        TaskStatus::Done => 'x',
    }
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task) -> String {
    let due_str = task
        .due_date
        .map(|d| format!(" due {}", d))
        .unwrap_or_default();
    format!(
        "[{}] {} {} ({}, {}){}",
        status_char(task.status),
        task.id,
        task.title,
        task.priority,
        task.category,
        due_str
    )
}

/// Format detailed task view
pub fn format_task_detail(task: &Task) -> Vec<String> {
    let mut lines = vec![
        format!("[{}] {} {}", status_char(task.status), task.id, task.title),
        format!("status: {}", task.status.heading()),
        format!("priority: {}", task.priority),
        format!("category: {}", task.category),
    ];
    if let Some(due) = task.due_date {
        lines.push(format!("due: {}", due));
    }
    lines.push(format!("created: {}", format_timestamp(task.created_at)));
    if let Some(done) = task.completed_at {
        lines.push(format!("completed: {}", format_timestamp(done)));
    }
    if !task.description.is_empty() {
        lines.push("description:".to_string());
        for line in task.description.lines() {
            lines.push(format!("  {}", line));
        }
    }
    lines
}

/// Gap between board columns
const COLUMN_GAP: &str = "  ";

/// Format the board as three side-by-side columns of `width` cells each
pub fn format_board(board: &Board<'_>, width: usize) -> Vec<String> {
    let columns: Vec<(TaskStatus, &[&Task])> = board.columns().collect();
    let join = |cells: Vec<String>| cells.join(COLUMN_GAP).trim_end().to_string();

    let mut lines = Vec::new();
    lines.push(join(
        columns
            .iter()
            .map(|(status, tasks)| fit_to_width(&format!("{} ({})", status.heading(), tasks.len()), width))
            .collect(),
    ));
    lines.push(join(columns.iter().map(|_| "-".repeat(width)).collect()));

    let rows = columns.iter().map(|(_, tasks)| tasks.len()).max().unwrap_or(0);
    for row in 0..rows {
        lines.push(join(
            columns
                .iter()
                .map(|(_, tasks)| match tasks.get(row) {
                    Some(task) => fit_to_width(&format!("{} {}", task.id, task.title), width),
                    None => " ".repeat(width),
                })
                .collect(),
        ));
    }
    lines
}

const WEEKDAY_HEADER: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// Format the month grid. Days with tasks due carry a `*`.
pub fn format_calendar(cal: &CalendarMonth) -> Vec<String> {
    let mut lines = Vec::new();
    let title = cal
        .first_day()
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|| format!("{}-{:02}", cal.year, cal.month));
    lines.push(title);
    lines.push(WEEKDAY_HEADER.join("  "));

    for week in cal.weeks() {
        let cells: Vec<String> = week
            .iter()
            .map(|cell| match cell {
                Some(c) => format!("{:>2}{}", c.day, if c.due > 0 { '*' } else { ' ' }),
                None => "   ".to_string(),
            })
            .collect();
        lines.push(cells.join(" ").trim_end().to_string());
    }

    let total = cal.total_due();
    lines.push(String::new());
    lines.push(match total {
        0 => "no tasks due".to_string(),
        1 => "1 task due".to_string(),
        n => format!("{} tasks due", n),
    });
    lines
}

fn format_breakdown_section(heading: &str, entries: &indexmap::IndexMap<String, Breakdown>) -> Vec<String> {
    let label_width = entries.keys().map(|l| display_width(l)).max().unwrap_or(0);
    let mut lines = vec![format!("{}:", heading)];
    for (label, b) in entries {
        lines.push(format!(
            "  {}  {}/{}  {:.0}%",
            fit_to_width(label, label_width),
            b.completed,
            b.total,
            b.rate()
        ));
    }
    lines
}

/// Format the progress view
pub fn format_stats(stats: &Statistics) -> Vec<String> {
    let mut lines = vec![
        format!(
            "completed: {}/{} ({:.0}%)",
            stats.overall.completed,
            stats.overall.total,
            stats.completion_rate()
        ),
        format!("pending: {}", stats.overall.pending()),
        String::new(),
    ];
    lines.extend(format_breakdown_section("by priority", &stats.by_priority));
    lines.push(String::new());
    lines.extend(format_breakdown_section("by category", &stats.by_category));
    lines
}

/// Format a vocabulary listing, numbered from 1
pub fn format_vocab(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| format!("{}. {}", i + 1, label))
        .collect()
}
