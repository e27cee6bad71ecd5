use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "td", about = concat!("taskdesk v", env!("CARGO_PKG_VERSION"), " - tasks as a list, a board, a calendar"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data file
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task
    Add(AddArgs),
    /// Edit fields of a task
    Edit(EditArgs),
    /// Permanently delete a task
    Delete(IdArg),
    /// Toggle a task between done and todo
    Toggle(IdArg),
    /// Show one task
    Show(IdArg),
    /// List tasks (incomplete first, then by priority and due date).
    /// This is also what `td` with no command shows.
    List(ListArgs),
    /// Search titles and descriptions
    Search(SearchArgs),
    /// Show tasks grouped by status
    Board,
    /// Show a month grid of due dates
    Calendar(CalendarArgs),
    /// Show completion statistics
    Stats,
    /// Export tasks to a JSON file
    Export(PathArg),
    /// Import tasks from a JSON file exported earlier
    Import(PathArg),
    /// Back up tasks, vocabularies and theme
    Backup(PathArg),
    /// Replace all data with a backup
    Restore(PathArg),
    /// Delete all tasks and restore default vocabularies
    Reset(ResetArgs),
    /// List or edit categories
    Category(VocabCmd),
    /// List or edit priorities (order sets sort rank)
    Priority(VocabCmd),
    /// List or edit theme colors
    Theme(ThemeCmd),
    /// Show recent activity
    Log(LogArgs),
    /// Show or edit the config file
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct IdArg {
    /// Task ID
    pub id: u64,
}

#[derive(Args)]
pub struct PathArg {
    /// File path
    pub path: PathBuf,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Longer description
    #[arg(short, long, default_value = "")]
    pub description: String,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    /// Priority label (default from config, else Medium)
    #[arg(short, long)]
    pub priority: Option<String>,
    /// Category label (default from config, else Work)
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Args)]
#[command(group(ArgGroup::new("due_change").args(["due", "clear_due"])))]
pub struct EditArgs {
    /// Task ID
    pub id: u64,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New description
    #[arg(short, long)]
    pub description: Option<String>,
    /// New due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    /// Remove the due date
    #[arg(long)]
    pub clear_due: bool,
    /// New priority label
    #[arg(short, long)]
    pub priority: Option<String>,
    /// New category label
    #[arg(short, long)]
    pub category: Option<String>,
    /// New status (todo, in_progress, done)
    #[arg(short, long)]
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// View args
// ---------------------------------------------------------------------------

#[derive(Args, Default)]
#[command(group(ArgGroup::new("filter").args(["today", "upcoming", "completed", "category", "priority", "search"])))]
pub struct ListArgs {
    /// Only tasks due today
    #[arg(long)]
    pub today: bool,
    /// Only tasks due today or later
    #[arg(long)]
    pub upcoming: bool,
    /// Only completed tasks
    #[arg(long)]
    pub completed: bool,
    /// Only tasks in this category
    #[arg(long)]
    pub category: Option<String>,
    /// Only tasks with this priority
    #[arg(long)]
    pub priority: Option<String>,
    /// Only tasks whose title or description contains this text
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Text to look for (case-insensitive)
    pub query: String,
}

#[derive(Args)]
#[command(group(ArgGroup::new("step").args(["prev", "next"])))]
pub struct CalendarArgs {
    /// Month to show (YYYY-MM, default: current month)
    #[arg(long)]
    pub month: Option<String>,
    /// Show the month before
    #[arg(long)]
    pub prev: bool,
    /// Show the month after
    #[arg(long)]
    pub next: bool,
}

// ---------------------------------------------------------------------------
// Maintenance args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ResetArgs {
    /// Confirm that all tasks should be deleted
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct VocabCmd {
    #[command(subcommand)]
    pub action: Option<VocabAction>,
}

#[derive(Subcommand)]
pub enum VocabAction {
    /// Append a label
    Add(LabelArg),
    /// Remove a label
    Rm(LabelArg),
    /// Move a label to a 1-based position
    Mv(LabelMoveArgs),
}

#[derive(Args)]
pub struct LabelArg {
    /// Label text
    pub label: String,
}

#[derive(Args)]
pub struct LabelMoveArgs {
    /// Label text
    pub label: String,
    /// New position (1 = first)
    pub position: usize,
}

#[derive(Args)]
pub struct ThemeCmd {
    #[command(subcommand)]
    pub action: Option<ThemeAction>,
}

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Set a color (#rgb or #rrggbb)
    Set(ThemeSetArgs),
}

#[derive(Args)]
pub struct ThemeSetArgs {
    /// Color key, e.g. accent_light
    pub key: String,
    /// Color value
    pub value: String,
}

#[derive(Args)]
pub struct LogArgs {
    /// Maximum number of entries to show
    #[arg(long, default_value = "20")]
    pub limit: usize,
}

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set a config key (data_file, defaults.priority, defaults.category, log.level)
    Set(ConfigSetArgs),
    /// Print the path to the config file
    Path,
}

#[derive(Args)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}
