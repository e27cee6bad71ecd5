use std::path::PathBuf;

use chrono::{Datelike, Local, NaiveDate};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::activity_io::{activity_log_path, log_activity, read_recent};
use crate::io::config_io;
use crate::io::store_io::{self, default_data_path};
use crate::model::config::AppConfig;
use crate::model::store::TaskStore;
use crate::model::task::{NewTask, TaskPatch, TaskStatus};
use crate::ops::list_view::{ListFilter, list_tasks, search_tasks};
use crate::ops::settings_ops::{self, VocabKind};
use crate::ops::{board, calendar, stats, task_ops};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli, config: AppConfig) -> CmdResult {
    let json = cli.json;
    let ctx = Context {
        file: cli.file,
        config,
    };

    match cli.command {
        None => cmd_list(&ctx, ListArgs::default(), json),
        Some(cmd) => match cmd {
            // Read commands
            Commands::Show(args) => cmd_show(&ctx, args, json),
            Commands::List(args) => cmd_list(&ctx, args, json),
            Commands::Search(args) => cmd_search(&ctx, args, json),
            Commands::Board => cmd_board(&ctx, json),
            Commands::Calendar(args) => cmd_calendar(&ctx, args, json),
            Commands::Stats => cmd_stats(&ctx, json),
            Commands::Log(args) => cmd_log(&ctx, args, json),
            Commands::Export(args) => cmd_export(&ctx, args),
            Commands::Backup(args) => cmd_backup(&ctx, args),

            // Write commands
            Commands::Add(args) => cmd_add(&ctx, args, json),
            Commands::Edit(args) => cmd_edit(&ctx, args),
            Commands::Delete(args) => cmd_delete(&ctx, args),
            Commands::Toggle(args) => cmd_toggle(&ctx, args),
            Commands::Import(args) => cmd_import(&ctx, args, json),
            Commands::Restore(args) => cmd_restore(&ctx, args),
            Commands::Reset(args) => cmd_reset(&ctx, args),
            Commands::Category(args) => cmd_vocab(&ctx, VocabKind::Category, args, json),
            Commands::Priority(args) => cmd_vocab(&ctx, VocabKind::Priority, args, json),
            Commands::Theme(args) => cmd_theme(&ctx, args, json),

            // Config file (doesn't touch the data file)
            Commands::Config(args) => cmd_config(&ctx.config, args, json),
        },
    }
}

// ---------------------------------------------------------------------------
// Context and session: one loaded data file
// ---------------------------------------------------------------------------

struct Context {
    file: Option<PathBuf>,
    config: AppConfig,
}

impl Context {
    /// `--file` wins over `data_file` in config.toml, which wins over the
    /// XDG default.
    fn data_path(&self) -> PathBuf {
        self.file
            .clone()
            .or_else(|| self.config.data_file.clone())
            .unwrap_or_else(default_data_path)
    }

    fn open(&self) -> Session {
        let path = self.data_path();
        let loaded = store_io::open_store(&path, self.config.task_defaults());
        Session {
            path,
            lossy: loaded.is_lossy(),
            store: loaded.store,
        }
    }
}

struct Session {
    path: PathBuf,
    store: TaskStore,
    /// The data file holds something the store could not read
    lossy: bool,
}

impl Session {
    /// Save the store, then append whatever the mutation logged to the
    /// activity log. A data file that did not load cleanly is moved aside
    /// first, never overwritten.
    fn commit(mut self) -> CmdResult {
        if self.lossy && self.path.exists() {
            let kept = store_io::set_aside(&self.path)?;
            eprintln!("note: kept the damaged data file as {}", kept.display());
        }
        store_io::save_store(&self.path, &self.store)?;
        log_activity(&activity_log_path(&self.path), &self.store.take_activity());
        Ok(())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_show(ctx: &Context, args: IdArg, json: bool) -> CmdResult {
    let session = ctx.open();
    let task = session
        .store
        .find(args.id)
        .ok_or(task_ops::TaskError::NotFound(args.id))?;
    if json {
        println!("{}", serde_json::to_string_pretty(task)?);
    } else {
        print_lines(format_task_detail(task));
    }
    Ok(())
}

fn list_filter(args: ListArgs) -> ListFilter {
    if args.today {
        ListFilter::DueToday
    } else if args.upcoming {
        ListFilter::Upcoming
    } else if args.completed {
        ListFilter::Completed
    } else if let Some(category) = args.category {
        ListFilter::Category(category)
    } else if let Some(priority) = args.priority {
        ListFilter::Priority(priority)
    } else if let Some(query) = args.search {
        ListFilter::Search(query)
    } else {
        ListFilter::All
    }
}

fn cmd_list(ctx: &Context, args: ListArgs, json: bool) -> CmdResult {
    let session = ctx.open();
    let filter = list_filter(args);
    let store = &session.store;
    let tasks = list_tasks(&store.tasks, &filter, &store.priorities, today());
    if json {
        let out = TaskListJson {
            filter: filter.describe(),
            tasks,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for task in tasks {
            println!("{}", format_task_line(task));
        }
    }
    Ok(())
}

fn cmd_search(ctx: &Context, args: SearchArgs, json: bool) -> CmdResult {
    let session = ctx.open();
    let store = &session.store;
    let tasks = search_tasks(&store.tasks, &args.query, &store.priorities, today());
    if json {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
    } else if tasks.is_empty() {
        eprintln!("no tasks match \"{}\"", args.query);
    } else {
        for task in tasks {
            println!("{}", format_task_line(task));
        }
    }
    Ok(())
}

/// Width of one board column in terminal cells
const BOARD_COLUMN_WIDTH: usize = 26;

fn cmd_board(ctx: &Context, json: bool) -> CmdResult {
    let session = ctx.open();
    let b = board::board(&session.store.tasks);
    if json {
        println!("{}", serde_json::to_string_pretty(&board_to_json(&b))?);
    } else {
        print_lines(format_board(&b, BOARD_COLUMN_WIDTH));
    }
    Ok(())
}

/// Parse `YYYY-MM` into a year and month
fn parse_month(s: &str) -> Result<(i32, u32), String> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .map(|d| (d.year(), d.month()))
        .map_err(|_| format!("invalid month '{}': expected YYYY-MM", s))
}

fn cmd_calendar(ctx: &Context, args: CalendarArgs, json: bool) -> CmdResult {
    let session = ctx.open();
    let (year, month) = match args.month {
        Some(ref s) => parse_month(s)?,
        None => {
            let now = today();
            (now.year(), now.month())
        }
    };
    let delta = match (args.prev, args.next) {
        (true, _) => -1,
        (_, true) => 1,
        _ => 0,
    };
    let (year, month) = calendar::shift_month(year, month, delta);

    let tasks = &session.store.tasks;
    let cal = calendar::calendar_month(tasks, year, month)
        .ok_or_else(|| format!("invalid month: {}-{:02}", year, month))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&calendar_to_json(&cal))?);
        return Ok(());
    }
    print_lines(format_calendar(&cal));

    let mut due: Vec<_> = tasks
        .iter()
        .filter(|t| {
            t.due_date
                .is_some_and(|d| d.year() == year && d.month() == month)
        })
        .collect();
    if !due.is_empty() {
        due.sort_by_key(|t| t.due_date);
        println!();
        for task in due {
            println!("{}", format_task_line(task));
        }
    }
    Ok(())
}

fn cmd_stats(ctx: &Context, json: bool) -> CmdResult {
    let session = ctx.open();
    let store = &session.store;
    let s = stats::statistics(&store.tasks, &store.priorities, &store.categories);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats_to_json(&s))?);
    } else {
        print_lines(format_stats(&s));
    }
    Ok(())
}

fn cmd_log(ctx: &Context, args: LogArgs, json: bool) -> CmdResult {
    let session = ctx.open();
    let entries = read_recent(&activity_log_path(&session.path), args.limit);
    if json {
        let out: Vec<ActivityJson> = entries.iter().map(activity_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for entry in entries {
            println!("{}", entry);
        }
    }
    Ok(())
}

fn cmd_export(ctx: &Context, args: PathArg) -> CmdResult {
    let session = ctx.open();
    let count = store_io::export_to_file(&args.path, &session.store)?;
    println!("exported {} tasks to {}", count, args.path.display());
    Ok(())
}

fn cmd_backup(ctx: &Context, args: PathArg) -> CmdResult {
    let session = ctx.open();
    store_io::backup_to_file(&args.path, &session.store)?;
    println!("backed up {} tasks to {}", session.store.tasks.len(), args.path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs, json: bool) -> CmdResult {
    let mut session = ctx.open();
    let due_date = match args.due {
        Some(ref s) => task_ops::parse_due_date(s)?,
        None => None,
    };
    let new = NewTask {
        title: args.title,
        description: args.description,
        due_date,
        priority: args.priority,
        category: args.category,
    };
    let id = task_ops::add_task(&mut session.store, new)?;
    session.commit()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&IdJson { id })?);
    } else {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_edit(ctx: &Context, args: EditArgs) -> CmdResult {
    let mut session = ctx.open();
    let due_date = if args.clear_due {
        Some(None)
    } else {
        match args.due {
            Some(ref s) => Some(task_ops::parse_due_date(s)?),
            None => None,
        }
    };
    let status = match args.status {
        Some(ref s) => Some(TaskStatus::parse_status(s).ok_or_else(|| {
            format!("unknown status '{}' (expected: todo, in_progress, done)", s)
        })?),
        None => None,
    };
    let patch = TaskPatch {
        title: args.title,
        description: args.description,
        due_date,
        priority: args.priority,
        category: args.category,
        status,
        completed: None,
    };
    if patch.is_empty() {
        return Err("nothing to change (see `td edit --help`)".into());
    }
    task_ops::edit_task(&mut session.store, args.id, patch)?;
    session.commit()
}

fn cmd_delete(ctx: &Context, args: IdArg) -> CmdResult {
    let mut session = ctx.open();
    let task = task_ops::delete_task(&mut session.store, args.id)?;
    session.commit()?;
    println!("deleted {} {}", task.id, task.title);
    Ok(())
}

fn cmd_toggle(ctx: &Context, args: IdArg) -> CmdResult {
    let mut session = ctx.open();
    let completed = task_ops::toggle_completion(&mut session.store, args.id)?;
    session.commit()?;
    println!("{} {}", args.id, if completed { "done" } else { "todo" });
    Ok(())
}

fn cmd_import(ctx: &Context, args: PathArg, json: bool) -> CmdResult {
    let mut session = ctx.open();
    let result = store_io::import_from_file(&args.path, &mut session.store)?;
    session.commit()?;
    if json {
        let out = ImportJson {
            imported: result.assigned_ids.len(),
            ids: result.assigned_ids,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("imported {} tasks", result.assigned_ids.len());
    }
    Ok(())
}

fn cmd_restore(ctx: &Context, args: PathArg) -> CmdResult {
    let mut session = ctx.open();
    let count = store_io::restore_from_file(&args.path, &mut session.store)?;
    session.commit()?;
    println!("restored {} tasks", count);
    Ok(())
}

fn cmd_reset(ctx: &Context, args: ResetArgs) -> CmdResult {
    if !args.yes {
        return Err("reset deletes every task; pass --yes to confirm".into());
    }
    let mut session = ctx.open();
    let removed = task_ops::reset(&mut session.store);
    session.commit()?;
    println!("removed {} tasks", removed);
    Ok(())
}

fn cmd_vocab(ctx: &Context, kind: VocabKind, args: VocabCmd, json: bool) -> CmdResult {
    let mut session = ctx.open();
    match args.action {
        None => {
            let labels = settings_ops::vocab(&session.store, kind);
            if json {
                println!("{}", serde_json::to_string_pretty(labels)?);
            } else {
                print_lines(format_vocab(labels));
            }
            Ok(())
        }
        Some(action) => {
            match action {
                VocabAction::Add(a) => settings_ops::add_label(&mut session.store, kind, &a.label)?,
                VocabAction::Rm(a) => settings_ops::remove_label(&mut session.store, kind, &a.label)?,
                VocabAction::Mv(a) => {
                    let position = a.position.saturating_sub(1);
                    settings_ops::move_label(&mut session.store, kind, &a.label, position)?
                }
            }
            session.commit()
        }
    }
}

fn cmd_theme(ctx: &Context, args: ThemeCmd, json: bool) -> CmdResult {
    let mut session = ctx.open();
    match args.action {
        None => {
            let colors = &session.store.colors;
            if json {
                println!("{}", serde_json::to_string_pretty(colors)?);
            } else {
                for (key, value) in colors {
                    println!("{} = {}", key, value);
                }
            }
            Ok(())
        }
        Some(ThemeAction::Set(a)) => {
            settings_ops::set_color(&mut session.store, &a.key, &a.value)?;
            session.commit()
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(config: &AppConfig, args: ConfigCmd, json: bool) -> CmdResult {
    let path = config_io::config_path();
    match args.action {
        None => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                print!("{}", toml::to_string_pretty(config)?);
            }
        }
        Some(ConfigAction::Path) => println!("{}", path.display()),
        Some(ConfigAction::Set(a)) => {
            let mut doc = config_io::read_config_document(&path)?;
            config_io::set_config_value(&mut doc, &a.key, &a.value)?;
            // Reject edits that would leave the file unreadable
            toml::from_str::<AppConfig>(&doc.to_string())?;
            config_io::write_config(&path, &doc)?;
            tracing::info!(key = %a.key, path = %path.display(), "updated config");
        }
    }
    Ok(())
}
