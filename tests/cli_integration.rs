//! Integration tests for the `td` CLI.
//!
//! Each test gets a temp directory that serves as XDG config and data home,
//! runs `td` as a subprocess, and verifies stdout and/or file contents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Get the path to the built `td` binary.
fn td_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("td");
    path
}

/// Run `td` with the given args, returning (stdout, stderr, success).
fn run_td(home: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(td_bin())
        .args(args)
        .current_dir(home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("TASKDESK_LOG")
        .output()
        .expect("failed to run td");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `td` expecting success, return stdout.
fn run_td_ok(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_td(home, args);
    if !success {
        panic!(
            "td {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `td` expecting failure, return stderr.
fn run_td_err(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_td(home, args);
    if success {
        panic!("td {:?} should have failed:\nstdout: {}", args, stdout);
    }
    stderr
}

fn run_json(home: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = args.to_vec();
    full.push("--json");
    serde_json::from_str(&run_td_ok(home, &full)).unwrap()
}

fn data_file(home: &Path) -> PathBuf {
    home.join("data").join("taskdesk").join("tasks.json")
}

fn ids(list: &serde_json::Value) -> Vec<u64> {
    list["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

#[test]
fn test_add_creates_data_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_td_ok(tmp.path(), &["add", "Water plants", "--due", "2024-05-01"]);
    assert_eq!(out.trim(), "1");

    let content = fs::read_to_string(data_file(tmp.path())).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    let task = &value["tasks"][0];
    assert_eq!(task["title"], "Water plants");
    assert_eq!(task["due_date"], "2024-05-01");
    assert_eq!(task["priority"], "Medium");
    assert_eq!(task["category"], "Work");
    assert_eq!(task["completed"], false);
    assert_eq!(task["status"], "todo");
}

#[test]
fn test_add_ids_increase() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_td_ok(tmp.path(), &["add", "one"]);
    run_td_ok(tmp.path(), &["add", "two"]);
    run_td_ok(tmp.path(), &["delete", "2"]);
    let out = run_td_ok(tmp.path(), &["add", "three"]);
    assert_eq!(out.trim(), "3");
}

#[test]
fn test_add_empty_title_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_td_ok(tmp.path(), &["add", "keep me"]);
    let before = fs::read_to_string(data_file(tmp.path())).unwrap();

    let err = run_td_err(tmp.path(), &["add", "   "]);
    assert!(err.contains("error: task title cannot be empty"));
    assert_eq!(fs::read_to_string(data_file(tmp.path())).unwrap(), before);
}

#[test]
fn test_add_bad_due_date_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_td_err(tmp.path(), &["add", "x", "--due", "31/12/2024"]);
    assert!(err.contains("expected YYYY-MM-DD"));
    assert!(!data_file(tmp.path()).exists());
}

#[test]
fn test_toggle_and_show() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_td_ok(tmp.path(), &["add", "Pay rent"]);

    let out = run_td_ok(tmp.path(), &["toggle", "1"]);
    assert_eq!(out.trim(), "1 done");
    let task = run_json(tmp.path(), &["show", "1"]);
    assert_eq!(task["completed"], true);
    assert_eq!(task["status"], "done");
    assert!(task["completed_at"].is_string());

    run_td_ok(tmp.path(), &["toggle", "1"]);
    let task = run_json(tmp.path(), &["show", "1"]);
    assert_eq!(task["completed"], false);
    assert!(task["completed_at"].is_null());
}

#[test]
fn test_toggle_unknown_id_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_td_err(tmp.path(), &["toggle", "42"]);
    assert!(err.contains("task not found: 42"));
}

#[test]
fn test_edit_fields() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_td_ok(tmp.path(), &["add", "Draft", "--due", "2024-02-01"]);
    run_td_ok(
        tmp.path(),
        &["edit", "1", "--title", "Final", "-p", "High", "--clear-due", "-s", "in_progress"],
    );

    let task = run_json(tmp.path(), &["show", "1"]);
    assert_eq!(task["title"], "Final");
    assert_eq!(task["priority"], "High");
    assert!(task["due_date"].is_null());
    assert_eq!(task["status"], "in_progress");

    let show = run_td_ok(tmp.path(), &["show", "1"]);
    assert!(show.contains("status: In Progress"));
}

#[test]
fn test_edit_rejects_unknown_status() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_td_ok(tmp.path(), &["add", "x"]);
    let err = run_td_err(tmp.path(), &["edit", "1", "-s", "blocked"]);
    assert!(err.contains("unknown status 'blocked'"));
}

#[test]
fn test_edit_empty_title_leaves_task() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_td_ok(tmp.path(), &["add", "Original"]);
    run_td_err(tmp.path(), &["edit", "1", "--title", ""]);
    let task = run_json(tmp.path(), &["show", "1"]);
    assert_eq!(task["title"], "Original");
}

#[test]
fn test_delete() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_td_ok(tmp.path(), &["add", "Gone soon"]);
    let out = run_td_ok(tmp.path(), &["delete", "1"]);
    assert!(out.contains("Gone soon"));
    assert!(ids(&run_json(tmp.path(), &["list"])).is_empty());
    run_td_err(tmp.path(), &["delete", "1"]);
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[test]
fn test_list_order_incomplete_priority_due() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_td_ok(tmp.path(), &["add", "low later", "-p", "Low", "--due", "2024-03-01"]);
    run_td_ok(tmp.path(), &["add", "critical", "-p", "Critical"]);
    run_td_ok(tmp.path(), &["add", "low sooner", "-p", "Low", "--due", "2024-01-01"]);
    run_td_ok(tmp.path(), &["add", "low undated", "-p", "Low"]);
    run_td_ok(tmp.path(), &["add", "done critical", "-p", "Critical"]);
    run_td_ok(tmp.path(), &["toggle", "5"]);

    assert_eq!(ids(&run_json(tmp.path(), &["list"])), vec![2, 3, 1, 4, 5]);

    let text = run_td_ok(tmp.path(), &[]);
    let first = text.lines().next().unwrap();
    assert_eq!(first, "[ ] 2 critical (Critical, Work)");
}

#[test]
fn test_list_filters() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_td_ok(tmp.path(), &["add", "Groceries", "-c", "Shopping", "-d", "milk and EGGS"]);
    run_td_ok(tmp.path(), &["add", "Report", "-c", "Work"]);
    run_td_ok(tmp.path(), &["toggle", "2"]);

    assert_eq!(ids(&run_json(tmp.path(), &["list", "--category", "Shopping"])), vec![1]);
    assert_eq!(ids(&run_json(tmp.path(), &["list", "--completed"])), vec![2]);
    assert_eq!(ids(&run_json(tmp.path(), &["list", "--search", "eggs"])), vec![1]);

    let found = run_json(tmp.path(), &["search", "REPORT"]);
    assert_eq!(found[0]["id"], 2);
}

#[test]
fn test_list_filters_are_exclusive() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_td_err(tmp.path(), &["list", "--today", "--completed"]);
}

#[test]
fn test_board_groups_by_status() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_td_ok(tmp.path(), &["add", "a"]);
    run_td_ok(tmp.path(), &["add", "b"]);
    run_td_ok(tmp.path(), &["add", "c"]);
    run_td_ok(tmp.path(), &["edit", "2", "-s", "in_progress"]);
    run_td_ok(tmp.path(), &["toggle", "3"]);

    let board = run_json(tmp.path(), &["board"]);
    assert_eq!(board["todo"][0]["id"], 1);
    assert_eq!(board["in_progress"][0]["id"], 2);
    assert_eq!(board["done"][0]["id"], 3);

    let text = run_td_ok(tmp.path(), &["board"]);
    let header = text.lines().next().unwrap();
    assert!(header.starts_with("To Do (1)"));
    assert!(header.contains("In Progress (1)"));
    assert!(header.contains("Done (1)"));
}

#[test]
fn test_calendar_month() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_td_ok(tmp.path(), &["add", "dentist", "--due", "2023-11-15"]);
    run_td_ok(tmp.path(), &["add", "other month", "--due", "2023-12-15"]);

    let cal = run_json(tmp.path(), &["calendar", "--month", "2023-11"]);
    assert_eq!(cal["leading_blanks"], 3);
    assert_eq!(cal["days_in_month"], 30);
    assert_eq!(cal["days"][14]["date"], "2023-11-15");
    assert_eq!(cal["days"][14]["due"], 1);

    let text = run_td_ok(tmp.path(), &["calendar", "--month", "2023-12", "--prev"]);
    assert!(text.starts_with("November 2023\n"));
    assert!(text.contains("15*"));
    assert!(text.contains("dentist"));
    assert!(!text.contains("other month"));

    let cal = run_json(tmp.path(), &["calendar", "--month", "2023-12", "--next"]);
    assert_eq!(cal["year"], 2024);
    assert_eq!(cal["month"], 1);

    run_td_err(tmp.path(), &["calendar", "--month", "2023-13"]);
}

#[test]
fn test_stats() {
    let tmp = tempfile::TempDir::new().unwrap();
    let empty = run_json(tmp.path(), &["stats"]);
    assert_eq!(empty["completion_rate"], 0.0);
    assert_eq!(empty["total"], 0);

    run_td_ok(tmp.path(), &["add", "a", "-p", "High"]);
    run_td_ok(tmp.path(), &["add", "b", "-p", "High"]);
    run_td_ok(tmp.path(), &["toggle", "1"]);

    let stats = run_json(tmp.path(), &["stats"]);
    assert_eq!(stats["completion_rate"], 50.0);
    let high = stats["by_priority"]
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["label"] == "High")
        .unwrap()
        .clone();
    assert_eq!(high["completed"], 1);
    assert_eq!(high["total"], 2);

    let text = run_td_ok(tmp.path(), &["stats"]);
    assert!(text.starts_with("completed: 1/2 (50%)"));
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[test]
fn test_export_import_round_trip() {
    let tmp = tempfile::TempDir::new().unwrap();
    let other = tmp.path().join("other.json");
    let export = tmp.path().join("export.json");

    run_td_ok(tmp.path(), &["add", "one", "-d", "first", "--due", "2024-01-10"]);
    run_td_ok(tmp.path(), &["add", "two", "-c", "Fun"]);
    run_td_ok(tmp.path(), &["export", export.to_str().unwrap()]);

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&export).unwrap()).unwrap();
    assert_eq!(doc.as_array().unwrap().len(), 2);

    let other_str = other.to_str().unwrap();
    run_td_ok(tmp.path(), &["--file", other_str, "add", "already here"]);
    let out = run_td_ok(tmp.path(), &["--file", other_str, "import", export.to_str().unwrap()]);
    assert_eq!(out.trim(), "imported 2 tasks");

    let list = run_json(tmp.path(), &["--file", other_str, "list"]);
    let titles: Vec<&str> = list["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["one", "already here", "two"]);
    let imported = run_json(tmp.path(), &["--file", other_str, "show", "2"]);
    assert_eq!(imported["description"], "first");
    assert_eq!(imported["category"], "Work");
}

#[test]
fn test_import_scenario_order() {
    let tmp = tempfile::TempDir::new().unwrap();
    let doc = tmp.path().join("in.json");
    fs::write(
        &doc,
        r#"[
  {"id": 1, "title": "a", "due_date": "2024-01-10", "priority": "High", "completed": false},
  {"id": 2, "title": "b", "due_date": null, "priority": "Critical", "completed": true}
]"#,
    )
    .unwrap();
    run_td_ok(tmp.path(), &["import", doc.to_str().unwrap()]);
    assert_eq!(ids(&run_json(tmp.path(), &["list"])), vec![1, 2]);
}

#[test]
fn test_import_malformed_merges_nothing() {
    let tmp = tempfile::TempDir::new().unwrap();
    let doc = tmp.path().join("bad.json");
    fs::write(&doc, r#"[{"title": "ok"}, {"description": "no title"}]"#).unwrap();

    run_td_ok(tmp.path(), &["add", "existing"]);
    let err = run_td_err(tmp.path(), &["import", doc.to_str().unwrap()]);
    assert!(err.contains("entry 1 has no title"));
    assert_eq!(ids(&run_json(tmp.path(), &["list"])), vec![1]);
}

#[test]
fn test_backup_restore() {
    let tmp = tempfile::TempDir::new().unwrap();
    let backup = tmp.path().join("backup.json");
    run_td_ok(tmp.path(), &["add", "saved"]);
    run_td_ok(tmp.path(), &["category", "add", "Garden"]);
    run_td_ok(tmp.path(), &["backup", backup.to_str().unwrap()]);

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&backup).unwrap()).unwrap();
    assert_eq!(doc["version"], 1);

    run_td_ok(tmp.path(), &["reset", "--yes"]);
    assert!(ids(&run_json(tmp.path(), &["list"])).is_empty());

    let out = run_td_ok(tmp.path(), &["restore", backup.to_str().unwrap()]);
    assert_eq!(out.trim(), "restored 1 tasks");
    assert_eq!(ids(&run_json(tmp.path(), &["list"])), vec![1]);
    let categories = run_json(tmp.path(), &["category"]);
    assert_eq!(categories.as_array().unwrap().last().unwrap(), "Garden");
}

#[test]
fn test_restore_rejects_newer_version() {
    let tmp = tempfile::TempDir::new().unwrap();
    let backup = tmp.path().join("future.json");
    fs::write(&backup, r#"{"tasks": [], "version": 2}"#).unwrap();
    let err = run_td_err(tmp.path(), &["restore", backup.to_str().unwrap()]);
    assert!(err.contains("unsupported backup version 2"));
}

#[test]
fn test_reset_requires_yes() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_td_ok(tmp.path(), &["add", "precious"]);
    let err = run_td_err(tmp.path(), &["reset"]);
    assert!(err.contains("--yes"));
    assert_eq!(ids(&run_json(tmp.path(), &["list"])), vec![1]);
}

#[test]
fn test_corrupt_data_file_falls_back_to_defaults() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = data_file(tmp.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{ not json").unwrap();

    let (stdout, stderr, success) = run_td(tmp.path(), &["list"]);
    assert!(success);
    assert!(stdout.is_empty());
    assert!(stderr.contains("could not load data file"));
}

#[test]
fn test_bad_record_does_not_cost_other_tasks() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = data_file(tmp.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let original = r#"{"tasks": [
  {"id": 1, "title": "valid"},
  {"id": 2, "title": "no description", "description": null},
  {"id": 3, "title": "odd date", "due_date": "2024/01/11"}
]}"#;
    fs::write(&path, original).unwrap();

    assert_eq!(run_td_ok(tmp.path(), &["add", "new"]).trim(), "4");

    let list = run_json(tmp.path(), &["list"]);
    let mut titles: Vec<&str> = list["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["new", "no description", "odd date", "valid"]);

    let kept = path.with_file_name("tasks.json.corrupt");
    assert_eq!(fs::read_to_string(kept).unwrap(), original);
}

#[test]
fn test_unreadable_data_file_is_moved_aside_on_write() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = data_file(tmp.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{ not json").unwrap();

    let (_, stderr, success) = run_td(tmp.path(), &["add", "fresh start"]);
    assert!(success);
    assert!(stderr.contains("tasks.json.corrupt"));
    assert_eq!(
        fs::read_to_string(path.with_file_name("tasks.json.corrupt")).unwrap(),
        "{ not json"
    );
    assert_eq!(ids(&run_json(tmp.path(), &["list"])), vec![1]);
}

#[test]
fn test_import_accepts_null_fields() {
    let tmp = tempfile::TempDir::new().unwrap();
    let doc = tmp.path().join("nulls.json");
    fs::write(
        &doc,
        r#"[{"title": "x", "description": null, "due_date": null, "priority": null}]"#,
    )
    .unwrap();
    run_td_ok(tmp.path(), &["import", doc.to_str().unwrap()]);
    let task = run_json(tmp.path(), &["show", "1"]);
    assert_eq!(task["description"], "");
    assert_eq!(task["priority"], "Medium");
}

// ---------------------------------------------------------------------------
// Settings, log, config
// ---------------------------------------------------------------------------

#[test]
fn test_vocab_commands() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_td_ok(tmp.path(), &["priority"]);
    assert!(out.starts_with("1. Critical\n2. High\n"));

    run_td_ok(tmp.path(), &["priority", "mv", "Chill", "1"]);
    let priorities = run_json(tmp.path(), &["priority"]);
    assert_eq!(priorities[0], "Chill");

    run_td_ok(tmp.path(), &["category", "rm", "Fun"]);
    let err = run_td_err(tmp.path(), &["category", "rm", "Fun"]);
    assert!(err.contains("category 'Fun' not found"));
    let err = run_td_err(tmp.path(), &["category", "add", "Work"]);
    assert!(err.contains("already exists"));
}

#[test]
fn test_theme_commands() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_td_ok(tmp.path(), &["theme"]);
    assert!(out.contains("accent_light = #ff4d4d"));

    run_td_ok(tmp.path(), &["theme", "set", "accent_light", "#00FF00"]);
    let colors = run_json(tmp.path(), &["theme"]);
    assert_eq!(colors["accent_light"], "#00ff00");

    let err = run_td_err(tmp.path(), &["theme", "set", "accent_light", "green"]);
    assert!(err.contains("expected #rgb or #rrggbb"));
}

#[test]
fn test_activity_log() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_td_ok(tmp.path(), &["add", "Water plants"]);
    run_td_ok(tmp.path(), &["toggle", "1"]);
    run_td_ok(tmp.path(), &["delete", "1"]);

    let log_path = data_file(tmp.path()).with_file_name("activity.log");
    assert!(log_path.exists());

    let out = run_td_ok(tmp.path(), &["log"]);
    let messages: Vec<&str> = out
        .lines()
        .map(|l| l.split_once("] ").unwrap().1)
        .collect();
    assert_eq!(
        messages,
        vec![
            "Added task: Water plants",
            "Completed task: Water plants",
            "Deleted task: Water plants"
        ]
    );

    let last = run_json(tmp.path(), &["log", "--limit", "1"]);
    assert_eq!(last.as_array().unwrap().len(), 1);
    assert_eq!(last[0]["message"], "Deleted task: Water plants");
}

#[test]
fn test_config_defaults_apply_to_add() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = run_td_ok(tmp.path(), &["config", "path"]);
    assert_eq!(
        path.trim(),
        tmp.path().join("config/taskdesk/config.toml").to_str().unwrap()
    );

    run_td_ok(tmp.path(), &["config", "set", "defaults.priority", "High"]);
    run_td_ok(tmp.path(), &["config", "set", "defaults.category", "Personal"]);
    run_td_ok(tmp.path(), &["add", "configured"]);
    let task = run_json(tmp.path(), &["show", "1"]);
    assert_eq!(task["priority"], "High");
    assert_eq!(task["category"], "Personal");

    let config = run_json(tmp.path(), &["config"]);
    assert_eq!(config["defaults"]["priority"], "High");

    let err = run_td_err(tmp.path(), &["config", "set", "nope", "x"]);
    assert!(err.contains("unknown config key: nope"));
}

#[test]
fn test_config_set_repairs_malformed_file() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("config/taskdesk/config.toml");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "defaults = \"High\"\n").unwrap();

    run_td_ok(tmp.path(), &["config", "set", "defaults.priority", "Low"]);
    let config = run_json(tmp.path(), &["config"]);
    assert_eq!(config["defaults"]["priority"], "Low");
}

#[test]
fn test_config_data_file_is_used() {
    let tmp = tempfile::TempDir::new().unwrap();
    let custom = tmp.path().join("elsewhere").join("mine.json");
    run_td_ok(tmp.path(), &["config", "set", "data_file", custom.to_str().unwrap()]);
    run_td_ok(tmp.path(), &["add", "relocated"]);
    assert!(custom.exists());
    assert!(!data_file(tmp.path()).exists());
}
