//! Integration tests for the `gtd` CLI.
//!
//! Each test creates a temp workspace, runs `gtd` as a subprocess, and
//! verifies stdout and/or file contents.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use pretty_assertions::assert_eq;

/// Get the path to the built `gtd` binary.
fn gtd_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("gtd");
    path
}

/// Run `gtd` in `dir`, return (stdout, stderr, success).
fn run_gtd(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(gtd_bin())
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run gtd");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `gtd` expecting success, return stdout.
fn run_gtd_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_gtd(dir, args);
    if !success {
        panic!(
            "gtd {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `gtd` with `input` on stdin, expecting success.
fn run_gtd_with_input(dir: &Path, args: &[&str], input: &str) -> String {
    let mut child = Command::new(gtd_bin())
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run gtd");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(
        output.status.success(),
        "gtd {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn init_workspace(dir: &Path) {
    run_gtd_ok(dir, &["init"]);
}

fn read_store(dir: &Path) -> serde_json::Value {
    let text = fs::read_to_string(dir.join("master.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn view(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join("views").join(name)).unwrap()
}

fn tick_all(dir: &Path, name: &str) {
    let path = dir.join("views").join(name);
    let text = fs::read_to_string(&path).unwrap().replace("- [ ]", "- [x]");
    fs::write(&path, text).unwrap();
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

#[test]
fn test_init_creates_workspace() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_gtd_ok(tmp.path(), &["init"]);
    assert!(out.contains("Initialized gtd workspace"));

    for name in [
        "master.json",
        "config.toml",
        "inbox/inbox.md",
        "views/next_actions.md",
        "views/projects.md",
        "views/someday.md",
        "views/waiting_for.md",
        "views/agenda.md",
        "views/stalled_projects.md",
    ] {
        assert!(tmp.path().join(name).is_file(), "missing {}", name);
    }
    assert_eq!(view(tmp.path(), "next_actions.md"), "# Next Actions\n");

    let store = read_store(tmp.path());
    assert_eq!(store["meta"]["version"], 1);
    assert!(store["actions"].as_object().unwrap().is_empty());
}

#[test]
fn test_init_is_idempotent() {
    let tmp = tempfile::TempDir::new().unwrap();
    init_workspace(tmp.path());
    fs::write(tmp.path().join("inbox/inbox.md"), "# Inbox\n\n- [ ] mine\n").unwrap();

    let out = run_gtd_ok(tmp.path(), &["init"]);
    assert!(out.contains("already initialized"));
    assert_eq!(
        fs::read_to_string(tmp.path().join("inbox/inbox.md")).unwrap(),
        "# Inbox\n\n- [ ] mine\n"
    );
}

#[test]
fn test_init_with_workspace_dir() {
    let tmp = tempfile::TempDir::new().unwrap();
    let target = tmp.path().join("life");
    run_gtd_ok(tmp.path(), &["-C", target.to_str().unwrap(), "init"]);
    assert!(target.join("master.json").is_file());
}

#[test]
fn test_commands_outside_workspace_fail() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_, stderr, success) = run_gtd(tmp.path(), &["build"]);
    assert!(!success);
    assert!(stderr.starts_with("error: "));
}

// ---------------------------------------------------------------------------
// Add / build
// ---------------------------------------------------------------------------

#[test]
fn test_add_action_then_build() {
    let tmp = tempfile::TempDir::new().unwrap();
    init_workspace(tmp.path());

    let id = run_gtd_ok(tmp.path(), &["add", "action", "Call bank", "--context", "phone"]);
    let id = id.trim();
    assert!(id.starts_with("a_"));
    assert_eq!(id.len(), 10);

    run_gtd_ok(
        tmp.path(),
        &["add", "action", "Buy milk", "--context", "@Errands", "--due", "2030-01-01"],
    );
    let out = run_gtd_ok(tmp.path(), &["build"]);
    assert!(out.contains("Built 6 views"));

    let next = view(tmp.path(), "next_actions.md");
    let errands = next.find("## @errands").unwrap();
    let phone = next.find("## @phone").unwrap();
    assert!(errands < phone);
    assert!(next.contains(&format!("- [ ] Call bank <!-- id:{} -->", id)));
    assert!(next.contains("- [ ] Buy milk (due 2030-01-01) <!-- id:a_"));
}

#[test]
fn test_add_action_validation() {
    let tmp = tempfile::TempDir::new().unwrap();
    init_workspace(tmp.path());
    let before = fs::read_to_string(tmp.path().join("master.json")).unwrap();

    let (_, stderr, success) =
        run_gtd(tmp.path(), &["add", "action", "Fix car", "--context", "garage"]);
    assert!(!success);
    assert!(stderr.contains("unknown context 'garage'"));

    let (_, stderr, success) = run_gtd(tmp.path(), &["add", "action", "Fix XXX car", "--context", "home"]);
    assert!(!success);
    assert!(stderr.contains("XXX"));

    let (_, _, success) = run_gtd(tmp.path(), &["add", "action", "Pay", "--project", "p_nothere", "--context", "home"]);
    assert!(!success);

    assert_eq!(
        fs::read_to_string(tmp.path().join("master.json")).unwrap(),
        before
    );
}

#[test]
fn test_add_waiting_action() {
    let tmp = tempfile::TempDir::new().unwrap();
    init_workspace(tmp.path());
    run_gtd_ok(
        tmp.path(),
        &["add", "action", "Refund", "--state", "waiting", "--waiting-for", "Bank"],
    );
    run_gtd_ok(tmp.path(), &["build"]);

    let waiting = view(tmp.path(), "waiting_for.md");
    assert!(waiting.contains("## Bank"));
    assert!(waiting.contains("- [ ] Refund (waiting for Bank since "));
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

#[test]
fn test_sync_marks_ticked_actions() {
    let tmp = tempfile::TempDir::new().unwrap();
    init_workspace(tmp.path());
    let id = run_gtd_ok(tmp.path(), &["add", "action", "Call bank", "--context", "phone"]);
    let id = id.trim().to_string();
    run_gtd_ok(tmp.path(), &["build"]);
    tick_all(tmp.path(), "next_actions.md");

    let out = run_gtd_ok(tmp.path(), &["sync", "--no-prompt"]);
    assert!(out.contains("Sync complete. Marked completed: 1 actions, 0 projects."));

    let store = read_store(tmp.path());
    assert_eq!(store["actions"][&id]["state"], "completed");
    assert!(store["actions"][&id]["completed"].is_string());

    // Running again changes nothing
    let out = run_gtd_ok(tmp.path(), &["sync", "--no-prompt"]);
    assert!(out.contains("Marked completed: 0 actions, 0 projects."));
}

#[test]
fn test_sync_force_completes_project() {
    let tmp = tempfile::TempDir::new().unwrap();
    init_workspace(tmp.path());
    let out = run_gtd_ok(
        tmp.path(),
        &["add", "project", "Move house", "--first", "Call agent", "--context", "phone"],
    );
    let pid = out.lines().next().unwrap().to_string();
    assert!(pid.starts_with("p_"));
    run_gtd_ok(tmp.path(), &["build"]);

    let path = tmp.path().join("views/projects.md");
    let text = fs::read_to_string(&path).unwrap().replace("Move house", "Move house XXX");
    fs::write(&path, text).unwrap();

    let out = run_gtd_ok(tmp.path(), &["--json", "sync", "--no-prompt"]);
    let report: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(report["completed_projects"][0], pid.as_str());
    assert_eq!(read_store(tmp.path())["projects"][&pid]["state"], "completed");
}

#[test]
fn test_sync_prunes_inbox() {
    let tmp = tempfile::TempDir::new().unwrap();
    init_workspace(tmp.path());
    fs::write(
        tmp.path().join("inbox/inbox.md"),
        "# Inbox\n\n- [x] handled\n  with a note\n- [ ] still open\n",
    )
    .unwrap();

    let out = run_gtd_ok(tmp.path(), &["sync", "--no-prompt"]);
    assert!(out.contains("Pruned 1 checked capture item(s)"));
    assert_eq!(
        fs::read_to_string(tmp.path().join("inbox/inbox.md")).unwrap(),
        "# Inbox\n\n- [ ] still open\n"
    );
}

#[test]
fn test_sync_prompts_for_stalled_project() {
    let tmp = tempfile::TempDir::new().unwrap();
    init_workspace(tmp.path());
    let out = run_gtd_ok(
        tmp.path(),
        &["add", "project", "Move house", "--first", "Call agent", "--context", "phone"],
    );
    let pid = out.lines().next().unwrap().to_string();
    run_gtd_ok(tmp.path(), &["build"]);
    tick_all(tmp.path(), "next_actions.md");

    let out = run_gtd_with_input(
        tmp.path(),
        &["sync"],
        "y\nBook van\n\nerrands\n\n\n\n",
    );
    assert!(out.contains("Project stalled: Move house"));
    assert!(out.contains("Added next action a_"));

    let store = read_store(tmp.path());
    let open: Vec<_> = store["actions"]
        .as_object()
        .unwrap()
        .values()
        .filter(|a| a["project"] == pid.as_str() && a["state"] == "active")
        .collect();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0]["title"], "Book van");
    assert_eq!(open[0]["context"], "errands");
}

#[test]
fn test_sync_without_input_leaves_project_stalled() {
    let tmp = tempfile::TempDir::new().unwrap();
    init_workspace(tmp.path());
    run_gtd_ok(
        tmp.path(),
        &["add", "project", "Move house", "--first", "Call agent", "--context", "phone"],
    );
    run_gtd_ok(tmp.path(), &["build"]);
    tick_all(tmp.path(), "next_actions.md");

    // stdin is closed, so the prompt declines
    let out = run_gtd_ok(tmp.path(), &["sync"]);
    assert!(out.contains("Stalled projects (1):"));
    assert!(out.contains("Marked completed: 1 actions, 0 projects."));
}

#[test]
fn test_sync_requires_views() {
    let tmp = tempfile::TempDir::new().unwrap();
    init_workspace(tmp.path());
    fs::remove_dir_all(tmp.path().join("views")).unwrap();

    let (_, stderr, success) = run_gtd(tmp.path(), &["sync", "--no-prompt"]);
    assert!(!success);
    assert!(stderr.contains("gtd init"));
}

// ---------------------------------------------------------------------------
// Contexts and listing
// ---------------------------------------------------------------------------

#[test]
fn test_context_add_and_drop() {
    let tmp = tempfile::TempDir::new().unwrap();
    init_workspace(tmp.path());

    let out = run_gtd_ok(tmp.path(), &["context", "add", "@Agenda Sam"]);
    assert!(out.contains("Added context 'agenda_sam'"));
    let out = run_gtd_ok(tmp.path(), &["context", "add", "phone"]);
    assert!(out.contains("already exists"));
    run_gtd_ok(tmp.path(), &["context", "drop", "computer"]);

    let out = run_gtd_ok(tmp.path(), &["--json", "context", "list"]);
    let list: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        list["contexts"],
        serde_json::json!(["agenda_sam", "errands", "home", "inbox", "phone"])
    );

    // comments in config.toml survive the edit
    let config = fs::read_to_string(tmp.path().join("config.toml")).unwrap();
    assert!(config.contains("# Contexts an action can live in."));

    let (_, stderr, success) = run_gtd(tmp.path(), &["context", "drop", "inbox"]);
    assert!(!success);
    assert!(stderr.contains("refusing to drop 'inbox'"));
    let (_, _, success) = run_gtd(tmp.path(), &["context", "add", "waiting_for"]);
    assert!(!success);
}

#[test]
fn test_projects_listing() {
    let tmp = tempfile::TempDir::new().unwrap();
    init_workspace(tmp.path());
    run_gtd_ok(
        tmp.path(),
        &["add", "project", "Garden", "--first", "Buy seeds", "--context", "errands"],
    );
    run_gtd_ok(
        tmp.path(),
        &["add", "project", "Taxes", "--first", "Find forms", "--context", "home", "--due", "2027-04-15"],
    );

    let out = run_gtd_ok(tmp.path(), &["projects"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Taxes (due 2027-04-15) (open: 1)"));
    assert!(lines[1].contains("Garden (open: 1)"));

    let out = run_gtd_ok(tmp.path(), &["--json", "projects"]);
    let list: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(list[0]["title"], "Taxes");
    assert_eq!(list[1]["stalled"], false);
}
