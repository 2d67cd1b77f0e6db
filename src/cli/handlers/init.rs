use std::path::Path;

use crate::io::workspace_io;
use crate::model::store;
use crate::model::workspace::WorkspacePaths;

const CONFIG_TOML_TEMPLATE: &str = r##"# Contexts an action can live in. Edit freely, or use:
#   gtd context add <name> / gtd context drop <name>
# "waiting" and "waiting_for" are states, not contexts.
# Contexts named agenda_<who> are collected in views/agenda.md.
contexts = ["computer", "errands", "home", "inbox", "phone"]

[sync]
# Ask for a next action for every stalled project during `gtd sync`.
# `gtd sync --no-prompt` skips the questions for one run.
prompt_next = true
"##;

pub fn cmd_init(root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !root.is_dir() {
        std::fs::create_dir_all(root)?;
    }
    if let Some(parent) = root.parent()
        && let Ok(outer) = workspace_io::discover_workspace(parent)
    {
        eprintln!("Note: enclosing workspace found at {}/", outer.display());
        eprintln!("Creating a new workspace in {}/", root.display());
    }

    let paths = WorkspacePaths::new(root);
    let created = workspace_io::init_workspace(&paths, CONFIG_TOML_TEMPLATE, store::now())?;

    if created.is_empty() {
        println!("Workspace already initialized in {}/", root.display());
        return Ok(());
    }
    println!("Initialized gtd workspace in {}/", root.display());
    for path in &created {
        let shown = path.strip_prefix(root).unwrap_or(path);
        println!("  created {}", shown.display());
    }
    Ok(())
}
