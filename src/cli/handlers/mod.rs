mod init;

pub use init::cmd_init;

use std::io;
use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::cli::prompt::ConsolePrompter;
use crate::io::config_io;
use crate::io::store_io::save_store;
use crate::io::workspace_io::{self, WorkspaceError};
use crate::model::store;
use crate::model::workspace::Workspace;
use crate::ops::action_ops::{self, ActionDraft, ProjectDraft};
use crate::ops::build::write_views;
use crate::ops::context_ops;
use crate::ops::reconcile::{self, Decline, NextActionSource};
use crate::ops::sync::{SyncOptions, sync};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;

    let start = match cli.workspace_dir {
        // Init may create the directory, so it is not resolved up front
        Some(ref dir) if matches!(cli.command, Commands::Init) => PathBuf::from(dir),
        Some(ref dir) => std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&start),

        // Views
        Commands::Build => cmd_build(&start),
        Commands::Sync(args) => cmd_sync(&start, args, json),

        // Creation
        Commands::Add(cmd) => match cmd.kind {
            AddKind::Action(args) => cmd_add_action(&start, args),
            AddKind::Project(args) => cmd_add_project(&start, args),
        },

        // Contexts
        Commands::Context(cmd) => match cmd.action {
            ContextAction::List => cmd_context_list(&start, json),
            ContextAction::Add(arg) => cmd_context_add(&start, &arg.name),
            ContextAction::Drop(arg) => cmd_context_drop(&start, &arg.name),
        },

        Commands::Projects => cmd_projects(&start, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_workspace_from(start: &Path) -> Result<Workspace, WorkspaceError> {
    let root = workspace_io::discover_workspace(start)?;
    workspace_io::load_workspace(&root)
}

// ---------------------------------------------------------------------------
// View commands
// ---------------------------------------------------------------------------

fn cmd_build(start: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_from(start)?;
    let written = write_views(&ws.paths, &ws.store)?;
    println!(
        "Built {} views in {}/",
        written.len(),
        ws.paths.views_dir.display()
    );
    Ok(())
}

fn cmd_sync(start: &Path, args: SyncArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut ws = load_workspace_from(start)?;
    let now = store::now();
    let options = SyncOptions {
        prompt_next: ws.config.sync.prompt_next && !args.no_prompt,
        now,
    };

    let report = {
        let stdin = io::stdin();
        let mut prompter = ConsolePrompter::new(stdin.lock(), io::stdout(), ws.config.contexts());
        let mut decline = Decline;
        let next: &mut dyn NextActionSource = if options.prompt_next {
            &mut prompter
        } else {
            &mut decline
        };
        sync(&mut ws.store, &ws.paths, options, next)?
    };

    save_store(&ws.paths, &mut ws.store, now)?;

    let still_stalled = reconcile::stalled_projects(&ws.store);
    if json {
        let out = SyncJson {
            report: &report,
            still_stalled,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_sync_report(&report, &ws.store, &still_stalled) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Creation commands
// ---------------------------------------------------------------------------

fn cmd_add_action(start: &Path, args: AddActionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut ws = load_workspace_from(start)?;
    let now = store::now();
    let draft = ActionDraft {
        title: args.title,
        state: args.state,
        context: args.context,
        waiting_for: args.waiting_for,
        project: args.project,
        due: args.due,
        notes: args.notes,
    };

    let action = action_ops::build_action(&draft, &ws.store, &ws.config.contexts(), now)?;
    let title = action.title.clone();
    let id = ws.store.insert_action(action);
    save_store(&ws.paths, &mut ws.store, now)?;

    log::info!("added action {}: {}", id, title);
    println!("{}", id);
    Ok(())
}

fn cmd_add_project(start: &Path, args: AddProjectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut ws = load_workspace_from(start)?;
    let now = store::now();
    let draft = ProjectDraft {
        title: args.title,
        state: args.state,
        due: args.due,
        notes: args.notes,
        first_action: ActionDraft {
            title: args.first,
            context: args.context,
            ..Default::default()
        },
    };

    let (project, first) = action_ops::build_project(&draft, &ws.config.contexts(), now)?;
    let (pid, aid) = action_ops::add_project(&mut ws.store, project, first);
    save_store(&ws.paths, &mut ws.store, now)?;

    log::info!("added project {} with first action {}", pid, aid);
    println!("{}", pid);
    println!("{}", aid);
    Ok(())
}

// ---------------------------------------------------------------------------
// Context commands
// ---------------------------------------------------------------------------

fn cmd_context_list(start: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_from(start)?;
    let contexts = ws.config.contexts();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&ContextListJson { contexts })?
        );
    } else if contexts.is_empty() {
        println!("No contexts configured. Add one with `gtd context add <name>`.");
    } else {
        for c in &contexts {
            match context_ops::agenda_name(c) {
                Some(who) => println!("@{}  (agenda: {})", c, who),
                None => println!("@{}", c),
            }
        }
    }
    Ok(())
}

fn cmd_context_add(start: &Path, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_from(start)?;
    let (_, mut doc) = config_io::read_config(&ws.paths.config)?;
    let mut contexts = ws.config.contexts();

    let (name, added) = context_ops::add_context(&mut contexts, name)?;
    if !added {
        println!("Context '{}' already exists", name);
        return Ok(());
    }
    config_io::set_contexts(&mut doc, &contexts);
    config_io::write_config(&ws.paths.config, &doc)?;
    println!("Added context '{}'", name);
    Ok(())
}

fn cmd_context_drop(start: &Path, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_from(start)?;
    let (_, mut doc) = config_io::read_config(&ws.paths.config)?;
    let mut contexts = ws.config.contexts();

    let name = context_ops::drop_context(&mut contexts, name)?;
    config_io::set_contexts(&mut doc, &contexts);
    config_io::write_config(&ws.paths.config, &doc)?;

    let stranded = ws
        .store
        .actions
        .values()
        .filter(|a| a.state.is_open() && a.context.as_deref() == Some(name.as_str()))
        .count();
    println!("Dropped context '{}'", name);
    if stranded > 0 {
        eprintln!(
            "Note: {} open action(s) still use @{}; they keep it until edited.",
            stranded, name
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

fn cmd_projects(start: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ws = load_workspace_from(start)?;
    let projects = sorted_projects(&ws.store);

    if json {
        let out: Vec<ProjectJson> = projects
            .iter()
            .map(|(id, p)| project_to_json(id, p, &ws.store, reconcile::is_stalled(&ws.store, id)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No projects yet. Add one with `gtd add project <title> --first <action>`.");
        return Ok(());
    }
    for (id, p) in projects {
        let stalled = reconcile::is_stalled(&ws.store, id);
        println!("{}", format_project_line(id, p, &ws.store, stalled));
    }
    Ok(())
}
