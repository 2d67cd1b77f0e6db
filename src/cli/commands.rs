use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gtd", about = concat!("gtd v", env!("CARGO_PKG_VERSION"), " - a task database you edit as Markdown"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "workspace-dir", global = true)]
    pub workspace_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the workspace files that are missing
    Init,
    /// Render the store into the Markdown views
    Build,
    /// Read completions back from the views and prune the inbox
    Sync(SyncArgs),
    /// Add an action or a project
    Add(AddCmd),
    /// List or edit the allowed contexts
    Context(ContextCmd),
    /// List all projects
    Projects,
}

// ---------------------------------------------------------------------------
// Sync args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SyncArgs {
    /// Do not ask for next actions on stalled projects
    #[arg(long)]
    pub no_prompt: bool,
}

// ---------------------------------------------------------------------------
// Add args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddCmd {
    #[command(subcommand)]
    pub kind: AddKind,
}

#[derive(Subcommand)]
pub enum AddKind {
    /// Add a single next action
    Action(AddActionArgs),
    /// Add a project together with its first next action
    Project(AddProjectArgs),
}

#[derive(Args)]
pub struct AddActionArgs {
    /// Action title
    pub title: String,
    /// Context (e.g. phone, @errands)
    #[arg(long)]
    pub context: Option<String>,
    /// Project id this action belongs to
    #[arg(long)]
    pub project: Option<String>,
    /// Initial state (active, waiting, someday)
    #[arg(long)]
    pub state: Option<String>,
    /// Who you are waiting on (with --state waiting)
    #[arg(long)]
    pub waiting_for: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct AddProjectArgs {
    /// Project title
    pub title: String,
    /// Title of the first next action
    #[arg(long)]
    pub first: String,
    /// Context of the first next action
    #[arg(long)]
    pub context: Option<String>,
    /// Initial state (active, someday)
    #[arg(long)]
    pub state: Option<String>,
    /// Project due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    /// Project notes
    #[arg(long)]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Context args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ContextCmd {
    #[command(subcommand)]
    pub action: ContextAction,
}

#[derive(Subcommand)]
pub enum ContextAction {
    /// List configured contexts
    List,
    /// Allow a new context
    Add(ContextNameArg),
    /// Remove a context
    Drop(ContextNameArg),
}

#[derive(Args)]
pub struct ContextNameArg {
    /// Context name
    pub name: String,
}
