use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::io::recovery::atomic_write;
use crate::model::action::{Action, ActionState};
use crate::model::project::{Project, ProjectState};
use crate::model::store::Store;
use crate::model::view::ViewKind;
use crate::model::workspace::WorkspacePaths;
use crate::ops::context_ops::agenda_name;
use crate::ops::reconcile::stalled_projects;
use crate::parse::marker::{FORCE_COMPLETE, annotation};

/// Error type for reading and writing the views directory
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("{} not found. Run `gtd init` first.", .0.display())]
    MissingViews(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("next-action prompt failed: {0}")]
    Prompt(#[source] std::io::Error),
}

const UNSPECIFIED: &str = "Unspecified";

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Render every view. Same store, same bytes.
pub fn render_all(store: &Store) -> Vec<(ViewKind, String)> {
    ViewKind::ALL
        .iter()
        .map(|&kind| (kind, render_view(kind, store)))
        .collect()
}

/// Render a single view to Markdown.
pub fn render_view(kind: ViewKind, store: &Store) -> String {
    let mut doc = Doc::new(kind);
    match kind {
        ViewKind::NextActions => next_actions(store, &mut doc),
        ViewKind::Projects => projects(store, &mut doc),
        ViewKind::Someday => someday(store, &mut doc),
        ViewKind::WaitingFor => waiting_for(store, &mut doc),
        ViewKind::Agenda => agenda(store, &mut doc),
        ViewKind::StalledProjects => stalled(store, &mut doc),
    }
    doc.finish()
}

/// Render all views into the views directory, replacing what is there.
///
/// Read-only with respect to the store.
pub fn write_views(paths: &WorkspacePaths, store: &Store) -> Result<Vec<PathBuf>, ViewError> {
    if !paths.views_dir.is_dir() {
        return Err(ViewError::MissingViews(paths.views_dir.clone()));
    }

    warn_force_complete_titles(store);

    let mut written = Vec::new();
    for (kind, content) in render_all(store) {
        let path = paths.view(kind);
        atomic_write(&path, content.as_bytes()).map_err(|e| ViewError::WriteError {
            path: path.clone(),
            source: e,
        })?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

// ---------------------------------------------------------------------------
// Document assembly
// ---------------------------------------------------------------------------

struct Doc {
    kind: ViewKind,
    lines: Vec<String>,
    items: usize,
}

impl Doc {
    fn new(kind: ViewKind) -> Self {
        Doc {
            kind,
            lines: vec![format!("# {}", kind.title()), String::new()],
            items: 0,
        }
    }

    fn heading(&mut self, text: &str) {
        self.lines.push(format!("## {}", text));
        self.lines.push(String::new());
    }

    fn item(&mut self, line: String) {
        self.lines.push(line);
        self.items += 1;
    }

    fn end_section(&mut self) {
        self.lines.push(String::new());
    }

    fn finish(mut self) -> String {
        if self.items == 0 && self.lines.len() == 2 {
            self.lines.push(self.kind.placeholder().to_string());
        }
        let mut out = self.lines.join("\n").trim_end().to_string();
        out.push('\n');
        out
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

type SortKey = (NaiveDate, String, String, String);

/// Missing due dates sort after every real date.
fn due_key(due: Option<NaiveDate>) -> NaiveDate {
    due.unwrap_or(NaiveDate::MAX)
}

fn due_title_key(due: Option<NaiveDate>, title: &str, id: &str) -> SortKey {
    (
        due_key(due),
        title.to_lowercase(),
        title.to_string(),
        id.to_string(),
    )
}

fn title_key(title: &str, id: &str) -> SortKey {
    due_title_key(None, title, id)
}

fn sorted_actions<'a, F>(
    store: &'a Store,
    mut pick: F,
    key: fn(&str, &Action) -> SortKey,
) -> Vec<(&'a str, &'a Action)>
where
    F: FnMut(&Action) -> bool,
{
    let mut out: Vec<(&str, &Action)> = store
        .actions
        .iter()
        .filter(|&(_, a)| pick(a))
        .map(|(id, a)| (id.as_str(), a))
        .collect();
    out.sort_by_cached_key(|(id, a)| key(id, a));
    out
}

fn action_due_title(id: &str, a: &Action) -> SortKey {
    due_title_key(a.due, &a.title, id)
}

fn action_title(id: &str, a: &Action) -> SortKey {
    title_key(&a.title, id)
}

fn sorted_projects<'a>(
    store: &'a Store,
    state: ProjectState,
    key: fn(&str, &Project) -> SortKey,
) -> Vec<(&'a str, &'a Project)> {
    let mut out: Vec<(&str, &Project)> = store
        .projects
        .iter()
        .filter(|&(_, p)| p.state == state)
        .map(|(id, p)| (id.as_str(), p))
        .collect();
    out.sort_by_cached_key(|(id, p)| key(id, p));
    out
}

fn project_title(id: &str, p: &Project) -> SortKey {
    title_key(&p.title, id)
}

// ---------------------------------------------------------------------------
// Line formats
// ---------------------------------------------------------------------------

fn due_suffix(due: Option<NaiveDate>) -> String {
    match due {
        Some(d) => format!(" (due {})", d),
        None => String::new(),
    }
}

/// `<title> [<project>] (due <date>)`, without bullet or annotation
fn action_text(store: &Store, action: &Action) -> String {
    let mut text = action.title.trim().to_string();
    if let Some(project) = store.project_title(action) {
        text.push_str(&format!(" [{}]", project.trim()));
    }
    text.push_str(&due_suffix(action.due));
    text
}

fn checkbox_line(text: String, id: &str) -> String {
    format!("- [ ] {} {}", text, annotation(id))
}

fn plain_line(text: String, id: &str) -> String {
    format!("- {} {}", text, annotation(id))
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

fn next_actions(store: &Store, doc: &mut Doc) {
    let mut groups: BTreeMap<&str, Vec<(&str, &Action)>> = BTreeMap::new();
    for (id, a) in sorted_actions(store, |a| a.state == ActionState::Active, action_due_title) {
        groups.entry(a.context_or_inbox()).or_default().push((id, a));
    }

    for (context, actions) in groups {
        doc.heading(&format!("@{}", context));
        for (id, a) in actions {
            doc.item(checkbox_line(action_text(store, a), id));
        }
        doc.end_section();
    }
}

fn projects(store: &Store, doc: &mut Doc) {
    for (id, p) in sorted_projects(store, ProjectState::Active, project_title) {
        let text = format!(
            "{}{} (open: {})",
            p.title.trim(),
            due_suffix(p.due),
            store.open_action_count(id)
        );
        doc.item(plain_line(text, id));
    }
}

fn someday(store: &Store, doc: &mut Doc) {
    doc.heading("Projects");
    let projects = sorted_projects(store, ProjectState::Someday, project_title);
    if projects.is_empty() {
        doc.lines.push("_No someday projects._".to_string());
    }
    for (id, p) in projects {
        doc.item(plain_line(
            format!("{}{}", p.title.trim(), due_suffix(p.due)),
            id,
        ));
    }
    doc.end_section();

    doc.heading("Actions");
    let actions = sorted_actions(store, |a| a.state == ActionState::Someday, action_title);
    if actions.is_empty() {
        doc.lines.push("_No someday actions._".to_string());
    }
    for (id, a) in actions {
        doc.item(plain_line(action_text(store, a), id));
    }
    doc.end_section();
}

fn waiting_for(store: &Store, doc: &mut Doc) {
    // Grouped by the exact value, ordered case-insensitively.
    let mut groups: BTreeMap<(String, &str), Vec<(&str, &Action)>> = BTreeMap::new();
    for (id, a) in sorted_actions(store, |a| a.state == ActionState::Waiting, action_due_title) {
        let who = a
            .waiting_for
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .unwrap_or(UNSPECIFIED);
        groups
            .entry((who.to_lowercase(), who))
            .or_default()
            .push((id, a));
    }

    for ((_, who), actions) in groups {
        doc.heading(who);
        for (id, a) in actions {
            let mut text = action_text(store, a);
            match a.waiting_since {
                Some(since) => text.push_str(&format!(
                    " (waiting for {} since {})",
                    who,
                    since.format("%Y-%m-%d")
                )),
                None => text.push_str(&format!(" (waiting for {})", who)),
            }
            doc.item(checkbox_line(text, id));
        }
        doc.end_section();
    }
}

fn agenda(store: &Store, doc: &mut Doc) {
    let mut groups: BTreeMap<&str, Vec<(&str, &Action)>> = BTreeMap::new();
    let picked = sorted_actions(
        store,
        |a| a.state == ActionState::Active && a.context.as_deref().and_then(agenda_name).is_some(),
        action_due_title,
    );
    for (id, a) in picked {
        if let Some(name) = a.context.as_deref().and_then(agenda_name) {
            groups.entry(name).or_default().push((id, a));
        }
    }

    for (name, actions) in groups {
        doc.heading(name);
        for (id, a) in actions {
            doc.item(checkbox_line(action_text(store, a), id));
        }
        doc.end_section();
    }
}

fn stalled(store: &Store, doc: &mut Doc) {
    for id in stalled_projects(store) {
        if let Some(p) = store.projects.get(&id) {
            doc.item(plain_line(
                format!("{}{}", p.title.trim(), due_suffix(p.due)),
                &id,
            ));
        }
    }
}

/// A title containing the force-complete marker completes itself on the
/// next sync.
fn warn_force_complete_titles(store: &Store) {
    for (id, a) in &store.actions {
        if !a.state.is_terminal() && a.title.contains(FORCE_COMPLETE) {
            log::warn!("action {} title contains {}; sync will complete it", id, FORCE_COMPLETE);
        }
    }
    for (id, p) in &store.projects {
        if !p.state.is_terminal() && p.title.contains(FORCE_COMPLETE) {
            log::warn!("project {} title contains {}; sync will complete it", id, FORCE_COMPLETE);
        }
    }
}
