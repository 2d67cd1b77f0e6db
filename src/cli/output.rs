use chrono::NaiveDate;
use serde::Serialize;

use crate::model::project::{Project, ProjectState};
use crate::model::store::Store;
use crate::ops::sync::SyncReport;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ProjectJson {
    pub id: String,
    pub title: String,
    pub state: ProjectState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    pub open_actions: usize,
    pub stalled: bool,
}

#[derive(Serialize)]
pub struct ContextListJson {
    pub contexts: Vec<String>,
}

#[derive(Serialize)]
pub struct SyncJson<'a> {
    #[serde(flatten)]
    pub report: &'a SyncReport,
    /// Projects still stalled once next actions were offered
    pub still_stalled: Vec<String>,
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

pub fn project_to_json(id: &str, project: &Project, store: &Store, stalled: bool) -> ProjectJson {
    ProjectJson {
        id: id.to_string(),
        title: project.title.clone(),
        state: project.state,
        due: project.due,
        open_actions: store.open_action_count(id),
        stalled,
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// Projects ordered by due date (missing last), then title.
pub fn sorted_projects(store: &Store) -> Vec<(&String, &Project)> {
    let mut projects: Vec<_> = store.projects.iter().collect();
    projects.sort_by_key(|(id, p)| (p.due.unwrap_or(NaiveDate::MAX), p.title.to_lowercase(), *id));
    projects
}

/// `p_1a2b3c4d  active     Move house (due 2027-03-01) (open: 2)`
pub fn format_project_line(id: &str, project: &Project, store: &Store, stalled: bool) -> String {
    let mut line = format!("{}  {:<10} {}", id, project.state.as_str(), project.title);
    if let Some(due) = project.due {
        line.push_str(&format!(" (due {})", due));
    }
    line.push_str(&format!(" (open: {})", store.open_action_count(id)));
    if stalled {
        line.push_str(" [stalled]");
    }
    line
}

/// Human-readable sync summary, one line per fact worth reporting.
pub fn format_sync_report(report: &SyncReport, store: &Store, still_stalled: &[String]) -> Vec<String> {
    let mut lines = Vec::new();

    for id in &report.created_actions {
        let title = store.actions.get(id).map_or("", |a| a.title.as_str());
        lines.push(format!("Added next action {}: {}", id, title));
    }
    if report.pruned_captures > 0 {
        lines.push(format!(
            "Pruned {} checked capture item(s) from inbox/inbox.md",
            report.pruned_captures
        ));
    }
    if !report.unrecognized.is_empty() {
        lines.push(format!(
            "Ignored checked items with unrecognized ids: {}",
            report.unrecognized.join(", ")
        ));
    }
    if !still_stalled.is_empty() {
        lines.push(format!("Stalled projects ({}):", still_stalled.len()));
        for id in still_stalled {
            let title = store.projects.get(id).map_or("", |p| p.title.as_str());
            lines.push(format!("  {}  {}", id, title));
        }
    }
    lines.push(format!(
        "Sync complete. Marked completed: {} actions, {} projects.",
        report.completed_actions.len(),
        report.completed_projects.len(),
    ));
    lines
}
