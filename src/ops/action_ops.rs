use chrono::{DateTime, NaiveDate, Utc};

use crate::model::action::{Action, ActionState};
use crate::model::project::{Project, ProjectState};
use crate::model::store::Store;
use crate::ops::context_ops::{is_reserved, normalize_context};
use crate::parse::marker::{ANNOTATION_OPEN, FORCE_COMPLETE};

/// Error type for creating actions and projects
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} title is required")]
    EmptyTitle(&'static str),
    #[error("title may not contain XXX (sync reads it as done)")]
    ForceMarkerInTitle,
    #[error("title may not contain <!-- (sync reads it as an id annotation)")]
    AnnotationInTitle,
    #[error("{0}")]
    InvalidState(String),
    #[error("new actions must be active, waiting or someday")]
    TerminalState,
    #[error("a context is required (configured: {0})")]
    MissingContext(String),
    #[error("'{0}' is a state, not a context")]
    ReservedContext(String),
    #[error("unknown context '{0}'. Add it with `gtd context add {0}`")]
    UnknownContext(String),
    #[error("no project with id {0}")]
    UnknownProject(String),
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("no contexts configured. Add contexts with `gtd context add ...`")]
    NoContexts,
}

/// Fields for a new action, as entered by the user
#[derive(Debug, Clone, Default)]
pub struct ActionDraft {
    pub title: String,
    pub state: Option<String>,
    pub context: Option<String>,
    pub waiting_for: Option<String>,
    pub project: Option<String>,
    pub due: Option<String>,
    pub notes: Option<String>,
}

/// Fields for a new project and its required first action
#[derive(Debug, Clone, Default)]
pub struct ProjectDraft {
    pub title: String,
    pub state: Option<String>,
    pub due: Option<String>,
    pub notes: Option<String>,
    pub first_action: ActionDraft,
}

/// Default `waiting_for` when none is given
pub const UNSPECIFIED_WAITING: &str = "unspecified";

/// Parse an optional `YYYY-MM-DD` date. Blank means none.
pub fn parse_due(raw: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ValidationError::InvalidDate(s.to_string())),
    }
}

pub fn validate_title(raw: &str, what: &'static str) -> Result<String, ValidationError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle(what));
    }
    if title.contains(FORCE_COMPLETE) {
        return Err(ValidationError::ForceMarkerInTitle);
    }
    if title.contains(ANNOTATION_OPEN) {
        return Err(ValidationError::AnnotationInTitle);
    }
    Ok(title.to_string())
}

/// Resolve a context against the configured list.
pub fn validate_context(raw: &str, contexts: &[String]) -> Result<String, ValidationError> {
    let name = normalize_context(raw);
    if name.is_empty() {
        return Err(ValidationError::MissingContext(contexts.join(", ")));
    }
    if is_reserved(&name) {
        return Err(ValidationError::ReservedContext(name));
    }
    if !contexts.contains(&name) {
        return Err(ValidationError::UnknownContext(name));
    }
    Ok(name)
}

/// Build a validated action. Ids are assigned on insert, not here.
pub fn build_action(
    draft: &ActionDraft,
    store: &Store,
    contexts: &[String],
    now: DateTime<Utc>,
) -> Result<Action, ValidationError> {
    if let Some(pid) = &draft.project
        && !store.projects.contains_key(pid)
    {
        return Err(ValidationError::UnknownProject(pid.clone()));
    }
    let mut action = build_unattached(draft, contexts, now)?;
    action.project = draft.project.clone();
    Ok(action)
}

/// Build a validated action without a project. Used where the caller
/// attaches the project itself.
pub fn build_unattached(
    draft: &ActionDraft,
    contexts: &[String],
    now: DateTime<Utc>,
) -> Result<Action, ValidationError> {
    let title = validate_title(&draft.title, "action")?;

    let state = match draft.state.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse::<ActionState>().map_err(ValidationError::InvalidState)?,
        None => ActionState::Active,
    };
    if state.is_terminal() {
        return Err(ValidationError::TerminalState);
    }

    let context = match (state, draft.context.as_deref()) {
        (ActionState::Waiting, None) => None,
        (_, Some(raw)) => Some(validate_context(raw, contexts)?),
        (_, None) if contexts.is_empty() => return Err(ValidationError::NoContexts),
        (_, None) => return Err(ValidationError::MissingContext(contexts.join(", "))),
    };

    let mut action = Action {
        title,
        project: None,
        state,
        context,
        waiting_for: None,
        created: now,
        last_touched: now,
        completed: None,
        waiting_since: None,
        due: parse_due(draft.due.as_deref())?,
        notes: draft.notes.clone().unwrap_or_default().trim().to_string(),
    };

    if state == ActionState::Waiting {
        let who = draft
            .waiting_for
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .unwrap_or(UNSPECIFIED_WAITING);
        action.set_waiting(who.to_string(), now);
    }

    Ok(action)
}

/// Build a validated project and its first action. The first action
/// follows the project's state unless the project is active.
pub fn build_project(
    draft: &ProjectDraft,
    contexts: &[String],
    now: DateTime<Utc>,
) -> Result<(Project, Action), ValidationError> {
    let title = validate_title(&draft.title, "project")?;
    let state = match draft.state.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse::<ProjectState>().map_err(ValidationError::InvalidState)?,
        None => ProjectState::Active,
    };
    if state.is_terminal() {
        return Err(ValidationError::TerminalState);
    }

    let project = Project {
        title,
        state,
        created: now,
        reviewed: None,
        completed: None,
        due: parse_due(draft.due.as_deref())?,
        notes: draft.notes.clone().unwrap_or_default().trim().to_string(),
    };

    let mut first = draft.first_action.clone();
    if state == ProjectState::Someday && first.state.is_none() {
        first.state = Some(ActionState::Someday.as_str().to_string());
    }
    let first = build_unattached(&first, contexts, now)
        .map_err(|e| match e {
            ValidationError::EmptyTitle(_) => ValidationError::EmptyTitle("first action"),
            other => other,
        })?;

    Ok((project, first))
}

/// Insert a project and its first action. Returns `(project_id, action_id)`.
pub fn add_project(store: &mut Store, project: Project, mut first: Action) -> (String, String) {
    let pid = store.insert_project(project);
    first.project = Some(pid.clone());
    let aid = store.insert_action(first);
    (pid, aid)
}
