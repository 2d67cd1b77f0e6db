use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionState {
    Active,
    Waiting,
    Someday,
    Completed,
    Dropped,
}

impl ActionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionState::Active => "active",
            ActionState::Waiting => "waiting",
            ActionState::Someday => "someday",
            ActionState::Completed => "completed",
            ActionState::Dropped => "dropped",
        }
    }

    /// Active and waiting actions keep their project moving.
    pub fn is_open(self) -> bool {
        matches!(self, ActionState::Active | ActionState::Waiting)
    }

    /// Completed and dropped actions are finished and never created fresh.
    pub fn is_terminal(self) -> bool {
        matches!(self, ActionState::Completed | ActionState::Dropped)
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(ActionState::Active),
            "waiting" => Ok(ActionState::Waiting),
            "someday" => Ok(ActionState::Someday),
            "completed" => Ok(ActionState::Completed),
            "dropped" => Ok(ActionState::Dropped),
            other => Err(format!("invalid action state \"{}\"", other)),
        }
    }
}

/// A single performable task. The id lives in the store map key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub title: String,
    /// Owning project id (`p_…`)
    #[serde(default)]
    pub project: Option<String>,
    pub state: ActionState,
    /// Required unless the action is waiting
    #[serde(default)]
    pub context: Option<String>,
    /// Set only while waiting
    #[serde(default)]
    pub waiting_for: Option<String>,
    pub created: DateTime<Utc>,
    pub last_touched: DateTime<Utc>,
    #[serde(default)]
    pub completed: Option<DateTime<Utc>>,
    /// Set iff the action is waiting
    #[serde(default)]
    pub waiting_since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

impl Action {
    /// A new active action in the given context.
    pub fn new(title: String, context: String, now: DateTime<Utc>) -> Self {
        Action {
            title,
            project: None,
            state: ActionState::Active,
            context: Some(context),
            waiting_for: None,
            created: now,
            last_touched: now,
            completed: None,
            waiting_since: None,
            due: None,
            notes: String::new(),
        }
    }

    /// Move the action to `waiting`, recording who it waits on.
    pub fn set_waiting(&mut self, waiting_for: String, now: DateTime<Utc>) {
        self.state = ActionState::Waiting;
        self.waiting_for = Some(waiting_for);
        self.waiting_since = Some(now);
        self.last_touched = now;
    }

    /// Mark the action completed. Returns false (and changes nothing) when
    /// the action is already completed. A dropped action can still be
    /// checked off.
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.state == ActionState::Completed {
            return false;
        }
        self.state = ActionState::Completed;
        self.completed = Some(now);
        self.last_touched = now;
        self.waiting_since = None;
        self.waiting_for = None;
        true
    }

    /// Context used for grouping. Hand-edited stores may lack one.
    pub fn context_or_inbox(&self) -> &str {
        self.context
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or("inbox")
    }
}
