use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a project (projects never wait)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectState {
    Active,
    Someday,
    Completed,
    Dropped,
}

impl ProjectState {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectState::Active => "active",
            ProjectState::Someday => "someday",
            ProjectState::Completed => "completed",
            ProjectState::Dropped => "dropped",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ProjectState::Completed | ProjectState::Dropped)
    }
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(ProjectState::Active),
            "someday" => Ok(ProjectState::Someday),
            "completed" => Ok(ProjectState::Completed),
            "dropped" => Ok(ProjectState::Dropped),
            other => Err(format!("invalid project state \"{}\"", other)),
        }
    }
}

/// A multi-step outcome, tracked through the actions that reference it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub state: ProjectState,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub reviewed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
}

impl Project {
    pub fn new(title: String, now: DateTime<Utc>) -> Self {
        Project {
            title,
            state: ProjectState::Active,
            created: now,
            reviewed: None,
            completed: None,
            due: None,
            notes: String::new(),
        }
    }

    /// Mark the project completed. Already completed projects are left alone.
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.state == ProjectState::Completed {
            return false;
        }
        self.state = ProjectState::Completed;
        self.completed = Some(now);
        true
    }
}
