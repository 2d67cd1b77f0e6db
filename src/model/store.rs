use chrono::{DateTime, SubsecRound, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::action::Action;
use super::project::Project;

/// Current store format version
pub const STORE_VERSION: u32 = 1;

pub const ACTION_PREFIX: &str = "a";
pub const PROJECT_PREFIX: &str = "p";

/// Current time, truncated to whole seconds so the store stays readable.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Which kind of entity an id names, derived from its prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Action,
    Project,
}

impl EntityKind {
    pub fn of(id: &str) -> Option<EntityKind> {
        let (prefix, rest) = id.split_once('_')?;
        if rest.is_empty() {
            return None;
        }
        match prefix {
            ACTION_PREFIX => Some(EntityKind::Action),
            PROJECT_PREFIX => Some(EntityKind::Project),
            _ => None,
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            EntityKind::Action => ACTION_PREFIX,
            EntityKind::Project => PROJECT_PREFIX,
        }
    }
}

/// A borrowed entity looked up by id
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Action(&'a Action),
    Project(&'a Project),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(default = "default_version")]
    pub version: u32,
}

fn default_version() -> u32 {
    STORE_VERSION
}

/// The authoritative task database (`master.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub meta: Meta,
    #[serde(default)]
    pub projects: IndexMap<String, Project>,
    #[serde(default)]
    pub actions: IndexMap<String, Action>,
}

impl Store {
    pub fn new(now: DateTime<Utc>) -> Self {
        Store {
            meta: Meta {
                created: now,
                updated: now,
                version: STORE_VERSION,
            },
            projects: IndexMap::new(),
            actions: IndexMap::new(),
        }
    }

    /// Look up an entity, using the id prefix to pick the map.
    pub fn lookup(&self, id: &str) -> Option<EntityRef<'_>> {
        match EntityKind::of(id)? {
            EntityKind::Action => self.actions.get(id).map(EntityRef::Action),
            EntityKind::Project => self.projects.get(id).map(EntityRef::Project),
        }
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.actions.contains_key(id) || self.projects.contains_key(id)
    }

    /// Generate an id like `a_3f9c2a1b` that is not yet used in this store.
    pub fn fresh_id(&self, kind: EntityKind) -> String {
        loop {
            let hex = uuid::Uuid::new_v4().simple().to_string();
            let id = format!("{}_{}", kind.prefix(), &hex[..8]);
            if !self.contains_id(&id) {
                return id;
            }
        }
    }

    /// Insert an action under a fresh id and return the id.
    pub fn insert_action(&mut self, action: Action) -> String {
        let id = self.fresh_id(EntityKind::Action);
        self.actions.insert(id.clone(), action);
        id
    }

    /// Insert a project under a fresh id and return the id.
    pub fn insert_project(&mut self, project: Project) -> String {
        let id = self.fresh_id(EntityKind::Project);
        self.projects.insert(id.clone(), project);
        id
    }

    /// Title of the action's owning project, if that project exists.
    pub fn project_title(&self, action: &Action) -> Option<&str> {
        let pid = action.project.as_deref()?;
        self.projects.get(pid).map(|p| p.title.as_str())
    }

    /// Actions that reference the given project
    pub fn actions_for_project<'a>(
        &'a self,
        project_id: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Action)> + 'a {
        self.actions
            .iter()
            .filter(move |(_, a)| a.project.as_deref() == Some(project_id))
    }

    /// Number of active or waiting actions attached to the project.
    pub fn open_action_count(&self, project_id: &str) -> usize {
        self.actions_for_project(project_id)
            .filter(|(_, a)| a.state.is_open())
            .count()
    }

    /// Keys whose prefix does not match the map they live in.
    pub fn misplaced_ids(&self) -> Vec<(String, EntityKind)> {
        let mut bad = Vec::new();
        for id in self.actions.keys() {
            if EntityKind::of(id) != Some(EntityKind::Action) {
                bad.push((id.clone(), EntityKind::Action));
            }
        }
        for id in self.projects.keys() {
            if EntityKind::of(id) != Some(EntityKind::Project) {
                bad.push((id.clone(), EntityKind::Project));
            }
        }
        bad
    }
}
