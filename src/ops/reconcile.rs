use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::action::Action;
use crate::model::project::{Project, ProjectState};
use crate::model::store::{EntityKind, Store};

/// id -> done, in the order ids were first seen
pub type CompletionMap = IndexMap<String, bool>;

/// Supplies a next action for a stalled project, or declines.
///
/// Called once per stalled project. The returned action is inserted under a
/// fresh id and always attached to the project it was asked about.
pub trait NextActionSource {
    fn next_action(
        &mut self,
        project_id: &str,
        project: &Project,
        now: DateTime<Utc>,
    ) -> std::io::Result<Option<Action>>;
}

/// Never creates anything
pub struct Decline;

impl NextActionSource for Decline {
    fn next_action(
        &mut self,
        _project_id: &str,
        _project: &Project,
        _now: DateTime<Utc>,
    ) -> std::io::Result<Option<Action>> {
        Ok(None)
    }
}

/// What applying a completion map changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Applied {
    pub completed_actions: Vec<String>,
    pub completed_projects: Vec<String>,
    /// Checked ids whose prefix names no entity kind
    pub unrecognized: Vec<String>,
}

/// Apply `done = true` entries to the store. Nothing is ever un-completed;
/// unknown ids and already completed entities are left alone.
pub fn apply_completions(store: &mut Store, map: &CompletionMap, now: DateTime<Utc>) -> Applied {
    let mut applied = Applied::default();

    for (id, &done) in map {
        if !done {
            continue;
        }
        match EntityKind::of(id) {
            Some(EntityKind::Action) => {
                if let Some(action) = store.actions.get_mut(id)
                    && action.complete(now)
                {
                    log::info!("completed action {}: {}", id, action.title);
                    applied.completed_actions.push(id.clone());
                }
            }
            Some(EntityKind::Project) => {
                if let Some(project) = store.projects.get_mut(id)
                    && project.complete(now)
                {
                    log::info!("completed project {}: {}", id, project.title);
                    applied.completed_projects.push(id.clone());
                }
            }
            None => {
                log::warn!("ignoring checked item with unrecognized id {}", id);
                applied.unrecognized.push(id.clone());
            }
        }
    }

    applied
}

/// Whether an active project has no active or waiting actions.
pub fn is_stalled(store: &Store, project_id: &str) -> bool {
    store
        .projects
        .get(project_id)
        .is_some_and(|p| p.state == ProjectState::Active)
        && store.open_action_count(project_id) == 0
}

/// Ids of stalled projects, ordered by due date (missing last) then title.
pub fn stalled_projects(store: &Store) -> Vec<String> {
    let mut ids: Vec<(NaiveDate, String, &String)> = store
        .projects
        .iter()
        .filter(|(id, _)| is_stalled(store, id))
        .map(|(id, p)| (p.due.unwrap_or(NaiveDate::MAX), p.title.to_lowercase(), id))
        .collect();
    ids.sort();
    ids.into_iter().map(|(_, _, id)| id.clone()).collect()
}

/// Offer each stalled project to `source`. Returns the ids of the actions
/// that were created.
pub fn offer_next_actions(
    store: &mut Store,
    stalled: &[String],
    source: &mut dyn NextActionSource,
    now: DateTime<Utc>,
) -> std::io::Result<Vec<String>> {
    let mut created = Vec::new();

    for pid in stalled {
        let Some(project) = store.projects.get(pid) else {
            continue;
        };
        if let Some(mut action) = source.next_action(pid, project, now)? {
            action.project = Some(pid.clone());
            let aid = store.insert_action(action);
            log::info!("added next action {} for project {}", aid, pid);
            created.push(aid);
        }
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::action::ActionState;
    use chrono::TimeZone;

    fn t(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, d, 12, 0, 0).unwrap()
    }

    fn store_with_project() -> Store {
        let mut store = Store::new(t(1));
        store
            .projects
            .insert("p_home".into(), Project::new("Move house".into(), t(1)));
        let mut a = Action::new("Book van".into(), "phone".into(), t(1));
        a.project = Some("p_home".into());
        store.actions.insert("a_van".into(), a);
        store
    }

    fn map(entries: &[(&str, bool)]) -> CompletionMap {
        entries.iter().map(|(id, d)| (id.to_string(), *d)).collect()
    }

    #[test]
    fn completes_checked_entities_only() {
        let mut store = store_with_project();
        store
            .actions
            .insert("a_other".into(), Action::new("Other".into(), "home".into(), t(1)));

        let applied = apply_completions(
            &mut store,
            &map(&[("a_van", true), ("a_other", false), ("a_missing", true)]),
            t(2),
        );

        assert_eq!(applied.completed_actions, vec!["a_van"]);
        assert_eq!(store.actions["a_van"].state, ActionState::Completed);
        assert_eq!(store.actions["a_van"].completed, Some(t(2)));
        assert_eq!(store.actions["a_other"].state, ActionState::Active);
    }

    #[test]
    fn already_completed_is_not_counted_again() {
        let mut store = store_with_project();
        let m = map(&[("a_van", true), ("p_home", true)]);
        let first = apply_completions(&mut store, &m, t(2));
        let second = apply_completions(&mut store, &m, t(3));
        assert_eq!(first.completed_actions.len(), 1);
        assert_eq!(first.completed_projects, vec!["p_home"]);
        assert_eq!(second, Applied::default());
        assert_eq!(store.projects["p_home"].completed, Some(t(2)));
    }

    #[test]
    fn unrecognized_prefix_is_reported() {
        let mut store = store_with_project();
        let applied = apply_completions(&mut store, &map(&[("task_1", true)]), t(2));
        assert_eq!(applied.unrecognized, vec!["task_1"]);
    }

    #[test]
    fn stalled_after_last_action_completes() {
        let mut store = store_with_project();
        assert!(stalled_projects(&store).is_empty());

        apply_completions(&mut store, &map(&[("a_van", true)]), t(2));
        assert_eq!(stalled_projects(&store), vec!["p_home"]);
    }

    #[test]
    fn waiting_action_keeps_project_moving() {
        let mut store = store_with_project();
        store.actions["a_van"].set_waiting("Removals Ltd".into(), t(2));
        assert!(!is_stalled(&store, "p_home"));
    }

    #[test]
    fn someday_projects_never_stall() {
        let mut store = Store::new(t(1));
        let mut p = Project::new("Learn cello".into(), t(1));
        p.state = ProjectState::Someday;
        store.projects.insert("p_cello".into(), p);
        assert!(stalled_projects(&store).is_empty());
    }

    struct Always(&'static str);

    impl NextActionSource for Always {
        fn next_action(
            &mut self,
            _project_id: &str,
            _project: &Project,
            now: DateTime<Utc>,
        ) -> std::io::Result<Option<Action>> {
            Ok(Some(Action::new(self.0.into(), "phone".into(), now)))
        }
    }

    #[test]
    fn offered_action_is_attached_to_project() {
        let mut store = store_with_project();
        apply_completions(&mut store, &map(&[("a_van", true)]), t(2));
        let stalled = stalled_projects(&store);

        let created = offer_next_actions(&mut store, &stalled, &mut Always("Call agent"), t(2)).unwrap();
        assert_eq!(created.len(), 1);
        let a = &store.actions[&created[0]];
        assert_eq!(a.project.as_deref(), Some("p_home"));
        assert!(created[0].starts_with("a_"));
        assert!(stalled_projects(&store).is_empty());
    }

    #[test]
    fn decline_creates_nothing() {
        let mut store = store_with_project();
        apply_completions(&mut store, &map(&[("a_van", true)]), t(2));
        let stalled = stalled_projects(&store);
        let created = offer_next_actions(&mut store, &stalled, &mut Decline, t(2)).unwrap();
        assert!(created.is_empty());
    }
}
