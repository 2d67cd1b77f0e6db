use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::io::recovery::atomic_write;
use crate::model::store::Store;
use crate::model::view::ViewKind;
use crate::model::workspace::WorkspacePaths;
use crate::ops::build::ViewError;
use crate::ops::reconcile::{
    CompletionMap, NextActionSource, apply_completions, offer_next_actions, stalled_projects,
};
use crate::parse::capture::prune_checked_text;
use crate::parse::marker::decode_line;

/// Options for a single sync pass
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Offer stalled projects to the next-action collaborator
    pub prompt_next: bool,
    pub now: DateTime<Utc>,
}

/// Outcome of a sync pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub completed_actions: Vec<String>,
    pub completed_projects: Vec<String>,
    pub unrecognized: Vec<String>,
    /// Stalled projects after completions were applied
    pub stalled_projects: Vec<String>,
    pub created_actions: Vec<String>,
    pub pruned_captures: usize,
}

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

/// Collect `id -> done` from one Markdown document. Only lines carrying an
/// id annotation count; a later line for the same id wins.
pub fn extract_completions(text: &str) -> CompletionMap {
    let mut map = CompletionMap::new();
    for line in text.lines() {
        let signal = decode_line(line);
        if let Some(id) = signal.id {
            map.insert(id, signal.done);
        }
    }
    map
}

/// Merge `from` into `into`, later entries overwriting earlier ones.
fn merge(into: &mut CompletionMap, from: CompletionMap, source: &Path) {
    for (id, done) in from {
        if let Some(prev) = into.insert(id.clone(), done)
            && prev != done
        {
            log::debug!("{}: {} done {} -> {}", source.display(), id, prev, done);
        }
    }
}

/// Read every existing view in sync order into one completion map.
pub fn read_completion_map(paths: &WorkspacePaths) -> Result<CompletionMap, ViewError> {
    if !paths.views_dir.is_dir() {
        return Err(ViewError::MissingViews(paths.views_dir.clone()));
    }

    let mut map = CompletionMap::new();
    for kind in ViewKind::SYNC_ORDER {
        let path = paths.view(kind);
        if !path.exists() {
            log::debug!("skipping missing view {}", path.display());
            continue;
        }
        let text = fs::read_to_string(&path).map_err(|e| ViewError::ReadError {
            path: path.clone(),
            source: e,
        })?;
        let found = extract_completions(&text);
        log::debug!("{}: {} tracked line(s)", path.display(), found.len());
        merge(&mut map, found, &path);
    }
    Ok(map)
}

/// Remove checked items from the capture document. A missing document
/// prunes nothing; the file is only rewritten when something was removed.
pub fn prune_capture(path: &Path) -> Result<usize, ViewError> {
    if !path.exists() {
        return Ok(0);
    }
    let text = fs::read_to_string(path).map_err(|e| ViewError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let (pruned, removed) = prune_checked_text(&text);
    if removed > 0 {
        atomic_write(path, pruned.as_bytes()).map_err(|e| ViewError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::info!("pruned {} checked item(s) from {}", removed, path.display());
    }
    Ok(removed)
}

// ---------------------------------------------------------------------------
// Full pass
// ---------------------------------------------------------------------------

/// Read completions from the views, apply them, offer stalled projects to
/// `next`, and prune the capture document.
///
/// The store is mutated in place; persisting it is up to the caller.
pub fn sync(
    store: &mut Store,
    paths: &WorkspacePaths,
    options: SyncOptions,
    next: &mut dyn NextActionSource,
) -> Result<SyncReport, ViewError> {
    let map = read_completion_map(paths)?;
    let applied = apply_completions(store, &map, options.now);

    let stalled = stalled_projects(store);
    let created = if options.prompt_next {
        offer_next_actions(store, &stalled, next, options.now).map_err(ViewError::Prompt)?
    } else {
        Vec::new()
    };

    let pruned = prune_capture(&paths.inbox)?;

    Ok(SyncReport {
        completed_actions: applied.completed_actions,
        completed_projects: applied.completed_projects,
        unrecognized: applied.unrecognized,
        stalled_projects: stalled,
        created_actions: created,
        pruned_captures: pruned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::action::{Action, ActionState};
    use crate::ops::build::write_views;
    use crate::ops::reconcile::Decline;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 8, 0, 0).unwrap()
    }

    fn workspace(tmp: &TempDir) -> WorkspacePaths {
        let paths = WorkspacePaths::new(tmp.path());
        fs::create_dir_all(&paths.views_dir).unwrap();
        paths
    }

    fn opts(prompt_next: bool) -> SyncOptions {
        SyncOptions {
            prompt_next,
            now: t(),
        }
    }

    #[test]
    fn extract_only_annotated_lines() {
        let text = "\
# Next Actions

## @phone

- [x] Call bank <!-- id:a_1 -->
- [ ] Call mum <!-- id:a_2 -->
- [x] untracked
";
        let map = extract_completions(text);
        assert_eq!(map.len(), 2);
        assert!(map["a_1"]);
        assert!(!map["a_2"]);
    }

    #[test]
    fn later_file_wins() {
        let tmp = TempDir::new().unwrap();
        let paths = workspace(&tmp);
        fs::write(paths.view(ViewKind::NextActions), "- [ ] X <!-- id:a_1 -->\n").unwrap();
        fs::write(paths.view(ViewKind::Projects), "- [x] X <!-- id:a_1 -->\n").unwrap();

        let map = read_completion_map(&paths).unwrap();
        assert!(map["a_1"]);
    }

    #[test]
    fn stalled_view_is_not_read() {
        let tmp = TempDir::new().unwrap();
        let paths = workspace(&tmp);
        fs::write(paths.view(ViewKind::Projects), "- Move XXX <!-- id:p_1 -->\n").unwrap();
        fs::write(
            paths.view(ViewKind::StalledProjects),
            "- Move <!-- id:p_1 -->\n- Only here XXX <!-- id:p_2 -->\n",
        )
        .unwrap();

        let map = read_completion_map(&paths).unwrap();
        assert!(map["p_1"]);
        assert!(!map.contains_key("p_2"));
    }

    #[test]
    fn missing_views_dir_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let paths = WorkspacePaths::new(tmp.path());
        let err = read_completion_map(&paths).unwrap_err();
        assert!(matches!(err, ViewError::MissingViews(_)));
        assert!(err.to_string().contains("gtd init"));
    }

    #[test]
    fn missing_view_files_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let paths = workspace(&tmp);
        assert!(read_completion_map(&paths).unwrap().is_empty());
    }

    #[test]
    fn sync_after_check_off() {
        let tmp = TempDir::new().unwrap();
        let paths = workspace(&tmp);
        let mut store = Store::new(t());
        store
            .actions
            .insert("a_1".into(), Action::new("Call bank".into(), "phone".into(), t()));
        write_views(&paths, &store).unwrap();

        let view = paths.view(ViewKind::NextActions);
        let edited = fs::read_to_string(&view).unwrap().replace("- [ ]", "- [x]");
        fs::write(&view, edited).unwrap();

        let report = sync(&mut store, &paths, opts(true), &mut Decline).unwrap();
        assert_eq!(report.completed_actions, vec!["a_1"]);
        assert_eq!(store.actions["a_1"].state, ActionState::Completed);
    }

    #[test]
    fn sync_prunes_capture() {
        let tmp = TempDir::new().unwrap();
        let paths = workspace(&tmp);
        fs::create_dir_all(paths.inbox.parent().unwrap()).unwrap();
        fs::write(&paths.inbox, "- [x] done\n  detail\n- [ ] open\n").unwrap();

        let mut store = Store::new(t());
        let report = sync(&mut store, &paths, opts(false), &mut Decline).unwrap();
        assert_eq!(report.pruned_captures, 1);
        assert_eq!(fs::read_to_string(&paths.inbox).unwrap(), "- [ ] open\n");
    }

    #[test]
    fn untouched_capture_is_not_rewritten() {
        let tmp = TempDir::new().unwrap();
        let paths = workspace(&tmp);
        fs::create_dir_all(paths.inbox.parent().unwrap()).unwrap();
        fs::write(&paths.inbox, "# Inbox\n\n\n").unwrap();
        assert_eq!(prune_capture(&paths.inbox).unwrap(), 0);
        assert_eq!(fs::read_to_string(&paths.inbox).unwrap(), "# Inbox\n\n\n");
    }
}
