use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::io::recovery::{RecoveryEntry, atomic_write, log_recovery};
use crate::io::workspace_io::WorkspaceError;
use crate::model::store::{EntityKind, Store};
use crate::model::workspace::WorkspacePaths;

/// Read and validate `master.json`.
pub fn load_store(path: &Path) -> Result<Store, WorkspaceError> {
    if !path.exists() {
        return Err(WorkspaceError::NotInitialized(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| WorkspaceError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let store: Store =
        serde_json::from_str(&text).map_err(|e| WorkspaceError::StoreParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

    if let Some((id, kind)) = store.misplaced_ids().into_iter().next() {
        let expected = match kind {
            EntityKind::Action => "action",
            EntityKind::Project => "project",
        };
        return Err(WorkspaceError::InvalidId {
            id,
            expected,
            prefix: kind.prefix(),
        });
    }
    Ok(store)
}

/// Serialize the store the way it is kept on disk: 2-space JSON plus a
/// trailing newline.
pub fn store_to_string(store: &Store) -> Result<String, WorkspaceError> {
    let mut text = serde_json::to_string_pretty(store)?;
    text.push('\n');
    Ok(text)
}

/// Stamp `meta.updated` and write the store atomically. If the write fails
/// the serialized store goes to the recovery log before the error is returned.
pub fn save_store(
    paths: &WorkspacePaths,
    store: &mut Store,
    now: DateTime<Utc>,
) -> Result<(), WorkspaceError> {
    store.meta.updated = now;
    let text = store_to_string(store)?;

    if let Err(e) = atomic_write(&paths.store, text.as_bytes()) {
        log_recovery(
            &paths.root,
            RecoveryEntry {
                timestamp: now,
                description: "store write failed".to_string(),
                fields: vec![
                    ("Target".to_string(), paths.store.display().to_string()),
                    ("Error".to_string(), e.to_string()),
                ],
                body: text,
            },
        );
        return Err(WorkspaceError::WriteError {
            path: paths.store.clone(),
            source: e,
        });
    }

    log::info!(
        "saved {}: {} project(s), {} action(s)",
        paths.store.display(),
        store.projects.len(),
        store.actions.len()
    );
    Ok(())
}
