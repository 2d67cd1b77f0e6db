use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::io::config_io::read_config;
use crate::io::recovery::atomic_write;
use crate::io::store_io::{load_store, save_store};
use crate::model::store::Store;
use crate::model::view::ViewKind;
use crate::model::workspace::{STORE_FILENAME, Workspace, WorkspacePaths};

/// Error type for workspace I/O operations
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("{} not found. Run `gtd init` first.", .0.display())]
    NotInitialized(PathBuf),
    #[error("not a gtd workspace: no master.json found in this directory or its parents")]
    NotAWorkspace,
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
    #[error("could not parse {path}: {source}")]
    StoreParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize store: {0}")]
    StoreSerializeError(#[from] serde_json::Error),
    #[error("invalid id {id}: {expected} ids must start with '{prefix}_'")]
    InvalidId {
        id: String,
        expected: &'static str,
        prefix: &'static str,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit config.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
}

/// Discover the workspace by walking up from the given directory, looking
/// for a `master.json`.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(STORE_FILENAME).is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

/// Load the store and config of the workspace rooted at `root`.
pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let paths = WorkspacePaths::new(root);
    let (config, _) = read_config(&paths.config)?;
    let store = load_store(&paths.store)?;
    log::debug!(
        "loaded {}: {} project(s), {} action(s)",
        paths.store.display(),
        store.projects.len(),
        store.actions.len()
    );
    Ok(Workspace {
        paths,
        config,
        store,
    })
}

/// Create whatever parts of the workspace are missing. Existing files are
/// never touched. Returns the paths that were created.
pub fn init_workspace(
    paths: &WorkspacePaths,
    config_template: &str,
    now: DateTime<Utc>,
) -> Result<Vec<PathBuf>, WorkspaceError> {
    let mut created = Vec::new();

    for dir in [Some(paths.views_dir.as_path()), paths.inbox.parent()]
        .into_iter()
        .flatten()
    {
        if !dir.is_dir() {
            fs::create_dir_all(dir).map_err(|e| WorkspaceError::WriteError {
                path: dir.to_path_buf(),
                source: e,
            })?;
            created.push(dir.to_path_buf());
        }
    }

    if !paths.store.exists() {
        save_store(paths, &mut Store::new(now), now)?;
        created.push(paths.store.clone());
    }

    if write_if_missing(&paths.config, config_template)? {
        created.push(paths.config.clone());
    }

    for kind in ViewKind::ALL {
        let path = paths.view(kind);
        if write_if_missing(&path, &kind.starter())? {
            created.push(path);
        }
    }

    if write_if_missing(&paths.inbox, "# Inbox\n")? {
        created.push(paths.inbox.clone());
    }

    for path in &created {
        log::info!("created {}", path.display());
    }
    Ok(created)
}

fn write_if_missing(path: &Path, content: &str) -> Result<bool, WorkspaceError> {
    if path.exists() {
        return Ok(false);
    }
    atomic_write(path, content.as_bytes()).map_err(|e| WorkspaceError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(true)
}
