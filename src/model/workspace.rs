use std::path::{Path, PathBuf};

use super::config::GtdConfig;
use super::store::Store;
use super::view::ViewKind;

pub const STORE_FILENAME: &str = "master.json";
pub const CONFIG_FILENAME: &str = "config.toml";
pub const VIEWS_DIRNAME: &str = "views";
pub const INBOX_DIRNAME: &str = "inbox";
pub const INBOX_FILENAME: &str = "inbox.md";

/// Every location a workspace operation touches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    /// Root directory (holds `master.json`)
    pub root: PathBuf,
    pub store: PathBuf,
    pub config: PathBuf,
    pub views_dir: PathBuf,
    /// Free-text capture document
    pub inbox: PathBuf,
}

impl WorkspacePaths {
    /// Standard layout under `root`
    pub fn new(root: &Path) -> Self {
        WorkspacePaths {
            root: root.to_path_buf(),
            store: root.join(STORE_FILENAME),
            config: root.join(CONFIG_FILENAME),
            views_dir: root.join(VIEWS_DIRNAME),
            inbox: root.join(INBOX_DIRNAME).join(INBOX_FILENAME),
        }
    }

    pub fn view(&self, kind: ViewKind) -> PathBuf {
        self.views_dir.join(kind.file_name())
    }
}

/// A fully loaded workspace
#[derive(Debug)]
pub struct Workspace {
    pub paths: WorkspacePaths,
    pub config: GtdConfig,
    pub store: Store,
}
