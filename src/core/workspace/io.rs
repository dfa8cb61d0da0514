use std::fs;
use std::path::{Path, PathBuf};

use super::{StoreError, WorkspaceStore};
use crate::core::config::io::{project_dirs, write_atomically};

impl WorkspaceStore {
    /// A missing file yields an empty store.
    pub fn load_from_path(path: &Path) -> Result<WorkspaceStore, StoreError> {
        if !path.exists() {
            return Ok(WorkspaceStore::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), StoreError> {
        let contents = serde_json::to_vec_pretty(self).map_err(StoreError::Serialize)?;
        write_atomically(path, &contents).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn default_path() -> Result<PathBuf, StoreError> {
        let dirs = project_dirs().map_err(StoreError::Location)?;
        Ok(dirs.data_dir().join("workspaces.json"))
    }
}
