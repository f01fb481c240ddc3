//! JSON persistence for the shopping list

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::list::ShoppingList;

/// Errors reading or writing the list file
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt shopping list in {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode shopping list: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Reads and writes a [`ShoppingList`] as one JSON file
#[derive(Debug, Clone)]
pub struct ListStore {
    path: PathBuf,
}

impl ListStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved list; a missing file is an empty list
    pub fn load(&self) -> Result<ShoppingList, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "no saved shopping list");
                return Ok(ShoppingList::default());
            }
            Err(source) => return Err(self.io_error(source)),
        };

        let list: ShoppingList =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        info!(path = ?self.path, items = list.items().len(), "shopping list loaded");
        Ok(list)
    }

    /// Write the list through a temporary file and rename
    pub fn save(&self, list: &ShoppingList) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let bytes = serde_json::to_vec_pretty(list)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes).map_err(|source| self.io_error(source))?;
        std::fs::rename(&tmp, &self.path).map_err(|source| self.io_error(source))?;

        debug!(path = ?self.path, items = list.items().len(), "shopping list saved");
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
