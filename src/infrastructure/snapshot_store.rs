//! JSON file persistence for the risk registry

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::risk::RegistrySnapshot;
use crate::shared::errors::AppError;

/// Reads and writes a `RegistrySnapshot` as a JSON document.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored snapshot. A missing file is an empty registry.
    pub fn load(&self) -> Result<RegistrySnapshot, AppError> {
        if !self.path.exists() {
            debug!("No snapshot at {}, starting empty", self.path.display());
            return Ok(RegistrySnapshot::default());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| AppError::StorageError(format!("Failed to read {}: {}", self.path.display(), e)))?;
        let snapshot: RegistrySnapshot = serde_json::from_str(&content)
            .map_err(|e| AppError::StorageError(format!("Failed to parse {}: {}", self.path.display(), e)))?;

        debug!("Loaded {} profiles from {}", snapshot.profiles.len(), self.path.display());
        Ok(snapshot)
    }

    /// Write the snapshot, replacing the previous file in one rename.
    pub fn save(&self, snapshot: &RegistrySnapshot) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| AppError::StorageError(format!("Failed to encode snapshot: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .map_err(|e| AppError::StorageError(format!("Failed to write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| AppError::StorageError(format!("Failed to replace {}: {}", self.path.display(), e)))?;

        info!("Saved {} profiles to {}", snapshot.profiles.len(), self.path.display());
        Ok(())
    }
}
