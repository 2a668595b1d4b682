//! JSON file checkpoint backend
//!
//! The checkpoint is rewritten through a temporary file in the same
//! directory that is synced and then renamed over the old one, so a crash
//! mid-write leaves either the previous or the new checkpoint on disk.

use crate::state::ProgressState;
use crate::storage::traits::{ProgressStore, StorageError, StorageResult};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Checkpoint stored as a JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonProgressStore {
    path: PathBuf,
}

impl JsonProgressStore {
    /// Creates a store backed by the given file
    ///
    /// The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the checkpoint file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for JsonProgressStore {
    fn load(&self) -> StorageResult<ProgressState> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No checkpoint at {}, starting fresh", self.path.display());
                return Ok(ProgressState::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&mut self, state: &ProgressState) -> StorageResult<()> {
        let data = serde_json::to_vec_pretty(state)?;
        atomic_write(&self.path, &data)?;
        Ok(())
    }

    fn reset(&mut self) -> StorageResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Writes `contents` to `path` via a synced temp file and a rename
fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.flush()?;
    temp.as_file_mut().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
