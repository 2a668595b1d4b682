//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint backends and
//! associated error types.

use crate::state::ProgressState;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt checkpoint at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for checkpoint operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for checkpoint backends
///
/// There is exactly one writer per checkpoint. `save` must complete before
/// the next unit of work starts, so a crash never skips past the last
/// durably recorded point.
pub trait ProgressStore {
    /// Loads the saved state, or the zero state if nothing was saved yet
    fn load(&self) -> StorageResult<ProgressState>;

    /// Replaces the saved state atomically
    fn save(&mut self, state: &ProgressState) -> StorageResult<()>;

    /// Discards any saved state
    fn reset(&mut self) -> StorageResult<()>;
}
