//! Storage module for persisting harvest checkpoints
//!
//! This module handles the durable record of harvest progress:
//! - The `ProgressStore` trait implemented by checkpoint backends
//! - A JSON file backend with atomic overwrite
//! - Resumption support through `load`

mod json;
mod traits;

pub use json::JsonProgressStore;
pub use traits::{ProgressStore, StorageError, StorageResult};

#[cfg(test)]
pub use memory::MemoryProgressStore;
