//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `ProgressState`: the persisted checkpoint (listing cursor and processed articles)
//! - `ListingStep`: the state machine driving the listing traversal

mod listing_step;
mod progress;

// Re-export main types
pub use listing_step::ListingStep;
pub use progress::{ProgressState, FIRST_LISTING_PAGE};
