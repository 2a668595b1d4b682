//! Listing traversal states
//!
//! A listing page moves through `Pending → Fetching → Parsed → Advanced`, and
//! `Advanced(page)` hands over to `Pending(page + 1)`. The walk finishes once
//! a pending page lies beyond the configured end page.

use crate::output::ArticleRecord;
use std::fmt;

/// Represents the current step of the listing traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingStep {
    /// Page is next in line but has not been requested yet
    Pending(u32),

    /// Page body is being fetched
    Fetching(u32),

    /// Page was parsed; candidates passed the comment-count filter
    Parsed {
        page: u32,
        candidates: Vec<ArticleRecord>,
    },

    /// Candidates were written to the index and the cursor persisted
    Advanced(u32),

    /// No pages remain
    Finished,
}

impl ListingStep {
    /// Returns the page this step refers to
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::Pending(page) | Self::Fetching(page) | Self::Advanced(page) => Some(*page),
            Self::Parsed { page, .. } => Some(*page),
            Self::Finished => None,
        }
    }

    /// Returns true once the traversal has nothing left to do
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending(_) => "pending",
            Self::Fetching(_) => "fetching",
            Self::Parsed { .. } => "parsed",
            Self::Advanced(_) => "advanced",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for ListingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page() {
            Some(page) => write!(f, "{}({})", self.name(), page),
            None => write!(f, "{}", self.name()),
        }
    }
}
