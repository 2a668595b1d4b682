//! Harvest checkpoint state
//!
//! `ProgressState` is the single source of truth for what work remains. It is
//! owned by the running job and handed by `&mut` reference to whichever phase
//! advances it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// First listing page of a fresh harvest
pub const FIRST_LISTING_PAGE: u32 = 1;

/// Resume position and processed-article set of a harvest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Last listing page whose candidates were all written to the index
    #[serde(rename = "last_page")]
    listing_cursor: u32,

    /// Articles whose comment pages were all extracted and written
    #[serde(rename = "article_ids", default)]
    processed_article_ids: BTreeSet<String>,

    /// Hash of the configuration the checkpoint was last written under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config_hash: Option<String>,

    /// Time of the last save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            listing_cursor: FIRST_LISTING_PAGE,
            processed_article_ids: BTreeSet::new(),
            config_hash: None,
            updated_at: None,
        }
    }
}

impl ProgressState {
    /// Returns the last completed listing page
    pub fn listing_cursor(&self) -> u32 {
        self.listing_cursor
    }

    /// Records a listing page as completed
    ///
    /// The cursor never moves backwards; completing a page at or below the
    /// current cursor (the page being re-done on resume) leaves it unchanged.
    pub fn complete_listing_page(&mut self, page: u32) {
        self.listing_cursor = self.listing_cursor.max(page);
    }

    /// Returns true if the article was already fully harvested
    pub fn is_article_processed(&self, article_id: &str) -> bool {
        self.processed_article_ids.contains(article_id)
    }

    /// Marks an article as fully harvested
    ///
    /// Returns false if it was already marked.
    pub fn mark_article_processed(&mut self, article_id: &str) -> bool {
        self.processed_article_ids.insert(article_id.to_string())
    }

    /// Number of fully harvested articles
    pub fn processed_count(&self) -> usize {
        self.processed_article_ids.len()
    }

    /// Hash of the configuration recorded with the last save
    pub fn config_hash(&self) -> Option<&str> {
        self.config_hash.as_deref()
    }

    /// Records the configuration hash for the next save
    pub fn set_config_hash(&mut self, hash: &str) {
        self.config_hash = Some(hash.to_string());
    }

    /// Time of the last save, if the checkpoint recorded one
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Stamps the state just before it is written
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}
