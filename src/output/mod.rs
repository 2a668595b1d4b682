//! Output module for harvested records
//!
//! This module handles:
//! - The article index CSV written by the listing traversal
//! - The comments CSV written by the article traversal
//! - Statistics over both files and the checkpoint

mod article_index;
mod comments;
mod csv;
pub mod stats;

pub use article_index::{read_article_index, ArticleIndexWriter, ARTICLE_INDEX_HEADER};
pub use comments::{CommentWriter, COMMENTS_HEADER};
pub use stats::{load_statistics, print_statistics, HarvestStatistics};

use thiserror::Error;

/// Errors that can occur while writing or reading output files
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// An article discovered on a listing page
///
/// Identity is `id`. `url` is the comment link path as found on the listing
/// page, including its `#comments` fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub id: String,
    pub url: String,
}

/// One comment extracted from a comment page
///
/// Vote counts are kept as the page shows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub author: String,
    pub up_votes: String,
    pub down_votes: String,
    pub text: String,
}
