//! Crawler module for page fetching and processing
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with bounded retry
//! - Listing parsing and comment link filtering
//! - Comment extraction and sanitization
//! - The listing and article traversals
//! - Overall harvest coordination

mod articles;
mod coordinator;
mod extractor;
mod fetcher;
mod listing;
mod pacer;
mod parser;

pub use articles::{ArticleOutcome, ArticleReport, ArticleTraversal};
pub use coordinator::{HarvestReport, Harvester, Phase};
pub use extractor::{
    extract_comments, sanitize_author, sanitize_comment_text, CommentExtractor, MODERATION_NOTICE,
};
pub use fetcher::{build_http_client, FetchError, HttpFetcher};
pub use listing::{ListingReport, ListingTraversal};
pub use pacer::Pacer;
pub use parser::{filter_candidates, ListingEntry, ListingParser, ParseError};
