//! Comment Harvester: a resumable news comment scraper
//!
//! This crate walks the numbered listing pages of a news site, records the
//! articles worth visiting, then harvests every comment page of those articles
//! into CSV files. Progress is checkpointed after every listing page and every
//! fully harvested article, so an interrupted run can always be restarted.

pub mod config;
pub mod crawler;
pub mod output;
pub mod site;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Malformed content at {url}: {message}")]
    MalformedContent { url: String, message: String },

    #[error("Parse error: {0}")]
    Parser(#[from] crawler::ParseError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Checkpoint error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Coarse classification of a [`HarvestError`]
///
/// Every kind is fatal to the run. The checkpoint is left at the last
/// completed unit of work, so re-running is always safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network failure, timeout or non-2xx response
    TransportFailure,
    /// Expected markup or field missing from a page
    MalformedContent,
    /// Checkpoint or sink write failed
    PersistenceFailure,
    /// Invalid configuration or HTTP client setup
    Configuration,
}

impl HarvestError {
    /// Returns the error class used for reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch(_) => ErrorKind::TransportFailure,
            Self::MalformedContent { .. } | Self::Parser(_) | Self::UrlParse(_) => {
                ErrorKind::MalformedContent
            }
            Self::Storage(_) | Self::Output(_) => ErrorKind::PersistenceFailure,
            Self::Config(_) | Self::HttpClient(_) => ErrorKind::Configuration,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::Config;
pub use output::{ArticleRecord, CommentRecord};
pub use state::ProgressState;
