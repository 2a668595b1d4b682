//! Harvest coordinator - main orchestration logic
//!
//! This module ties the two traversals together:
//! - Loading (or resetting) the checkpoint
//! - Detecting configuration drift against the recorded hash
//! - Running the listing phase into the article index
//! - Running the article phase from the article index into the comment sink
//!
//! Every unit of work is checkpointed by the traversals themselves, so a
//! failure at any point leaves the checkpoint at the last completed unit.

use crate::config::Config;
use crate::crawler::articles::{ArticleReport, ArticleTraversal};
use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::listing::{ListingReport, ListingTraversal};
use crate::crawler::pacer::Pacer;
use crate::output::{read_article_index, ArticleIndexWriter, CommentWriter};
use crate::site::SiteLayout;
use crate::state::ProgressState;
use crate::storage::{JsonProgressStore, ProgressStore};
use crate::HarvestError;
use std::path::Path;

/// Which traversals a run performs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Listing pages, then articles
    #[default]
    All,

    /// Listing pages only
    Listing,

    /// Articles already in the index only
    Comments,
}

impl Phase {
    /// Returns true if the listing traversal runs
    pub fn includes_listing(self) -> bool {
        matches!(self, Self::All | Self::Listing)
    }

    /// Returns true if the article traversal runs
    pub fn includes_articles(self) -> bool {
        matches!(self, Self::All | Self::Comments)
    }
}

/// Outcome of a harvest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestReport {
    /// Listing counters, if the listing phase ran
    pub listing: Option<ListingReport>,

    /// Article counters, if the article phase ran
    pub articles: Option<ArticleReport>,
}

/// Main harvest coordinator
pub struct Harvester<S: ProgressStore = JsonProgressStore> {
    config: Config,
    site: SiteLayout,
    fetcher: HttpFetcher,
    pacer: Pacer,
    store: S,
    progress: ProgressState,
    config_hash: Option<String>,
}

impl Harvester<JsonProgressStore> {
    /// Creates a coordinator using the JSON checkpoint at the configured path
    ///
    /// # Arguments
    ///
    /// * `config` - The validated harvest configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Checkpoint loaded, HTTP client built
    /// * `Err(HarvestError)` - Unreadable checkpoint or client setup failure
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let store = JsonProgressStore::new(&config.output.progress_path);
        Self::with_store(config, store)
    }
}

impl<S: ProgressStore> Harvester<S> {
    /// Creates a coordinator on top of an arbitrary checkpoint backend
    pub fn with_store(config: Config, store: S) -> Result<Self, HarvestError> {
        let site = SiteLayout::new(&config.site)?;
        let fetcher = HttpFetcher::new(&config.http, &config.crawler)?;
        let pacer = Pacer::from_config(&config.crawler);
        let progress = store.load()?;

        tracing::info!(
            "Checkpoint loaded: listing page {}, {} articles harvested",
            progress.listing_cursor(),
            progress.processed_count()
        );

        Ok(Self {
            config,
            site,
            fetcher,
            pacer,
            store,
            progress,
            config_hash: None,
        })
    }

    /// Records the hash of the configuration file driving this run
    ///
    /// A different hash in the checkpoint is reported but does not stop
    /// the run. The new hash is persisted with the next checkpoint save.
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        let hash = hash.into();

        if let Some(previous) = self.progress.config_hash() {
            if previous != hash {
                tracing::warn!(
                    "Configuration changed since the checkpoint was written ({} -> {}); resuming anyway",
                    previous,
                    hash
                );
            }
        }

        self.progress.set_config_hash(&hash);
        self.config_hash = Some(hash);
        self
    }

    /// Discards the checkpoint and starts from the zero state
    ///
    /// Output files are left alone; later rows are appended to them.
    pub fn reset_progress(&mut self) -> Result<(), HarvestError> {
        self.store.reset()?;
        self.progress = ProgressState::default();
        if let Some(hash) = &self.config_hash {
            self.progress.set_config_hash(hash);
        }

        tracing::info!("Checkpoint reset to listing page 1 with no harvested articles");
        Ok(())
    }

    /// Returns the in-memory checkpoint
    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    /// Runs the selected phases in order
    pub async fn run(&mut self, phase: Phase) -> Result<HarvestReport, HarvestError> {
        let mut report = HarvestReport::default();
        let start_time = std::time::Instant::now();

        if phase.includes_listing() {
            report.listing = Some(self.run_listing().await?);
        }

        if phase.includes_articles() {
            report.articles = Some(self.run_articles().await?);
        }

        tracing::info!("Harvest finished in {:?}", start_time.elapsed());
        Ok(report)
    }

    /// Walks listing pages into the article index
    pub async fn run_listing(&mut self) -> Result<ListingReport, HarvestError> {
        let mut index = ArticleIndexWriter::open(Path::new(&self.config.output.article_index_path))?;
        let traversal = ListingTraversal::new(&self.fetcher, &self.site, &self.config.crawler)?;

        traversal
            .run(&mut self.progress, &mut self.store, &mut index)
            .await
    }

    /// Harvests comments of every indexed article not yet processed
    pub async fn run_articles(&mut self) -> Result<ArticleReport, HarvestError> {
        let articles = read_article_index(Path::new(&self.config.output.article_index_path))?;
        let mut comments = CommentWriter::open(Path::new(&self.config.output.comments_path))?;
        let traversal = ArticleTraversal::new(&self.fetcher, &self.site, self.pacer)?;

        traversal
            .run(&articles, &mut self.progress, &mut self.store, &mut comments)
            .await
    }
}
