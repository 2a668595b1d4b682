//! Listing traversal
//!
//! Walks numbered listing pages from the resume point to the configured end
//! page, writing filtered comment links to the article index. The checkpoint
//! is saved after every page, once its candidates are in the index.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::parser::{filter_candidates, ListingParser};
use crate::output::ArticleIndexWriter;
use crate::site::SiteLayout;
use crate::state::{ListingStep, ProgressState};
use crate::storage::ProgressStore;
use crate::HarvestError;

/// Counters for one listing traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingReport {
    /// Listing pages completed
    pub pages: u32,

    /// Candidates that passed the comment-count filter
    pub candidates: usize,

    /// Candidates newly written to the index
    pub indexed: usize,
}

/// Drives the listing pages through their states
pub struct ListingTraversal<'a> {
    fetcher: &'a HttpFetcher,
    site: &'a SiteLayout,
    parser: ListingParser,
    page_start: u32,
    page_end: u32,
    threshold: u32,
}

impl<'a> ListingTraversal<'a> {
    /// Creates a traversal over the configured page range
    pub fn new(
        fetcher: &'a HttpFetcher,
        site: &'a SiteLayout,
        config: &CrawlerConfig,
    ) -> Result<Self, HarvestError> {
        Ok(Self {
            fetcher,
            site,
            parser: ListingParser::new()?,
            page_start: config.page_start,
            page_end: config.page_end,
            threshold: config.comment_threshold,
        })
    }

    /// First page to visit for the given checkpoint
    ///
    /// The page at the cursor is visited again: its articles were indexed,
    /// but re-reading it is harmless because the index ignores known ids.
    pub fn first_page(&self, progress: &ProgressState) -> u32 {
        progress.listing_cursor().max(self.page_start)
    }

    /// Runs the traversal until every page up to the end page is done
    pub async fn run<S: ProgressStore>(
        &self,
        progress: &mut ProgressState,
        store: &mut S,
        index: &mut ArticleIndexWriter,
    ) -> Result<ListingReport, HarvestError> {
        let mut report = ListingReport::default();
        let mut step = ListingStep::Pending(self.first_page(progress));

        tracing::info!(
            "Listing traversal from page {} to page {}",
            self.first_page(progress),
            self.page_end
        );

        while !step.is_terminal() {
            tracing::trace!("Listing step: {}", step);
            step = self
                .advance(step, progress, store, index, &mut report)
                .await?;
        }

        tracing::info!(
            "Listing traversal complete: {} pages, {} candidates, {} new articles",
            report.pages,
            report.candidates,
            report.indexed
        );

        Ok(report)
    }

    /// Performs the work of one step and returns the next one
    pub async fn advance<S: ProgressStore>(
        &self,
        step: ListingStep,
        progress: &mut ProgressState,
        store: &mut S,
        index: &mut ArticleIndexWriter,
        report: &mut ListingReport,
    ) -> Result<ListingStep, HarvestError> {
        let next = match step {
            ListingStep::Pending(page) if page > self.page_end => ListingStep::Finished,
            ListingStep::Pending(page) => ListingStep::Fetching(page),

            ListingStep::Fetching(page) => {
                let url = self.site.listing_url(page)?;
                let body = self.fetcher.fetch(url.as_str()).await?;

                let entries =
                    self.parser
                        .parse_listing(&body)
                        .map_err(|e| HarvestError::MalformedContent {
                            url: url.to_string(),
                            message: e.to_string(),
                        })?;
                let found = entries.len();
                let candidates = filter_candidates(entries, self.threshold);

                tracing::debug!(
                    "Listing page {}: {} comment links, {} above threshold {}",
                    page,
                    found,
                    candidates.len(),
                    self.threshold
                );

                ListingStep::Parsed { page, candidates }
            }

            ListingStep::Parsed { page, candidates } => {
                let mut indexed = 0;
                for candidate in &candidates {
                    if index.append(candidate)? {
                        indexed += 1;
                    }
                }
                index.sync()?;

                progress.complete_listing_page(page);
                progress.touch();
                store.save(progress)?;

                report.pages += 1;
                report.candidates += candidates.len();
                report.indexed += indexed;

                tracing::info!(
                    "Listing page {} done: {} candidates, {} new",
                    page,
                    candidates.len(),
                    indexed
                );

                ListingStep::Advanced(page)
            }

            ListingStep::Advanced(page) => match page.checked_add(1) {
                Some(next) => ListingStep::Pending(next),
                None => ListingStep::Finished,
            },

            ListingStep::Finished => ListingStep::Finished,
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HttpConfig, SiteConfig};
    use crate::output::read_article_index;
    use crate::storage::MemoryProgressStore;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn site_for(server: &MockServer) -> SiteLayout {
        SiteLayout::new(&SiteConfig {
            base_url: server.uri(),
            listing_path: "/news.php?page=".to_string(),
        })
        .unwrap()
    }

    fn fetcher() -> HttpFetcher {
        let client = crate::crawler::build_http_client(&HttpConfig::default()).unwrap();
        HttpFetcher::with_client(client, 0, Duration::from_millis(1))
    }

    fn crawler_config(page_start: u32, page_end: u32) -> CrawlerConfig {
        CrawlerConfig {
            page_start,
            page_end,
            ..CrawlerConfig::default()
        }
    }

    async fn mount_listing(server: &MockServer, page: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path("/news.php"))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_first_page_respects_cursor_and_start() {
        let server = MockServer::start().await;
        let site = site_for(&server);
        let fetcher = fetcher();
        let traversal = ListingTraversal::new(&fetcher, &site, &crawler_config(3, 9)).unwrap();

        let mut progress = ProgressState::default();
        assert_eq!(traversal.first_page(&progress), 3);

        progress.complete_listing_page(5);
        assert_eq!(traversal.first_page(&progress), 5);
    }

    #[tokio::test]
    async fn test_steps_through_one_page() {
        let server = MockServer::start().await;
        mount_listing(
            &server,
            "1",
            r##"<body><a class="com" href="/a/x.11#comments">8</a></body>"##,
        )
        .await;

        let dir = TempDir::new().unwrap();
        let index_path = dir.path().join("article_list.csv");
        let mut index = ArticleIndexWriter::open(&index_path).unwrap();
        let site = site_for(&server);
        let fetcher = fetcher();
        let traversal = ListingTraversal::new(&fetcher, &site, &crawler_config(1, 1)).unwrap();
        let mut progress = ProgressState::default();
        let mut store = MemoryProgressStore::default();
        let mut report = ListingReport::default();

        let mut step = ListingStep::Pending(1);
        let mut seen = Vec::new();
        while !step.is_terminal() {
            seen.push(step.name());
            step = traversal
                .advance(step, &mut progress, &mut store, &mut index, &mut report)
                .await
                .unwrap();
        }

        assert_eq!(seen, vec!["pending", "fetching", "parsed", "advanced", "pending"]);
        assert_eq!(store.saves.len(), 1);
        assert_eq!(report.indexed, 1);
        assert_eq!(read_article_index(&index_path).unwrap()[0].id, "11");
    }

    #[tokio::test]
    async fn test_cursor_advances_by_one_per_page() {
        let server = MockServer::start().await;
        mount_listing(
            &server,
            "1",
            r##"<body><a class="com" href="/a/x.11#comments">8</a></body>"##,
        )
        .await;
        mount_listing(&server, "2", "<body><p>No comments today</p></body>").await;
        mount_listing(
            &server,
            "3",
            r##"<body><a class="com" href="/a/y.12#comments">6</a></body>"##,
        )
        .await;

        let dir = TempDir::new().unwrap();
        let mut index = ArticleIndexWriter::open(&dir.path().join("article_list.csv")).unwrap();
        let site = site_for(&server);
        let fetcher = fetcher();
        let traversal = ListingTraversal::new(&fetcher, &site, &crawler_config(1, 3)).unwrap();
        let mut progress = ProgressState::default();
        let mut store = MemoryProgressStore::default();

        let report = traversal
            .run(&mut progress, &mut store, &mut index)
            .await
            .unwrap();

        let cursors: Vec<u32> = store.saves.iter().map(|s| s.listing_cursor()).collect();
        assert_eq!(cursors, vec![1, 2, 3]);
        assert_eq!(report.pages, 3);
        assert_eq!(report.indexed, 2);
        assert_eq!(progress.listing_cursor(), 3);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_cursor() {
        let server = MockServer::start().await;
        mount_listing(&server, "1", "<body></body>").await;
        Mock::given(method("GET"))
            .and(path("/news.php"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let mut index = ArticleIndexWriter::open(&dir.path().join("article_list.csv")).unwrap();
        let site = site_for(&server);
        let fetcher = fetcher();
        let traversal = ListingTraversal::new(&fetcher, &site, &crawler_config(1, 3)).unwrap();
        let mut progress = ProgressState::default();
        let mut store = MemoryProgressStore::default();

        let result = traversal.run(&mut progress, &mut store, &mut index).await;

        assert!(matches!(result, Err(HarvestError::Fetch(_))));
        assert_eq!(store.load().unwrap().listing_cursor(), 1);
    }

    #[tokio::test]
    async fn test_save_failure_is_fatal() {
        let server = MockServer::start().await;
        mount_listing(&server, "1", "<body></body>").await;
        mount_listing(&server, "2", "<body></body>").await;

        let dir = TempDir::new().unwrap();
        let mut index = ArticleIndexWriter::open(&dir.path().join("article_list.csv")).unwrap();
        let site = site_for(&server);
        let fetcher = fetcher();
        let traversal = ListingTraversal::new(&fetcher, &site, &crawler_config(1, 2)).unwrap();
        let mut progress = ProgressState::default();
        let mut store = MemoryProgressStore::failing_after(1);

        let result = traversal.run(&mut progress, &mut store, &mut index).await;

        let error = result.unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::PersistenceFailure);
        assert_eq!(store.saves.len(), 1);
    }
}
