//! Article traversal
//!
//! Visits every indexed article that is not yet in the processed set and
//! harvests all of its comment pages. An article is marked processed only
//! after every one of its pages was fetched, extracted and written; any
//! failure leaves it to be redone from page 1 on the next run.
//!
//! Redoing an article appends the comments of pages that were already
//! written before the failure a second time. Comment rows carry no identity,
//! so those duplicates are left to downstream consumers.

use crate::crawler::extractor::CommentExtractor;
use crate::crawler::fetcher::HttpFetcher;
use crate::crawler::pacer::Pacer;
use crate::crawler::parser::ListingParser;
use crate::output::{ArticleRecord, CommentWriter};
use crate::site::SiteLayout;
use crate::state::ProgressState;
use crate::storage::ProgressStore;
use crate::HarvestError;
use url::Url;

/// Result of visiting one article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleOutcome {
    /// Already in the processed set; nothing was fetched
    Skipped,

    /// All comment pages were harvested
    Harvested { pages: u32, comments: usize },
}

/// Counters for one article traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArticleReport {
    /// Articles harvested in this run
    pub harvested: usize,

    /// Articles skipped because an earlier run finished them
    pub skipped: usize,

    /// Comment pages fetched
    pub pages: u32,

    /// Comment rows written
    pub comments: usize,
}

/// Harvests the comment threads of indexed articles
pub struct ArticleTraversal<'a> {
    fetcher: &'a HttpFetcher,
    site: &'a SiteLayout,
    parser: ListingParser,
    extractor: CommentExtractor,
    pacer: Pacer,
}

impl<'a> ArticleTraversal<'a> {
    /// Creates a traversal with the given politeness pacer
    pub fn new(
        fetcher: &'a HttpFetcher,
        site: &'a SiteLayout,
        pacer: Pacer,
    ) -> Result<Self, HarvestError> {
        Ok(Self {
            fetcher,
            site,
            parser: ListingParser::new()?,
            extractor: CommentExtractor::new()?,
            pacer,
        })
    }

    /// Harvests every article in index order
    pub async fn run<S: ProgressStore>(
        &self,
        articles: &[ArticleRecord],
        progress: &mut ProgressState,
        store: &mut S,
        comments: &mut CommentWriter,
    ) -> Result<ArticleReport, HarvestError> {
        let mut report = ArticleReport::default();

        tracing::info!(
            "Article traversal over {} indexed articles ({} already harvested)",
            articles.len(),
            articles
                .iter()
                .filter(|a| progress.is_article_processed(&a.id))
                .count()
        );

        for article in articles {
            match self.harvest(article, progress, store, comments).await? {
                ArticleOutcome::Skipped => report.skipped += 1,
                ArticleOutcome::Harvested {
                    pages,
                    comments: saved,
                } => {
                    report.harvested += 1;
                    report.pages += pages;
                    report.comments += saved;
                }
            }
        }

        tracing::info!(
            "Article traversal complete: {} harvested, {} skipped, {} comments",
            report.harvested,
            report.skipped,
            report.comments
        );

        Ok(report)
    }

    /// Harvests one article unless it is already processed
    pub async fn harvest<S: ProgressStore>(
        &self,
        article: &ArticleRecord,
        progress: &mut ProgressState,
        store: &mut S,
        comments: &mut CommentWriter,
    ) -> Result<ArticleOutcome, HarvestError> {
        if progress.is_article_processed(&article.id) {
            tracing::debug!("Article {} already harvested, skipping", article.id);
            return Ok(ArticleOutcome::Skipped);
        }

        tracing::info!("Processing article {}...", article.id);

        let article_url = self.site.article_url(&article.url)?;
        let article_body = self.fetcher.fetch(article_url.as_str()).await?;

        let (pages, saved) = match self.parser.comment_page_count(&article_body) {
            Some(last_page) => {
                let mut saved = 0;
                for page in 1..=last_page {
                    self.pacer.pause().await;
                    let page_url = self.site.comment_page_url(&article.url, page)?;
                    let page_body = self.fetcher.fetch(page_url.as_str()).await?;
                    saved += self.save_page(&page_url, &page_body, comments)?;
                }
                (last_page, saved)
            }
            None => (1, self.save_page(&article_url, &article_body, comments)?),
        };

        comments.sync()?;
        progress.mark_article_processed(&article.id);
        progress.touch();
        store.save(progress)?;

        tracing::info!(
            "Saved {} comments for article {} ({} pages)",
            saved,
            article.id,
            pages
        );

        Ok(ArticleOutcome::Harvested {
            pages,
            comments: saved,
        })
    }

    /// Extracts one comment page and appends its records
    fn save_page(
        &self,
        url: &Url,
        body: &str,
        comments: &mut CommentWriter,
    ) -> Result<usize, HarvestError> {
        let records = self
            .extractor
            .extract(body)
            .map_err(|e| HarvestError::MalformedContent {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!("{} comments on {}", records.len(), url);
        Ok(comments.append_all(&records)?)
    }
}
