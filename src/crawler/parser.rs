//! HTML parser for listing pages and comment pagination
//!
//! This module handles parsing HTML content to extract:
//! - Comment links (with their comment-count hints) from listing pages
//! - The number of comment pages of an article

use crate::output::ArticleRecord;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use thiserror::Error;

/// Comment links on listing pages
const COMMENT_LINK_SELECTOR: &str = "a.com";

/// Captures the article path and numeric id of a comment link
const COMMENT_LINK_PATTERN: &str = r"(/.*?)\.(\d+)#comments";

/// Comment page navigation on article pages
const PAGINATION_SELECTOR: &str = "div.comments-pagging";

/// Errors raised while parsing page markup
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid selector '{css}': {message}")]
    Selector { css: String, message: String },

    #[error("Invalid link pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Comment count '{text}' is not a number")]
    InvalidCommentCount { text: String },

    #[error("Comment block {block} has no {field}")]
    MissingField { field: &'static str, block: usize },
}

/// Compiles a CSS selector
pub(crate) fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Selector {
        css: css.to_string(),
        message: format!("{:?}", e),
    })
}

/// Concatenated text of an element and its descendants
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// A comment link found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Number of comments shown next to the link
    pub comment_count: u32,

    /// Article id and comment link path
    pub article: ArticleRecord,
}

/// Parser for listing pages and article pagination
#[derive(Debug, Clone)]
pub struct ListingParser {
    comment_link: Selector,
    link_pattern: Regex,
    pagination: Selector,
    anchor: Selector,
}

impl ListingParser {
    /// Compiles the selectors and link pattern
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            comment_link: selector(COMMENT_LINK_SELECTOR)?,
            link_pattern: Regex::new(COMMENT_LINK_PATTERN)?,
            pagination: selector(PAGINATION_SELECTOR)?,
            anchor: selector("a")?,
        })
    }

    /// Extracts every comment link of a listing page
    ///
    /// Links whose href does not match `<path>.<id>#comments` are skipped
    /// silently. A comment count that is not a number fails the page.
    ///
    /// # Example
    ///
    /// ```
    /// use comment_harvester::crawler::ListingParser;
    ///
    /// let html = r#"<body><a class="com" href="/news/title.42#comments">7</a></body>"#;
    /// let entries = ListingParser::new().unwrap().parse_listing(html).unwrap();
    /// assert_eq!(entries[0].comment_count, 7);
    /// assert_eq!(entries[0].article.id, "42");
    /// assert_eq!(entries[0].article.url, "/news/title.42#comments");
    /// ```
    pub fn parse_listing(&self, html: &str) -> Result<Vec<ListingEntry>, ParseError> {
        let document = Html::parse_document(html);
        let mut entries = Vec::new();

        for element in document.select(&self.comment_link) {
            let text = element_text(&element);
            let comment_count = text
                .trim()
                .parse::<u32>()
                .map_err(|_| ParseError::InvalidCommentCount {
                    text: text.trim().to_string(),
                })?;

            let Some(href) = element.value().attr("href") else {
                continue;
            };

            if let Some(article) = self.match_comment_link(href) {
                entries.push(ListingEntry {
                    comment_count,
                    article,
                });
            }
        }

        Ok(entries)
    }

    /// Matches an href against the comment link pattern
    ///
    /// The id is the numeric capture; the URL is the whole match.
    pub fn match_comment_link(&self, href: &str) -> Option<ArticleRecord> {
        let captures = self.link_pattern.captures(href)?;
        Some(ArticleRecord {
            id: captures.get(2)?.as_str().to_string(),
            url: captures.get(0)?.as_str().to_string(),
        })
    }

    /// Returns the highest comment page number in the page navigation
    ///
    /// `None` means the article has no navigation (or no numbered links in
    /// it), so its comments are all on the article page itself.
    pub fn comment_page_count(&self, html: &str) -> Option<u32> {
        let document = Html::parse_document(html);
        let navigation = document.select(&self.pagination).next()?;

        navigation
            .select(&self.anchor)
            .filter_map(|anchor| {
                let text = element_text(&anchor);
                let text = text.trim();
                if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
                    text.parse::<u32>().ok()
                } else {
                    None
                }
            })
            .max()
    }
}

/// Keeps entries with strictly more comments than `threshold`
///
/// Entries are returned in order of first appearance; a later entry for the
/// same id replaces the URL of the earlier one.
pub fn filter_candidates(entries: Vec<ListingEntry>, threshold: u32) -> Vec<ArticleRecord> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut candidates: Vec<ArticleRecord> = Vec::new();

    for entry in entries {
        if entry.comment_count <= threshold {
            continue;
        }

        match positions.get(&entry.article.id) {
            Some(&index) => candidates[index].url = entry.article.url,
            None => {
                positions.insert(entry.article.id.clone(), candidates.len());
                candidates.push(entry.article);
            }
        }
    }

    candidates
}
