//! Comment record extraction
//!
//! Turns a comment page into `CommentRecord`s. A comment block missing any
//! of its fields fails the whole page rather than producing a partial row.

use crate::crawler::parser::{element_text, selector, ParseError};
use crate::output::CommentRecord;
use scraper::{ElementRef, Html, Selector};

/// Moderation notice appended to flagged comments
pub const MODERATION_NOTICE: &str = " Сигнализирахте за неуместен коментар";

/// Characters removed from author names
const AUTHOR_STRIP_CHARS: [char; 3] = ['\n', ',', '"'];

/// Extracts comment records from comment pages
#[derive(Debug, Clone)]
pub struct CommentExtractor {
    block: Selector,
    author: Selector,
    up_votes: Selector,
    down_votes: Selector,
    text: Selector,
}

impl CommentExtractor {
    /// Compiles the comment block selectors
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            block: selector("div.commen_cont")?,
            author: selector("div.comment_user")?,
            up_votes: selector("span.comments-grade.comments-grades-up")?,
            down_votes: selector("span.comments-grade.comments-grades-down")?,
            text: selector("div.comment_text")?,
        })
    }

    /// Extracts all comments of a page, in page order
    pub fn extract(&self, html: &str) -> Result<Vec<CommentRecord>, ParseError> {
        let document = Html::parse_document(html);

        document
            .select(&self.block)
            .enumerate()
            .map(|(index, block)| self.extract_block(&block, index))
            .collect()
    }

    fn extract_block(
        &self,
        block: &ElementRef<'_>,
        index: usize,
    ) -> Result<CommentRecord, ParseError> {
        let field = |selector: &Selector, name: &'static str| {
            block
                .select(selector)
                .next()
                .map(|element| element_text(&element))
                .ok_or(ParseError::MissingField { field: name, block: index })
        };

        Ok(CommentRecord {
            author: sanitize_author(&field(&self.author, "author")?),
            up_votes: field(&self.up_votes, "up votes")?.trim().to_string(),
            down_votes: field(&self.down_votes, "down votes")?.trim().to_string(),
            text: sanitize_comment_text(&field(&self.text, "text")?),
        })
    }
}

/// Extracts comment records from a page body
///
/// Convenience wrapper that compiles a fresh [`CommentExtractor`].
pub fn extract_comments(html: &str) -> Result<Vec<CommentRecord>, ParseError> {
    CommentExtractor::new()?.extract(html)
}

/// Keeps the first word of an author field, without newlines, commas or quotes
///
/// # Example
///
/// ```
/// use comment_harvester::crawler::sanitize_author;
///
/// assert_eq!(sanitize_author("Ivan, Petrov\n"), "Ivan");
/// ```
pub fn sanitize_author(raw: &str) -> String {
    raw.split_whitespace()
        .next()
        .unwrap_or_default()
        .replace(AUTHOR_STRIP_CHARS, "")
}

/// Removes the moderation notice and quotes, then trims whitespace
pub fn sanitize_comment_text(raw: &str) -> String {
    raw.replace(MODERATION_NOTICE, "")
        .replace('"', "")
        .trim()
        .to_string()
}
