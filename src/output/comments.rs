//! Comment record sink

use crate::output::csv::{CsvAppender, QuoteStyle};
use crate::output::{CommentRecord, OutputResult};
use std::path::Path;

/// Header row of the comments file
pub const COMMENTS_HEADER: [&str; 4] = ["author", "up_votes", "down_votes", "comment_text"];

/// Append-only writer for comment records
///
/// Every field is quoted. Records are not de-duplicated here; the processed
/// article set keeps finished articles from being harvested twice.
#[derive(Debug)]
pub struct CommentWriter {
    appender: CsvAppender,
    written: u64,
}

impl CommentWriter {
    /// Opens the comments file, writing the header if it is new
    pub fn open(path: &Path) -> OutputResult<Self> {
        let appender = CsvAppender::open(path, &COMMENTS_HEADER, QuoteStyle::Always)?;
        if appender.created() {
            tracing::info!("Created comments file {}", appender.path().display());
        }

        Ok(Self {
            appender,
            written: 0,
        })
    }

    /// Appends all records of one comment page
    pub fn append_all(&mut self, records: &[CommentRecord]) -> OutputResult<usize> {
        for record in records {
            self.appender.append(&[
                &record.author,
                &record.up_votes,
                &record.down_votes,
                &record.text,
            ])?;
        }
        self.written += records.len() as u64;
        Ok(records.len())
    }

    /// Flushes and syncs written rows
    pub fn sync(&mut self) -> OutputResult<()> {
        self.appender.sync()
    }

    /// Rows written through this writer since it was opened
    pub fn written(&self) -> u64 {
        self.written
    }
}
