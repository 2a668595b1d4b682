//! Article index sink
//!
//! The index is the hand-off between the two harvest phases: the listing
//! traversal appends to it and the article traversal reads it back.

use crate::output::csv::{split_record, CsvAppender, QuoteStyle};
use crate::output::{ArticleRecord, OutputResult};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

/// Header row of the article index
pub const ARTICLE_INDEX_HEADER: [&str; 2] = ["article_id", "article_url"];

/// Append-only writer for the article index
///
/// Ids already present in the file, or written earlier in this run, are not
/// written again. Re-doing the listing page at the resume cursor therefore
/// never duplicates index rows.
#[derive(Debug)]
pub struct ArticleIndexWriter {
    appender: CsvAppender,
    known_ids: HashSet<String>,
}

impl ArticleIndexWriter {
    /// Opens the index, loading the ids it already holds
    pub fn open(path: &Path) -> OutputResult<Self> {
        // Open first so a torn last row is cut before the ids are read
        let appender = CsvAppender::open(path, &ARTICLE_INDEX_HEADER, QuoteStyle::Necessary)?;
        let known_ids: HashSet<String> = read_article_index(path)?
            .into_iter()
            .map(|record| record.id)
            .collect();
        if appender.created() {
            tracing::info!("Created article index {}", appender.path().display());
        } else {
            tracing::debug!(
                "Article index {} holds {} articles",
                appender.path().display(),
                known_ids.len()
            );
        }

        Ok(Self {
            appender,
            known_ids,
        })
    }

    /// Appends a record unless its id is already indexed
    ///
    /// Returns true if a row was written.
    pub fn append(&mut self, record: &ArticleRecord) -> OutputResult<bool> {
        if self.known_ids.contains(&record.id) {
            return Ok(false);
        }

        self.appender.append(&[&record.id, &record.url])?;
        self.known_ids.insert(record.id.clone());
        Ok(true)
    }

    /// Flushes and syncs written rows
    pub fn sync(&mut self) -> OutputResult<()> {
        self.appender.sync()
    }

    /// Number of distinct ids in the index
    pub fn len(&self) -> usize {
        self.known_ids.len()
    }

    /// Returns true if the index holds no articles
    pub fn is_empty(&self) -> bool {
        self.known_ids.is_empty()
    }
}

/// Reads the article index in file order
///
/// A missing file reads as an empty index. The header row and blank lines
/// are skipped, and only the first row for each id is kept. Rows without a
/// URL column are ignored with a warning.
pub fn read_article_index(path: &Path) -> OutputResult<Vec<ArticleRecord>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_record(line);
        if line_no == 0 && fields[0] == ARTICLE_INDEX_HEADER[0] {
            continue;
        }

        let (id, url) = match fields.as_slice() {
            [id, url, ..] => (id.trim(), url.trim()),
            _ => {
                tracing::warn!(
                    "Skipping malformed index row {} in {}: {:?}",
                    line_no + 1,
                    path.display(),
                    line
                );
                continue;
            }
        };

        if seen.insert(id.to_string()) {
            records.push(ArticleRecord {
                id: id.to_string(),
                url: url.to_string(),
            });
        }
    }

    Ok(records)
}
