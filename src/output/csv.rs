//! Minimal CSV plumbing shared by the sinks
//!
//! Only what the harvest files need: header-once append files, field
//! quoting, and reading single-line records back.

use crate::output::OutputResult;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// How fields are quoted when written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// Quote every field
    Always,
    /// Quote only fields containing a delimiter, quote or line break
    Necessary,
}

/// Append-only CSV file with a header row
///
/// The header is written when the file is created, or found empty, at open
/// time. It is never re-checked on append. A record torn by an interrupted
/// write is cut off at open time, so new rows never continue a fragment.
#[derive(Debug)]
pub struct CsvAppender {
    path: PathBuf,
    writer: BufWriter<File>,
    quote: QuoteStyle,
    created: bool,
}

impl CsvAppender {
    /// Opens `path` for appending, writing `header` if the file is new or empty
    ///
    /// Trailing bytes after the last complete record are truncated first.
    pub fn open(path: &Path, header: &[&str], quote: QuoteStyle) -> OutputResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        let existing = fs::read(path)?;
        let complete = complete_records_len(&existing);
        if complete < existing.len() {
            tracing::warn!(
                "Dropping {} bytes of an incomplete record at the end of {}",
                existing.len() - complete,
                path.display()
            );
            file.set_len(complete as u64)?;
            file.sync_data()?;
        }
        let created = complete == 0;

        let mut appender = Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            quote,
            created,
        };

        if created {
            // Header fields are plain identifiers, never quoted
            let line = header.join(",");
            writeln!(appender.writer, "{}", line)?;
            appender.sync()?;
        }

        Ok(appender)
    }

    /// Appends one record
    pub fn append(&mut self, fields: &[&str]) -> OutputResult<()> {
        let line = fields
            .iter()
            .map(|field| escape_field(field, self.quote))
            .collect::<Vec<_>>()
            .join(",");
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    /// Flushes buffered records and syncs them to disk
    pub fn sync(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        Ok(())
    }

    /// Returns true if this open created the file (and wrote the header)
    pub fn created(&self) -> bool {
        self.created
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Length of the prefix of `content` made of newline-terminated records
///
/// Newlines inside quoted fields do not end a record.
fn complete_records_len(content: &[u8]) -> usize {
    let mut in_quotes = false;
    let mut complete = 0;

    for (offset, &byte) in content.iter().enumerate() {
        match byte {
            b'"' => in_quotes = !in_quotes,
            b'\n' if !in_quotes => complete = offset + 1,
            _ => {}
        }
    }

    complete
}

/// Quotes a field according to `style`, doubling embedded quotes
pub fn escape_field(field: &str, style: QuoteStyle) -> String {
    let needs_quotes = match style {
        QuoteStyle::Always => true,
        QuoteStyle::Necessary => field.contains([',', '"', '\n', '\r']),
    };

    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Splits one CSV line into fields
///
/// Handles quoted fields with doubled quotes. Records spanning several lines
/// are not supported; the article index never contains line breaks.
pub fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if current.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
}
