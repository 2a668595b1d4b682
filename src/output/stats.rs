//! Statistics gathered from the checkpoint and output files
//!
//! This module provides functionality for summarizing how far a harvest
//! has progressed without touching the network.

use crate::config::Config;
use crate::output::{read_article_index, OutputResult};
use crate::state::ProgressState;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Harvest statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestStatistics {
    /// Last completed listing page
    pub listing_cursor: u32,

    /// Configured last listing page
    pub page_end: u32,

    /// Articles whose comments were fully harvested
    pub processed_articles: usize,

    /// Distinct articles in the index
    pub indexed_articles: usize,

    /// Indexed articles not yet harvested
    pub pending_articles: usize,

    /// Comment rows on disk, header excluded
    pub comment_rows: u64,
}

/// Loads statistics for a harvest
///
/// # Arguments
///
/// * `config` - The harvest configuration (for output paths)
/// * `progress` - The loaded checkpoint
pub fn load_statistics(
    config: &Config,
    progress: &ProgressState,
) -> OutputResult<HarvestStatistics> {
    let index = read_article_index(Path::new(&config.output.article_index_path))?;
    let pending_articles = index
        .iter()
        .filter(|record| !progress.is_article_processed(&record.id))
        .count();

    let comment_rows = count_comment_rows(Path::new(&config.output.comments_path))?;

    Ok(HarvestStatistics {
        listing_cursor: progress.listing_cursor(),
        page_end: config.crawler.page_end,
        processed_articles: progress.processed_count(),
        indexed_articles: index.len(),
        pending_articles,
        comment_rows,
    })
}

/// Counts comment records in the comments file
///
/// Quoted fields may span lines, so records are counted by tracking quote
/// balance rather than by counting lines.
fn count_comment_rows(path: &Path) -> OutputResult<u64> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let mut records = 0u64;
    let mut open_quotes = false;

    for line in BufReader::new(file).lines() {
        let line = line?;
        if !open_quotes && line.is_empty() {
            continue;
        }
        if line.matches('"').count() % 2 == 1 {
            open_quotes = !open_quotes;
        }
        if !open_quotes {
            records += 1;
        }
    }

    // The first complete record is the header
    Ok(records.saturating_sub(1))
}

/// Prints statistics in a human-readable format
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Listing pages:");
    println!("  Last completed page: {}", stats.listing_cursor);
    println!("  Configured end page: {}", stats.page_end);

    println!("\nArticles:");
    println!("  Indexed: {}", stats.indexed_articles);
    println!("  Harvested: {}", stats.processed_articles);
    println!("  Pending: {}", stats.pending_articles);

    println!("\nComments:");
    println!("  Rows written: {}", stats.comment_rows);
}
