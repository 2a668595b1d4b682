//! Comment Harvester main entry point
//!
//! This is the command-line interface for the resumable comment harvester.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use comment_harvester::config::{load_config_with_hash, Config};
use comment_harvester::crawler::{Harvester, Phase};
use comment_harvester::output::{load_statistics, print_statistics};
use comment_harvester::storage::{JsonProgressStore, ProgressStore};
use comment_harvester::ErrorKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Comment Harvester: a resumable news comment scraper
///
/// Walks numbered listing pages, indexes articles with enough comments, then
/// harvests every comment page of those articles. Interrupted runs resume
/// from the last checkpoint.
#[derive(Parser, Debug)]
#[command(name = "comment-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A resumable news comment harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Reset the checkpoint before running (output files are kept)
    #[arg(long)]
    fresh: bool,

    /// Route requests through the proxy, overriding the config toggle
    #[arg(long)]
    proxify: bool,

    /// Phases to run
    #[arg(long, value_enum, default_value_t = PhaseArg::All)]
    phase: PhaseArg,

    /// Validate config and show the resume point without fetching anything
    #[arg(long, conflicts_with_all = ["stats", "fresh"])]
    dry_run: bool,

    /// Show checkpoint and output statistics and exit
    #[arg(long, conflicts_with_all = ["dry_run", "fresh"])]
    stats: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PhaseArg {
    All,
    Listing,
    Comments,
}

impl From<PhaseArg> for Phase {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::All => Phase::All,
            PhaseArg::Listing => Phase::Listing,
            PhaseArg::Comments => Phase::Comments,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).context("invalid configuration");
        }
    };

    if cli.proxify {
        config.http.use_proxy = true;
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_harvest(config, config_hash, cli.phase.into(), cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("comment_harvester=info,warn"),
            1 => EnvFilter::new("comment_harvester=debug,info"),
            2 => EnvFilter::new("comment_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the resume point
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let store = JsonProgressStore::new(&config.output.progress_path);
    let progress = store.load().context("failed to read checkpoint")?;

    println!("=== Comment Harvester Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Listing path: {}", config.site.listing_path);

    println!("\nCrawler Configuration:");
    println!(
        "  Listing pages: {}..={}",
        config.crawler.page_start, config.crawler.page_end
    );
    println!(
        "  Comment threshold: more than {}",
        config.crawler.comment_threshold
    );
    println!(
        "  Page delay: {}-{}ms",
        config.crawler.min_page_delay, config.crawler.max_page_delay
    );
    println!(
        "  Retries: {} (delay {}ms)",
        config.crawler.max_retries, config.crawler.retry_delay
    );

    println!("\nHTTP:");
    println!("  Timeout: {}s", config.http.timeout);
    println!("  User agents: {}", config.http.user_agents.len());
    println!(
        "  Proxy: {}",
        match (config.http.use_proxy, &config.http.proxy_url) {
            (false, _) => "off".to_string(),
            (true, Some(url)) => url.clone(),
            (true, None) => "from environment".to_string(),
        }
    );

    println!("\nOutput:");
    println!("  Checkpoint: {}", store.path().display());
    println!("  Article index: {}", config.output.article_index_path);
    println!("  Comments: {}", config.output.comments_path);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would resume at listing page {} with {} articles already harvested",
        progress.listing_cursor().max(config.crawler.page_start),
        progress.processed_count()
    );

    Ok(())
}

/// Handles the --stats mode: shows checkpoint and output statistics
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let store = JsonProgressStore::new(&config.output.progress_path);
    println!("Checkpoint: {}\n", store.path().display());

    let progress = store.load().context("failed to read checkpoint")?;

    let stats = load_statistics(config, &progress).context("failed to read output files")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: Config,
    config_hash: String,
    phase: Phase,
    fresh: bool,
) -> anyhow::Result<()> {
    tracing::info!(
        "Harvesting {} (listing pages {}..={}, threshold {})",
        config.site.base_url,
        config.crawler.page_start,
        config.crawler.page_end,
        config.crawler.comment_threshold
    );

    let mut harvester = Harvester::new(config)?.with_config_hash(config_hash);

    if fresh {
        tracing::info!("Starting fresh harvest (ignoring previous checkpoint)");
        harvester.reset_progress()?;
    }

    match harvester.run(phase).await {
        Ok(report) => {
            if let Some(listing) = report.listing {
                tracing::info!(
                    "Listing: {} pages, {} new articles indexed",
                    listing.pages,
                    listing.indexed
                );
            }
            if let Some(articles) = report.articles {
                tracing::info!(
                    "Articles: {} harvested, {} skipped, {} comments saved",
                    articles.harvested,
                    articles.skipped,
                    articles.comments
                );
            }
            tracing::info!("Harvest completed successfully");
            Ok(())
        }
        Err(e) => {
            let hint = match e.kind() {
                ErrorKind::TransportFailure | ErrorKind::MalformedContent => {
                    "re-run to resume from the last checkpoint"
                }
                ErrorKind::PersistenceFailure => "check the output and checkpoint paths",
                ErrorKind::Configuration => "fix the configuration",
            };
            tracing::error!("Harvest failed ({:?}): {}; {}", e.kind(), e, hint);
            Err(e.into())
        }
    }
}
