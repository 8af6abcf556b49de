//! Article-Harvest main entry point
//!
//! This is the command-line interface for the Article-Harvest blog crawler.

use anyhow::{bail, Context};
use article_harvest::config::{load_config_with_hash, Config};
use article_harvest::crawler::{refresh_all, refresh_one, run_crawl, RefreshError};
use article_harvest::output::{
    load_statistics, print_article, print_refresh_summary, print_run_stats, print_statistics,
    to_json,
};
use article_harvest::storage::open_storage;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Article-Harvest: a polite blog crawler and article extractor
///
/// Article-Harvest walks a blog's paginated index, extracts the body text of
/// every article it has not seen before, and stores it in SQLite. Stored
/// articles can be re-extracted in place.
#[derive(Parser, Debug)]
#[command(name = "article-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite blog crawler and article extractor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the index pages and store new articles
    Crawl {
        /// First index page to fetch (overrides the config file)
        #[arg(long)]
        start_page: Option<u32>,

        /// Maximum number of index pages to fetch (overrides the config file)
        #[arg(long)]
        max_pages: Option<u32>,
    },

    /// Re-extract every stored article
    Refresh,

    /// Re-extract a single stored article
    RefreshOne {
        /// Exact URL of the stored article
        url: String,
    },

    /// Show what the article store currently holds
    Stats,

    /// Validate the configuration and show what would be crawled
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Crawl {
            start_page,
            max_pages,
        } => handle_crawl(config, start_page, max_pages, cli.json).await,
        Command::Refresh => handle_refresh(config, cli.json).await,
        Command::RefreshOne { url } => handle_refresh_one(config, &url, cli.json).await,
        Command::Stats => handle_stats(&config, cli.json),
        Command::Check => handle_check(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("article_harvest=info,warn"),
            1 => EnvFilter::new("article_harvest=debug,info"),
            2 => EnvFilter::new("article_harvest=trace,debug"),
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

/// Handles the crawl subcommand
async fn handle_crawl(
    config: Config,
    start_page: Option<u32>,
    max_pages: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    if start_page == Some(0) {
        bail!("--start-page must be at least 1");
    }
    if max_pages == Some(0) {
        bail!("--max-pages must be at least 1");
    }

    let stats = run_crawl(config, start_page, max_pages)
        .await
        .context("Crawl could not start")?;

    if json {
        println!("{}", to_json(&stats)?);
    } else {
        print_run_stats(&stats);
    }

    Ok(())
}

/// Handles the refresh subcommand
async fn handle_refresh(config: Config, json: bool) -> anyhow::Result<()> {
    let summary = refresh_all(config)
        .await
        .context("Refresh could not start")?;

    if json {
        println!("{}", to_json(&summary)?);
    } else {
        print_refresh_summary(&summary);
    }

    Ok(())
}

/// Handles the refresh-one subcommand
async fn handle_refresh_one(config: Config, url: &str, json: bool) -> anyhow::Result<()> {
    let outcome = refresh_one(config, url)
        .await
        .context("Refresh could not start")?;

    match outcome {
        Ok(article) => {
            if json {
                println!("{}", to_json(&article)?);
            } else {
                print_article(&article);
            }
            Ok(())
        }
        Err(e @ RefreshError::InsufficientContent { .. }) => {
            tracing::warn!("{}", e);
            bail!("Could not extract sufficient content from URL")
        }
        Err(e) => Err(e.into()),
    }
}

/// Handles the stats subcommand: shows what the store holds
fn handle_stats(config: &Config, json: bool) -> anyhow::Result<()> {
    let store = open_storage(Path::new(&config.storage.database_path))
        .with_context(|| format!("Failed to open {}", config.storage.database_path))?;
    let stats = load_statistics(&store)?;

    if json {
        println!("{}", to_json(&stats)?);
    } else {
        println!("Database: {}\n", config.storage.database_path);
        print_statistics(&stats);
    }

    Ok(())
}

/// Handles the check subcommand: shows the validated configuration
fn handle_check(config: &Config) -> anyhow::Result<()> {
    println!("=== Article-Harvest Configuration Check ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Listing path: {}", config.site.listing_path);
    println!("  Page path: {}", config.site.page_path);
    println!("  Article link selector: {}", config.site.article_link_selector);

    println!("\nFetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);
    println!("  Timeout: {}s", config.fetcher.timeout_secs);

    println!("\nCrawler:");
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Minimum content length: {}", config.crawler.min_content_length);
    println!(
        "  Single refresh minimum: {}",
        config.crawler.refresh_min_content_length
    );
    println!("  Start page: {}", config.crawler.start_page);
    match config.crawler.max_pages {
        Some(max) => println!("  Max pages: {}", max),
        None => println!("  Max pages: unlimited"),
    }

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);

    let first = config.site.index_page_url(config.crawler.start_page)?;
    let next = config.site.index_page_url(config.crawler.start_page.saturating_add(1))?;

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling at {}", first);
    println!("✓ Then continue with {}", next);

    Ok(())
}
