//! Crawler module for page fetching and article processing
//!
//! This module contains the crawl-and-extract pipeline, including:
//! - HTTP fetching with outcome classification
//! - HTML parsing and article link extraction
//! - Body extraction through an ordered strategy chain
//! - Politeness delays between article fetches
//! - Overall crawl coordination and refresh of stored articles

mod content;
mod coordinator;
mod fetcher;
mod parser;
mod rate_limit;
mod refresh;
mod stats;

pub use content::{
    normalize_whitespace, ArticleContent, ContentExtractor, Extraction, NOISE_SELECTOR,
};
pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use parser::{parse_document, LinkExtractor};
pub use rate_limit::RateLimiter;
pub use refresh::{run_refresh_all, run_refresh_one, RefreshError, Refresher};
pub use stats::{RefreshSummary, RunStats};

use crate::config::Config;
use crate::storage::ArticleRecord;
use crate::HarvestError;

/// Runs one complete crawl with the configured start page and page limit
///
/// Returns the run's counters once pagination ends. Only setup failures
/// (opening the store, building the HTTP client) are returned as errors.
pub async fn crawl(config: Config) -> Result<RunStats, HarvestError> {
    run_crawl(config, None, None).await
}

/// Re-extracts every stored article
pub async fn refresh_all(config: Config) -> Result<RefreshSummary, HarvestError> {
    run_refresh_all(config).await
}

/// Re-extracts the stored article with this URL
pub async fn refresh_one(
    config: Config,
    url: &str,
) -> Result<Result<ArticleRecord, RefreshError>, HarvestError> {
    run_refresh_one(config, url).await
}
