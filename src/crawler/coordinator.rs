//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the pagination loop that composes every other piece
//! of the pipeline into one run:
//! - Building and fetching index page addresses
//! - Extracting article links from each index page
//! - Skipping articles already in the store
//! - Fetching, extracting and persisting new articles
//! - Tallying outcomes into [`RunStats`]

use crate::config::Config;
use crate::crawler::content::{ContentExtractor, Extraction};
use crate::crawler::parser::{parse_document, LinkExtractor};
use crate::crawler::rate_limit::RateLimiter;
use crate::crawler::stats::RunStats;
use crate::crawler::{build_http_client, fetch_url, FetchResult};
use crate::storage::{open_storage, ArticleStore, NewArticle, StorageError};
use crate::HarvestError;
use reqwest::Client;
use std::path::Path;

/// What the loop does after an index page
enum PageOutcome {
    /// Links were found and handled; move on to the next page
    Continue,
    /// Pagination has ended or the run cannot go further
    Stop,
}

/// Main crawler coordinator structure
pub struct Coordinator<S: ArticleStore> {
    config: Config,
    store: S,
    client: Client,
    links: LinkExtractor,
    extractor: ContentExtractor,
    limiter: RateLimiter,
}

impl<S: ArticleStore> Coordinator<S> {
    /// Creates a new coordinator over an already opened store
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `store` - The article store used for dedup checks and persistence
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The HTTP client or link selector could not be built
    pub fn new(config: Config, store: S) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.fetcher)?;
        let links = LinkExtractor::new(&config.site.article_link_selector, &config.site.base_url)?;
        let extractor = ContentExtractor::new(config.crawler.min_content_length);
        let limiter = RateLimiter::from_millis(config.crawler.request_delay_ms);

        Ok(Self {
            config,
            store,
            client,
            links,
            extractor,
            limiter,
        })
    }

    /// Read access to the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the coordinator, returning its store
    pub fn into_store(self) -> S {
        self.store
    }

    /// Runs the pagination loop to natural termination
    ///
    /// Pages are visited in increasing order from `start_page`. The loop
    /// stops when a page yields no article links, when an index page is not
    /// found, when an index fetch fails, or once `max_pages` index pages have
    /// been fetched. Every failure inside the loop is folded into the returned
    /// counters; nothing is raised.
    pub async fn run(&mut self, start_page: u32, max_pages: Option<u32>) -> RunStats {
        let mut stats = RunStats::new();
        let start_time = std::time::Instant::now();
        let mut page = start_page.max(1);
        let mut pages_fetched = 0u32;

        tracing::info!(
            start_page = page,
            max_pages = ?max_pages,
            "Starting crawl of {}",
            self.config.site.base_url
        );

        loop {
            if max_pages.is_some_and(|max| pages_fetched >= max) {
                tracing::info!(pages = pages_fetched, "Reached page limit");
                break;
            }

            pages_fetched += 1;
            match self.process_index_page(page, &mut stats).await {
                PageOutcome::Continue => {}
                PageOutcome::Stop => break,
            }

            page = match page.checked_add(1) {
                Some(next) => next,
                None => break,
            };
        }

        tracing::info!(
            "Crawl completed: {} new articles saved from {} pages in {:?}",
            stats.saved,
            stats.pages_processed,
            start_time.elapsed()
        );

        stats
    }

    /// Fetches one index page and processes every article it links to
    async fn process_index_page(&mut self, page: u32, stats: &mut RunStats) -> PageOutcome {
        let url = match self.config.site.index_page_url(page) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(page, "Failed to build index page address: {}", e);
                stats.record_error();
                return PageOutcome::Stop;
            }
        };

        tracing::info!(page, url = %url, "Fetching index page");

        let body = match fetch_url(&self.client, url.as_str()).await {
            FetchResult::Success { body } => body,
            FetchResult::NotFound => {
                tracing::warn!(page, url = %url, "Index page not found, ending crawl");
                return PageOutcome::Stop;
            }
            failure => {
                tracing::error!(
                    page,
                    url = %url,
                    "Index page fetch failed: {}",
                    failure.describe()
                );
                stats.record_error();
                return PageOutcome::Stop;
            }
        };

        let article_urls = self.links.extract(&parse_document(&body));
        stats.record_page();

        if article_urls.is_empty() {
            tracing::info!(page, "No article links found, end of pagination");
            return PageOutcome::Stop;
        }

        tracing::info!(page, links = article_urls.len(), "Found article links");

        for article_url in &article_urls {
            self.process_article(article_url, page, stats).await;
        }

        PageOutcome::Continue
    }

    /// Handles one discovered article link
    async fn process_article(&mut self, url: &str, page: u32, stats: &mut RunStats) {
        match self.store.exists(url) {
            Ok(true) => {
                tracing::debug!(url, "Already stored, skipping");
                stats.record_duplicate();
                return;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!(url, "Dedup lookup failed: {}", e);
                stats.record_error();
                return;
            }
        }

        self.limiter.wait().await;

        let body = match fetch_url(&self.client, url).await {
            FetchResult::Success { body } => body,
            failure => {
                tracing::warn!(url, "Article fetch failed: {}", failure.describe());
                stats.record_skipped();
                return;
            }
        };

        let article = match self.extractor.extract(&body) {
            Extraction::Complete { article, .. } => article,
            Extraction::Insufficient { article } => {
                tracing::warn!(
                    url,
                    length = article.content_length(),
                    "Insufficient content, skipping"
                );
                stats.record_skipped();
                return;
            }
        };

        let new_article = NewArticle {
            url: url.to_string(),
            title: article.title,
            content: article.content,
            page_number: Some(page),
        };

        match self.store.create(&new_article) {
            Ok(record) => {
                tracing::info!(url, id = record.id, "Saved article: {}", record.title);
                stats.record_saved();
            }
            Err(StorageError::Conflict(_)) => {
                tracing::error!(url, "Article was created concurrently, not saved");
                stats.record_error();
            }
            Err(e) => {
                tracing::error!(url, "Failed to save article: {}", e);
                stats.record_error();
            }
        }
    }
}

/// Runs one crawl against the configured SQLite database
///
/// `start_page` and `max_pages` fall back to the configured values when
/// `None`.
///
/// # Example
///
/// ```no_run
/// use article_harvest::config::load_config;
/// use article_harvest::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let stats = run_crawl(config, None, None).await?;
/// println!("saved {}", stats.saved);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    start_page: Option<u32>,
    max_pages: Option<u32>,
) -> Result<RunStats, HarvestError> {
    let start_page = start_page.unwrap_or(config.crawler.start_page);
    let max_pages = max_pages.or(config.crawler.max_pages);

    let store = open_storage(Path::new(&config.storage.database_path))?;
    let mut coordinator = Coordinator::new(config, store)?;
    Ok(coordinator.run(start_page, max_pages).await)
}
