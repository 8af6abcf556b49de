use serde::Deserialize;
use url::Url;

/// Default browser-like identity sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Placeholder substituted with the page number in `page-path`
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Main configuration structure for Article-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub storage: StorageConfig,
}

/// Source site layout
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Origin of the source site (e.g., "https://example.com")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the canonical listing (page 1)
    #[serde(rename = "listing-path", default = "default_listing_path")]
    pub listing_path: String,

    /// Path template for pages after the first; must contain `{page}`
    #[serde(rename = "page-path", default = "default_page_path")]
    pub page_path: String,

    /// CSS selector matching article heading links on an index page
    #[serde(
        rename = "article-link-selector",
        default = "default_article_link_selector"
    )]
    pub article_link_selector: String,
}

impl SiteConfig {
    /// Builds the index page address for a 1-based page number
    ///
    /// Page 1 maps to the canonical listing; any later page maps to the
    /// paginated template.
    pub fn index_page_url(&self, page: u32) -> Result<Url, url::ParseError> {
        let base = Url::parse(&self.base_url)?;
        if page <= 1 {
            base.join(&self.listing_path)
        } else {
            base.join(&self.page_path.replace(PAGE_PLACEHOLDER, &page.to_string()))
        }
    }
}

/// HTTP fetch behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Crawl and refresh behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Minimum time between consecutive article fetches (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Minimum body length for the crawl and bulk refresh paths
    #[serde(rename = "min-content-length", default = "default_min_content_length")]
    pub min_content_length: usize,

    /// Minimum body length accepted when refreshing a single article
    #[serde(
        rename = "refresh-min-content-length",
        default = "default_refresh_min_content_length"
    )]
    pub refresh_min_content_length: usize,

    /// First index page to fetch
    #[serde(rename = "start-page", default = "default_start_page")]
    pub start_page: u32,

    /// Upper bound on index pages fetched per run
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: default_request_delay_ms(),
            min_content_length: default_min_content_length(),
            refresh_min_content_length: default_refresh_min_content_length(),
            start_page: default_start_page(),
            max_pages: None,
        }
    }
}

/// Persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_listing_path() -> String {
    "/blogs/".to_string()
}

fn default_page_path() -> String {
    "/blogs/page/{page}/".to_string()
}

fn default_article_link_selector() -> String {
    "article h2 a".to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_request_delay_ms() -> u64 {
    300
}

fn default_min_content_length() -> usize {
    200
}

fn default_refresh_min_content_length() -> usize {
    50
}

fn default_start_page() -> u32 {
    1
}
