//! HTML parsing and index-page link extraction
//!
//! Index pages link to many things: navigation, sidebars, tag clouds,
//! pagination. Only anchors matching the configured article-heading selector
//! (`article h2 a` by default) count as article links.

use crate::ConfigError;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Parses fetched HTML into a queryable document tree
///
/// Parsing is lenient: malformed markup yields a best-effort tree rather
/// than an error.
pub fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}

/// Extracts article URLs from parsed index pages
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    selector: Selector,
    origin: Url,
}

impl LinkExtractor {
    /// Creates an extractor for the given heading-link selector and site origin
    ///
    /// # Example
    ///
    /// ```
    /// use article_harvest::crawler::{parse_document, LinkExtractor};
    ///
    /// let extractor = LinkExtractor::new("article h2 a", "https://example.com").unwrap();
    /// let doc = parse_document(r#"<article><h2><a href="/post-1">One</a></h2></article>"#);
    /// assert_eq!(extractor.extract(&doc), vec!["https://example.com/post-1"]);
    /// ```
    pub fn new(selector: &str, base_url: &str) -> Result<Self, ConfigError> {
        let selector = Selector::parse(selector)
            .map_err(|_| ConfigError::InvalidSelector(selector.to_string()))?;

        let origin = Url::parse(base_url)
            .and_then(|base| base.join("/"))
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

        Ok(Self { selector, origin })
    }

    /// Returns the absolute article URLs linked from `document`
    ///
    /// Relative links are resolved against the site origin; absolute links
    /// pass through unchanged. Duplicates are dropped, first-seen order kept.
    pub fn extract(&self, document: &Html) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for element in document.select(&self.selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            if let Some(url) = resolve_link(href, &self.origin) {
                if seen.insert(url.clone()) {
                    links.push(url);
                }
            }
        }

        links
    }
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - empty hrefs and fragment-only anchors
/// - javascript:, mailto:, tel: and data: schemes
/// - anything that does not resolve to http(s)
fn resolve_link(href: &str, origin: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();

    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(href.to_string());
    }

    match origin.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
