//! Article body extraction
//!
//! Articles on the same site are rendered by different page builders, so no
//! single selector reliably finds the body. Extraction runs an ordered list of
//! strategies, most specific first, and keeps the first candidate that is long
//! enough. The result is the first "good enough" body, not necessarily the
//! most accurate one.

use crate::crawler::parser::parse_document;
use scraper::{ElementRef, Html, Selector};

/// Elements stripped before any body text is read
pub const NOISE_SELECTOR: &str =
    "nav, header, footer, aside, script, style, .widget, .sidebar, #comments, .comments-area";

/// A body-text strategy: returns `None` when its target is absent
type Strategy = fn(&ElementRef<'_>) -> Option<String>;

/// Body strategies in the order they are tried
const STRATEGIES: &[(&str, Strategy)] = &[
    ("theme-post-content", theme_post_content),
    ("article-entry-content", article_entry_content),
    ("article-post-content", article_post_content),
    ("article", article_element),
    ("main-article", main_article),
    ("main", main_element),
    ("paragraphs", paragraphs),
];

/// Title and normalized body of an article page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleContent {
    /// May be empty when the page has neither an `h1` nor a `title`
    pub title: String,
    pub content: String,
}

impl ArticleContent {
    /// Body length in characters
    pub fn content_length(&self) -> usize {
        self.content.chars().count()
    }
}

/// Outcome of running the strategy chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// A strategy produced at least the minimum length
    Complete {
        article: ArticleContent,
        strategy: &'static str,
    },

    /// No strategy reached the minimum; carries the last candidate produced
    Insufficient { article: ArticleContent },
}

impl Extraction {
    pub fn article(&self) -> &ArticleContent {
        match self {
            Self::Complete { article, .. } | Self::Insufficient { article } => article,
        }
    }

    pub fn content_length(&self) -> usize {
        self.article().content_length()
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    /// Returns the article if it met the minimum, or if its best candidate
    /// still reaches the caller's `floor`
    pub fn accept(self, floor: usize) -> Option<ArticleContent> {
        match self {
            Self::Complete { article, .. } => Some(article),
            Self::Insufficient { article } if article.content_length() >= floor => Some(article),
            Self::Insufficient { .. } => None,
        }
    }
}

/// Runs the strategy chain against article pages
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    min_length: usize,
}

impl ContentExtractor {
    /// Creates an extractor that accepts the first candidate of at least
    /// `min_length` characters
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Parses `html` and extracts its title and body
    pub fn extract(&self, html: &str) -> Extraction {
        self.extract_document(parse_document(html))
    }

    /// Extracts title and body from an already parsed page
    ///
    /// The title is read before noise removal so a heading inside `<header>`
    /// still counts.
    pub fn extract_document(&self, mut document: Html) -> Extraction {
        let title = extract_title(&document);
        strip_noise(&mut document);

        let root = document.root_element();
        let mut last_candidate = String::new();

        for (name, strategy) in STRATEGIES {
            let Some(text) = strategy(&root) else {
                continue;
            };

            let length = text.chars().count();
            if length >= self.min_length {
                tracing::debug!(strategy = *name, length, "Body strategy accepted");
                return Extraction::Complete {
                    article: ArticleContent {
                        title,
                        content: text,
                    },
                    strategy: *name,
                };
            }

            tracing::trace!(strategy = *name, length, "Body strategy too short");
            if !text.is_empty() {
                last_candidate = text;
            }
        }

        Extraction::Insufficient {
            article: ArticleContent {
                title,
                content: last_candidate,
            },
        }
    }
}

/// Collapses every whitespace run to a single space and trims the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First non-empty `h1`, falling back to the document `title`
fn extract_title(document: &Html) -> String {
    first_text(document, "h1")
        .or_else(|| first_text(document, "title"))
        .unwrap_or_default()
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .map(|element| normalize_whitespace(&element.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

/// Detaches navigation, chrome and script elements from the tree
fn strip_noise(document: &mut Html) {
    let Ok(selector) = Selector::parse(NOISE_SELECTOR) else {
        return;
    };

    let noise: Vec<_> = document.select(&selector).map(|element| element.id()).collect();
    for id in noise {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Concatenated text of every element under `root` matching `css`
fn select_text(root: &ElementRef<'_>, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    let texts: Vec<String> = root
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .collect();

    if texts.is_empty() {
        return None;
    }

    Some(normalize_whitespace(&texts.join(" ")))
}

fn theme_post_content(root: &ElementRef<'_>) -> Option<String> {
    select_text(root, r#"div[data-widget_type="theme-post-content.default"]"#)
}

fn article_entry_content(root: &ElementRef<'_>) -> Option<String> {
    select_text(root, "article .entry-content")
}

fn article_post_content(root: &ElementRef<'_>) -> Option<String> {
    select_text(root, "article .post-content")
}

fn article_element(root: &ElementRef<'_>) -> Option<String> {
    select_text(root, "article")
}

fn main_article(root: &ElementRef<'_>) -> Option<String> {
    select_text(root, "main article")
}

fn main_element(root: &ElementRef<'_>) -> Option<String> {
    select_text(root, "main")
}

/// Every paragraph, separated by blank lines before normalization
fn paragraphs(root: &ElementRef<'_>) -> Option<String> {
    let selector = Selector::parse("p").ok()?;
    let texts: Vec<String> = root
        .select(&selector)
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();

    if texts.is_empty() {
        return None;
    }

    Some(normalize_whitespace(&texts.join("\n\n")))
}
