//! Integration tests for the crawl and refresh pipeline
//!
//! These tests use wiremock to stand in for the blog and a temporary SQLite
//! database for the store, and drive full runs end-to-end.

use article_harvest::config::{Config, CrawlerConfig, FetcherConfig, SiteConfig, StorageConfig};
use article_harvest::crawler::{crawl, Coordinator, RefreshError, Refresher, RunStats};
use article_harvest::storage::{ArticleStore, NewArticle, SqliteArticleStore};
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, db_path: &Path) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            listing_path: "/blogs/".to_string(),
            page_path: "/blogs/page/{page}/".to_string(),
            article_link_selector: "article h2 a".to_string(),
        },
        fetcher: FetcherConfig {
            timeout_secs: 5,
            ..FetcherConfig::default()
        },
        crawler: CrawlerConfig {
            request_delay_ms: 0,
            ..CrawlerConfig::default()
        },
        storage: StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
        },
    }
}

/// An index page linking to each of `slugs`, with navigation noise around it
fn index_page(slugs: &[&str]) -> String {
    let entries: String = slugs
        .iter()
        .map(|slug| {
            format!(
                r#"<article class="post"><h2><a href="/blogs/{slug}/">Post {slug}</a></h2>
                   <p>Excerpt</p><a href="/blogs/{slug}/">Read more</a></article>"#
            )
        })
        .collect();

    format!(
        r#"<html><head><title>Blog</title></head><body>
           <nav><a href="/">Home</a><a href="/about/">About</a></nav>
           <main>{entries}</main>
           <div class="pagination"><a href="/blogs/page/2/">Next</a></div>
           </body></html>"#
    )
}

/// An index page past the end of the archive: 200 but no article links
fn empty_index_page() -> String {
    r#"<html><body><nav><a href="/">Home</a></nav><main><p>No posts found.</p></main></body></html>"#
        .to_string()
}

/// An article page whose body text is `body`
fn article_page(title: &str, body: &str) -> String {
    format!(
        r#"<html><head><title>{title} | Blog</title></head><body>
           <header><a href="/">Site Header</a></header>
           <nav>Navigation Menu</nav>
           <article>
             <h1>{title}</h1>
             <div class="entry-content">
               <p>{body}</p>
             </div>
           </article>
           <aside class="sidebar">Sidebar Widget</aside>
           <footer>Footer Copyright</footer>
           </body></html>"#
    )
}

/// A bare page holding only a paragraph of `body`
fn bare_page(body: &str) -> String {
    format!("<html><body><p>{body}</p></body></html>")
}

/// Body text of at least `chars` characters spread over several lines
fn long_body(chars: usize) -> String {
    let sentence = "This sentence pads the article body.\n      ";
    sentence.repeat(chars / 30 + 1)
}

async fn mount_page(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

async fn mount_never_fetched(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_page(&["late"])))
        .expect(0)
        .mount(server)
        .await;
}

fn open_store(dir: &TempDir) -> SqliteArticleStore {
    SqliteArticleStore::new(&dir.path().join("articles.db")).unwrap()
}

fn has_double_whitespace(text: &str) -> bool {
    text.chars()
        .collect::<Vec<_>>()
        .windows(2)
        .any(|w| w[0].is_whitespace() && w[1].is_whitespace())
}

#[tokio::test]
async fn test_end_to_end_saves_long_and_skips_short() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/blogs/", index_page(&["a", "b"])).await;
    mount_page(&server, "/blogs/page/2/", empty_index_page()).await;
    mount_page(&server, "/blogs/a/", article_page("Article A", &long_body(300))).await;
    mount_page(&server, "/blogs/b/", article_page("B", "Too short.")).await;
    mount_never_fetched(&server, "/blogs/page/3/").await;

    let config = create_test_config(&server.uri(), &dir.path().join("articles.db"));
    let stats = crawl(config).await.unwrap();

    assert_eq!(
        stats,
        RunStats {
            pages_processed: 2,
            saved: 1,
            duplicates: 0,
            skipped: 1,
            errors: 0,
        }
    );

    let store = open_store(&dir);
    assert_eq!(store.count().unwrap(), 1);

    let url_a = format!("{}/blogs/a/", server.uri());
    let saved = store.find_by_url(&url_a).unwrap().unwrap();
    assert_eq!(saved.title, "Article A");
    assert_eq!(saved.page_number, Some(1));
    assert!(!saved.is_updated);
    assert!(saved.updated_content.is_none());
    assert!(saved.content.chars().count() >= 200);
    assert!(!has_double_whitespace(&saved.content));
    for marker in ["Site Header", "Navigation Menu", "Sidebar Widget", "Footer Copyright"] {
        assert!(!saved.content.contains(marker), "noise leaked: {}", marker);
    }

    let url_b = format!("{}/blogs/b/", server.uri());
    assert!(store.find_by_url(&url_b).unwrap().is_none());
}

#[tokio::test]
async fn test_second_run_counts_duplicates() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/blogs/", index_page(&["a", "b"])).await;
    mount_page(&server, "/blogs/page/2/", empty_index_page()).await;
    Mock::given(method("GET"))
        .and(path("/blogs/a/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(article_page("A", &long_body(300))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blogs/b/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(article_page("B", &long_body(400))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &dir.path().join("articles.db"));

    let first = crawl(config.clone()).await.unwrap();
    assert_eq!(first.saved, 2);
    assert_eq!(first.duplicates, 0);

    let second = crawl(config).await.unwrap();
    assert_eq!(
        second,
        RunStats {
            pages_processed: 2,
            saved: 0,
            duplicates: 2,
            skipped: 0,
            errors: 0,
        }
    );

    assert_eq!(open_store(&dir).count().unwrap(), 2);
}

#[tokio::test]
async fn test_stops_at_first_page_without_links() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/blogs/", index_page(&["a"])).await;
    mount_page(&server, "/blogs/page/2/", index_page(&["b"])).await;
    mount_page(&server, "/blogs/page/3/", empty_index_page()).await;
    mount_page(&server, "/blogs/a/", article_page("A", &long_body(250))).await;
    mount_page(&server, "/blogs/b/", article_page("B", &long_body(250))).await;
    mount_never_fetched(&server, "/blogs/page/4/").await;

    let config = create_test_config(&server.uri(), &dir.path().join("articles.db"));
    let stats = crawl(config).await.unwrap();

    assert_eq!(stats.pages_processed, 3);
    assert_eq!(stats.saved, 2);
    assert_eq!(stats.errors, 0);

    let store = open_store(&dir);
    let b = store
        .find_by_url(&format!("{}/blogs/b/", server.uri()))
        .unwrap()
        .unwrap();
    assert_eq!(b.page_number, Some(2));
}

#[tokio::test]
async fn test_max_pages_bounds_index_fetches() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/blogs/", index_page(&["a"])).await;
    mount_page(&server, "/blogs/page/2/", index_page(&["b"])).await;
    mount_page(&server, "/blogs/a/", article_page("A", &long_body(250))).await;
    mount_page(&server, "/blogs/b/", article_page("B", &long_body(250))).await;
    mount_never_fetched(&server, "/blogs/page/3/").await;

    let mut config = create_test_config(&server.uri(), &dir.path().join("articles.db"));
    config.crawler.max_pages = Some(2);

    let stats = crawl(config).await.unwrap();
    assert_eq!(stats.pages_processed, 2);
    assert_eq!(stats.saved, 2);
}

#[tokio::test]
async fn test_start_page_uses_paginated_address() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_never_fetched(&server, "/blogs/").await;
    mount_page(&server, "/blogs/page/3/", index_page(&["c"])).await;
    mount_page(&server, "/blogs/page/4/", empty_index_page()).await;
    mount_page(&server, "/blogs/c/", article_page("C", &long_body(250))).await;

    let store = open_store(&dir);
    let config = create_test_config(&server.uri(), &dir.path().join("articles.db"));
    let mut coordinator = Coordinator::new(config, store).unwrap();

    let stats = coordinator.run(3, None).await;
    assert_eq!(stats.pages_processed, 2);
    assert_eq!(stats.saved, 1);

    let c = coordinator
        .store()
        .find_by_url(&format!("{}/blogs/c/", server.uri()))
        .unwrap()
        .unwrap();
    assert_eq!(c.page_number, Some(3));
}

#[tokio::test]
async fn test_index_not_found_ends_run_without_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Page 2 is not mounted, so the mock server answers 404.
    mount_page(&server, "/blogs/", index_page(&["a"])).await;
    mount_page(&server, "/blogs/a/", article_page("A", &long_body(250))).await;

    let config = create_test_config(&server.uri(), &dir.path().join("articles.db"));
    let stats = crawl(config).await.unwrap();

    assert_eq!(
        stats,
        RunStats {
            pages_processed: 1,
            saved: 1,
            duplicates: 0,
            skipped: 0,
            errors: 0,
        }
    );
}

#[tokio::test]
async fn test_index_server_error_counts_error_and_stops() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/blogs/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_never_fetched(&server, "/blogs/page/2/").await;

    let config = create_test_config(&server.uri(), &dir.path().join("articles.db"));
    let stats = crawl(config).await.unwrap();

    assert_eq!(
        stats,
        RunStats {
            errors: 1,
            ..RunStats::default()
        }
    );
    assert_eq!(open_store(&dir).count().unwrap(), 0);
}

#[tokio::test]
async fn test_article_fetch_failure_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/blogs/", index_page(&["broken", "ok"])).await;
    mount_page(&server, "/blogs/page/2/", empty_index_page()).await;
    Mock::given(method("GET"))
        .and(path("/blogs/broken/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    mount_page(&server, "/blogs/ok/", article_page("OK", &long_body(250))).await;

    let config = create_test_config(&server.uri(), &dir.path().join("articles.db"));
    let stats = crawl(config).await.unwrap();

    assert_eq!(stats.saved, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.errors, 0);
}

#[tokio::test]
async fn test_known_url_is_not_fetched_or_recreated() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let known_url = format!("{}/blogs/known/", server.uri());

    let mut store = open_store(&dir);
    store
        .create(&NewArticle {
            url: known_url.clone(),
            title: "Known".to_string(),
            content: "stored earlier".to_string(),
            page_number: Some(1),
        })
        .unwrap();

    mount_page(&server, "/blogs/", index_page(&["known", "fresh"])).await;
    mount_page(&server, "/blogs/page/2/", empty_index_page()).await;
    Mock::given(method("GET"))
        .and(path("/blogs/known/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article_page("K", &long_body(300))))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "/blogs/fresh/", article_page("Fresh", &long_body(300))).await;

    let config = create_test_config(&server.uri(), &dir.path().join("articles.db"));
    let mut coordinator = Coordinator::new(config, store).unwrap();
    let stats = coordinator.run(1, None).await;

    assert_eq!(stats.duplicates, 1);
    assert_eq!(stats.saved, 1);

    let store = coordinator.into_store();
    assert_eq!(store.count().unwrap(), 2);
    let known = store.find_by_url(&known_url).unwrap().unwrap();
    assert_eq!(known.content, "stored earlier");
}

#[tokio::test]
async fn test_refresh_one_below_floor_leaves_content() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let url = format!("{}/blogs/thin/", server.uri());

    let mut store = open_store(&dir);
    store
        .create(&NewArticle {
            url: url.clone(),
            title: "Thin".to_string(),
            content: "original content".to_string(),
            page_number: Some(1),
        })
        .unwrap();

    let forty = "a".repeat(40);
    mount_page(&server, "/blogs/thin/", bare_page(&forty)).await;

    let config = create_test_config(&server.uri(), &dir.path().join("articles.db"));
    let mut refresher = Refresher::new(&config, store).unwrap();

    let result = refresher.refresh_one(&url).await;
    match result {
        Err(RefreshError::InsufficientContent { length, .. }) => assert_eq!(length, 40),
        other => panic!("unexpected result: {:?}", other),
    }

    let stored = refresher.store().find_by_url(&url).unwrap().unwrap();
    assert_eq!(stored.content, "original content");
    assert!(!stored.is_updated);
    assert!(stored.updated_content.is_none());
}

#[tokio::test]
async fn test_refresh_one_overwrites_content() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let url = format!("{}/blogs/post/", server.uri());

    let mut store = open_store(&dir);
    store
        .create(&NewArticle {
            url: url.clone(),
            title: "Old".to_string(),
            content: String::new(),
            page_number: Some(2),
        })
        .unwrap();

    let body = "Sixty characters of text are enough for a manual refresh run.";
    mount_page(&server, "/blogs/post/", bare_page(body)).await;

    let config = create_test_config(&server.uri(), &dir.path().join("articles.db"));
    let mut refresher = Refresher::new(&config, store).unwrap();

    let updated = refresher.refresh_one(&url).await.unwrap();
    assert_eq!(updated.content, body);
    assert_eq!(updated.updated_content.as_deref(), Some(body));
    assert_eq!(updated.title, "Old");
    assert_eq!(updated.page_number, Some(2));
    assert!(updated.is_updated);

    let reopened = open_store(&dir);
    assert_eq!(reopened.find_by_url(&url).unwrap().unwrap(), updated);
}

#[tokio::test]
async fn test_bulk_refresh_tallies_outcomes() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let mut store = open_store(&dir);
    for slug in ["good", "thin", "gone"] {
        store
            .create(&NewArticle {
                url: format!("{}/blogs/{}/", server.uri(), slug),
                title: slug.to_string(),
                content: "stale".to_string(),
                page_number: Some(1),
            })
            .unwrap();
    }

    mount_page(&server, "/blogs/good/", article_page("Good Again", &long_body(300))).await;
    // Above the single-article floor but below the bulk minimum.
    mount_page(&server, "/blogs/thin/", bare_page(&"b".repeat(120))).await;
    Mock::given(method("GET"))
        .and(path("/blogs/gone/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &dir.path().join("articles.db"));
    let mut refresher = Refresher::new(&config, store).unwrap();
    let summary = refresher.refresh_all().await;

    assert_eq!(summary.total_articles, 3);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.errors, 1);

    let store = refresher.into_store();
    let good = store
        .find_by_url(&format!("{}/blogs/good/", server.uri()))
        .unwrap()
        .unwrap();
    assert_eq!(good.title, "Good Again");
    assert!(good.is_updated);
    assert!(!has_double_whitespace(&good.content));

    for slug in ["thin", "gone"] {
        let record = store
            .find_by_url(&format!("{}/blogs/{}/", server.uri(), slug))
            .unwrap()
            .unwrap();
        assert_eq!(record.content, "stale");
        assert!(!record.is_updated);
    }
}

/// Seeds `slugs` as stored articles and serves a long page for each
async fn refreshable_site(
    server: &MockServer,
    dir: &TempDir,
    slugs: &[&str],
) -> SqliteArticleStore {
    let mut store = open_store(dir);
    for slug in slugs {
        store
            .create(&NewArticle {
                url: format!("{}/blogs/{}/", server.uri(), slug),
                title: slug.to_string(),
                content: "stale".to_string(),
                page_number: Some(1),
            })
            .unwrap();
        let route = format!("/blogs/{}/", slug);
        mount_page(server, &route, article_page(slug, &long_body(300))).await;
    }
    store
}

#[tokio::test]
async fn test_crawl_spaces_article_fetches() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/blogs/", index_page(&["a", "b"])).await;
    mount_page(&server, "/blogs/page/2/", empty_index_page()).await;
    mount_page(&server, "/blogs/a/", article_page("A", &long_body(300))).await;
    mount_page(&server, "/blogs/b/", article_page("B", &long_body(300))).await;

    let mut config = create_test_config(&server.uri(), &dir.path().join("articles.db"));
    config.crawler.request_delay_ms = 300;

    let start = Instant::now();
    let stats = crawl(config).await.unwrap();

    assert_eq!(stats.saved, 2);
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_crawl_first_article_fetch_is_not_delayed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/blogs/", index_page(&["a"])).await;
    mount_page(&server, "/blogs/page/2/", empty_index_page()).await;
    mount_page(&server, "/blogs/a/", article_page("A", &long_body(300))).await;

    let mut config = create_test_config(&server.uri(), &dir.path().join("articles.db"));
    config.crawler.request_delay_ms = 3_000;

    let start = Instant::now();
    let stats = crawl(config).await.unwrap();

    assert_eq!(stats.saved, 1);
    assert!(start.elapsed() < Duration::from_millis(2_000));
}

#[tokio::test]
async fn test_bulk_refresh_spaces_fetches() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let store = refreshable_site(&server, &dir, &["a", "b"]).await;

    let mut config = create_test_config(&server.uri(), &dir.path().join("articles.db"));
    config.crawler.request_delay_ms = 300;
    let mut refresher = Refresher::new(&config, store).unwrap();

    let start = Instant::now();
    let summary = refresher.refresh_all().await;

    assert_eq!(summary.updated, 2);
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_bulk_refresh_first_fetch_is_not_delayed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let store = refreshable_site(&server, &dir, &["a"]).await;

    let mut config = create_test_config(&server.uri(), &dir.path().join("articles.db"));
    config.crawler.request_delay_ms = 3_000;
    let mut refresher = Refresher::new(&config, store).unwrap();

    let start = Instant::now();
    let summary = refresher.refresh_all().await;

    assert_eq!(summary.updated, 1);
    assert!(start.elapsed() < Duration::from_millis(2_000));
}
