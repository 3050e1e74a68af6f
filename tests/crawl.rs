//! End-to-end crawl tests against a local mock HTTP server

use sitesearch::config::{Config, SiteConfig};
use sitesearch::crawl::Crawler;
use sitesearch::error::Error;
use sitesearch::models::SiteStatus;
use sitesearch::morph::DictMorphology;
use sitesearch::store::{SqliteStore, Store};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DICT_TSV: &str = "\
леопард\tлеопард\tС мр, ед, им
леопарда\tлеопард\tС мр, ед, рд
кошка\tкошка\tС жр, ед, им
кошки\tкошка\tС жр, мн, им
хвост\tхвост\tС мр, ед, им
и\tи\tСОЮЗ
в\tв\tПРЕДЛ
";

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(format!("<html><body>{}</body></html>", body))
}

async fn crawler_for(sites: Vec<SiteConfig>, workers: usize) -> (Arc<SqliteStore>, Arc<Crawler>) {
    let store = Arc::new(SqliteStore::connect_in_memory().await.unwrap());
    let morph = Arc::new(DictMorphology::from_reader(DICT_TSV.as_bytes()).unwrap());

    let mut config = Config::default();
    config.sites = sites;
    config.crawl.workers = workers;
    config.crawl.timeout_secs = 5;

    let crawler = Arc::new(Crawler::new(store.clone(), morph, &config).unwrap());
    (store, crawler)
}

fn site(url: String) -> SiteConfig {
    SiteConfig {
        name: "Test".to_string(),
        url,
    }
}

#[tokio::test]
async fn crawl_indexes_all_reachable_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<p>кошка и леопард</p><a href="/a">a</a><a href="/b">b</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html("<p>кошки кошка</p>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html("<p>хвост леопарда</p>"))
        .mount(&server)
        .await;

    let (store, crawler) = crawler_for(vec![site(server.uri())], 2).await;
    crawler.start_crawl().await.unwrap();

    let site = store.site_by_url(&server.uri()).await.unwrap().unwrap();
    assert_eq!(site.get_status().unwrap(), SiteStatus::Indexed);
    assert!(site.last_error.is_none());

    for p in ["/", "/a", "/b"] {
        assert!(
            store.page_by_path(site.id, p).await.unwrap().is_some(),
            "page {} missing",
            p
        );
    }

    // кошка appears on "/" and "/a": frequency counts distinct pages
    let koshka = store.lemma_by_text(site.id, "кошка").await.unwrap().unwrap();
    assert_eq!(koshka.frequency, 2);
    let leopard = store.lemma_by_text(site.id, "леопард").await.unwrap().unwrap();
    assert_eq!(leopard.frequency, 2);
    // function words are never indexed
    assert!(store.lemma_by_text(site.id, "и").await.unwrap().is_none());
}

#[tokio::test]
async fn self_referencing_link_is_visited_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/a">a</a>"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<p>кошка</p><a href="/a">self</a><a href="/">root</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let (store, crawler) = crawler_for(vec![site(server.uri())], 1).await;
    crawler.start_crawl().await.unwrap();

    let site = store.site_by_url(&server.uri()).await.unwrap().unwrap();
    assert_eq!(site.get_status().unwrap(), SiteStatus::Indexed);
    assert!(store.page_by_path(site.id, "/a").await.unwrap().is_some());
    // expect(1) on both mocks verifies no URL was fetched twice
}

#[tokio::test]
async fn redirected_urls_store_one_page_per_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/a">a</a><a href="/r">r</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html("<p>кошка</p>"))
        .mount(&server)
        .await;
    // /r redirects to /a: both URLs resolve to the same relative path
    Mock::given(method("GET"))
        .and(path("/r"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/a"))
        .mount(&server)
        .await;

    let (store, crawler) = crawler_for(vec![site(server.uri())], 1).await;
    crawler.start_crawl().await.unwrap();

    let site = store.site_by_url(&server.uri()).await.unwrap().unwrap();
    let page = store.page_by_path(site.id, "/a").await.unwrap().unwrap();
    assert!(page.id > 0);

    // One page row, so кошка was indexed from exactly one page
    let koshka = store.lemma_by_text(site.id, "кошка").await.unwrap().unwrap();
    assert_eq!(koshka.frequency, 1);
}

#[tokio::test]
async fn failed_site_does_not_affect_others() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>кошка</p>"))
        .mount(&server)
        .await;

    // Port 9 (discard) refuses connections
    let dead = "http://127.0.0.1:9".to_string();
    let (store, crawler) = crawler_for(
        vec![site(server.uri()), site(dead.clone())],
        2,
    )
    .await;
    crawler.start_crawl().await.unwrap();

    let good = store.site_by_url(&server.uri()).await.unwrap().unwrap();
    assert_eq!(good.get_status().unwrap(), SiteStatus::Indexed);

    let bad = store.site_by_url(&dead).await.unwrap().unwrap();
    assert_eq!(bad.get_status().unwrap(), SiteStatus::Failed);
    assert!(bad.last_error.is_some());
}

#[tokio::test]
async fn all_sites_reach_terminal_status_with_small_worker_cap() {
    let mut servers = Vec::new();
    for _ in 0..4 {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html("<p>кошка</p>"))
            .mount(&server)
            .await;
        servers.push(server);
    }

    let sites: Vec<SiteConfig> = servers.iter().map(|s| site(s.uri())).collect();
    let (store, crawler) = crawler_for(sites, 2).await;
    crawler.start_crawl().await.unwrap();

    for server in &servers {
        let site = store.site_by_url(&server.uri()).await.unwrap().unwrap();
        let status = site.get_status().unwrap();
        assert_ne!(status, SiteStatus::Indexing, "site left INDEXING");
    }
}

#[tokio::test]
async fn stop_marks_site_failed_and_halts_page_writes() {
    let server = MockServer::start().await;

    // A slow root gives the test time to request the stop mid-fetch
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            html(r#"<p>кошка</p><a href="/a">a</a>"#).set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html("<p>хвост</p>"))
        .mount(&server)
        .await;

    let (store, crawler) = crawler_for(vec![site(server.uri())], 1).await;

    let runner = crawler.clone();
    let handle = tokio::spawn(async move { runner.start_crawl().await });

    // Wait for the crawl to be in flight, then stop it
    for _ in 0..100 {
        if crawler.is_running() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    crawler.stop_crawl().unwrap();
    handle.await.unwrap().unwrap();

    let site = store.site_by_url(&server.uri()).await.unwrap().unwrap();
    assert_eq!(site.get_status().unwrap(), SiteStatus::Failed);
    assert!(site.last_error.unwrap().contains("stopped"));

    // The stop was observed before any page write
    assert!(store.page_by_path(site.id, "/").await.unwrap().is_none());
    assert!(store.page_by_path(site.id, "/a").await.unwrap().is_none());
}

#[tokio::test]
async fn fetch_failure_keeps_pages_crawled_so_far() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<p>кошка</p><a href="/slow">slow</a>"#))
        .mount(&server)
        .await;
    // Longer than the request timeout, so the second fetch errors out
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<p>хвост</p>").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let store = Arc::new(SqliteStore::connect_in_memory().await.unwrap());
    let morph = Arc::new(DictMorphology::from_reader(DICT_TSV.as_bytes()).unwrap());
    let mut config = Config::default();
    config.sites = vec![site(server.uri())];
    config.crawl.workers = 1;
    config.crawl.timeout_secs = 1;
    let crawler = Crawler::new(store.clone(), morph, &config).unwrap();

    crawler.start_crawl().await.unwrap();

    let site = store.site_by_url(&server.uri()).await.unwrap().unwrap();
    assert_eq!(site.get_status().unwrap(), SiteStatus::Failed);
    assert!(site.last_error.is_some());

    // The page fetched before the failure survives, index included
    assert!(store.page_by_path(site.id, "/").await.unwrap().is_some());
    let koshka = store.lemma_by_text(site.id, "кошка").await.unwrap().unwrap();
    assert_eq!(koshka.frequency, 1);
}

#[tokio::test]
async fn stop_without_running_crawl_is_rejected() {
    let (_store, crawler) = crawler_for(vec![], 1).await;
    assert!(matches!(crawler.stop_crawl(), Err(Error::CrawlNotRunning)));
}

#[tokio::test]
async fn recrawl_yields_equivalent_index() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<p>кошка кошки</p><a href="/a">a</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html("<p>кошка</p>"))
        .mount(&server)
        .await;

    let (store, crawler) = crawler_for(vec![site(server.uri())], 1).await;

    crawler.start_crawl().await.unwrap();
    let site = store.site_by_url(&server.uri()).await.unwrap().unwrap();
    let first = store.lemma_by_text(site.id, "кошка").await.unwrap().unwrap();

    // The previous index is wiped, so a second run reproduces it
    crawler.start_crawl().await.unwrap();
    let site = store.site_by_url(&server.uri()).await.unwrap().unwrap();
    let second = store.lemma_by_text(site.id, "кошка").await.unwrap().unwrap();

    assert_eq!(first.frequency, second.frequency);
    assert_eq!(first.frequency, 2);
}

#[tokio::test]
async fn index_one_replaces_existing_page() {
    let server = MockServer::start().await;
    let page_mock = Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(html("<p>кошка кошка</p>"))
        .mount_as_scoped(&server)
        .await;

    let (store, crawler) = crawler_for(vec![site(server.uri())], 1).await;

    let url = format!("{}/news", server.uri());
    crawler.index_one(&url).await.unwrap();

    let site = store.site_by_url(&server.uri()).await.unwrap().unwrap();
    let koshka = store.lemma_by_text(site.id, "кошка").await.unwrap().unwrap();
    assert_eq!(koshka.frequency, 1);

    // Content changed: re-index must be delete + recreate, not a diff
    drop(page_mock);
    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(html("<p>хвост</p>"))
        .mount(&server)
        .await;

    crawler.index_one(&url).await.unwrap();

    assert!(store.lemma_by_text(site.id, "кошка").await.unwrap().is_none());
    let hvost = store.lemma_by_text(site.id, "хвост").await.unwrap().unwrap();
    assert_eq!(hvost.frequency, 1);

    let page = store.page_by_path(site.id, "/news").await.unwrap().unwrap();
    assert!(page.content.contains("хвост"));
}

#[tokio::test]
async fn index_one_rejects_unconfigured_url() {
    let server = MockServer::start().await;
    let (_store, crawler) = crawler_for(vec![site(server.uri())], 1).await;

    let result = crawler.index_one("https://elsewhere.ru/page").await;
    assert!(matches!(result, Err(Error::SiteNotConfigured(_))));
}
