use link_tally::config::{Config, CrawlerConfig};
use link_tally::crawler::{crawl, Coordinator};
use link_tally::output::build_report;
use link_tally::state::PageOutcome;
use link_tally::url::normalize_url;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Creates a test configuration with fast pacing
fn create_test_config(max_pages: Option<usize>) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_concurrent_fetches: 4,
            min_request_spacing: 5, // Very short for testing
            request_timeout: 5,
            max_pages,
        },
        ..Config::default()
    }
}

/// Builds an HTML page linking to each href in order
fn html_page(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!("<html><head><title>Test</title></head><body>{}</body></html>", anchors)
}

/// Mounts an HTML page that must be fetched exactly `times` times
async fn mount_page(server: &MockServer, page: &str, hrefs: &[&str], times: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html_page(hrefs), "text/html"))
        .expect(times)
        .mount(server)
        .await;
}

/// Page key of `page` on the mock server
fn key(server: &MockServer, page: &str) -> String {
    normalize_url(&format!("{}{}", server.uri(), page))
        .expect("mock server URL should normalize")
        .to_string()
}

#[tokio::test]
async fn test_counts_references_and_fetches_each_page_once() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    // A -> B twice, A -> C once, B -> C once
    mount_page(&server, "/", &["/b", "/b", "/c"], 1).await;
    mount_page(&server, "/b", &["/c"], 1).await;
    mount_page(&server, "/c", &[], 1).await;

    let coordinator = Coordinator::new(create_test_config(None), &seed, &seed)
        .expect("Failed to create coordinator");
    let result = coordinator.run().await.expect("Crawl failed");

    assert_eq!(result.pages.len(), 3);
    assert_eq!(result.pages.get_str(&key(&server, "/")), Some(1));
    assert_eq!(result.pages.get_str(&key(&server, "/b")), Some(2));
    assert_eq!(result.pages.get_str(&key(&server, "/c")), Some(2));
    assert_eq!(result.stats.count(PageOutcome::Fetched), 3);
}

#[tokio::test]
async fn test_seed_self_link_counts_without_refetch() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", &["/", "/#top", "/about"], 1).await;
    mount_page(&server, "/about", &["/"], 1).await;

    let pages = crawl(create_test_config(None), &seed, &seed)
        .await
        .expect("Crawl failed");

    assert_eq!(pages.get_str(&key(&server, "/")), Some(4));
    assert_eq!(pages.get_str(&key(&server, "/about")), Some(1));
}

#[tokio::test]
async fn test_not_found_page_is_counted_but_not_expanded() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", &["/missing"], 1).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_raw(html_page(&["/hidden"]), "text/html"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/hidden", &[], 0).await;

    let coordinator = Coordinator::new(create_test_config(None), &seed, &seed).unwrap();
    let result = coordinator.run().await.expect("Crawl failed");

    assert_eq!(result.pages.get_str(&key(&server, "/missing")), Some(1));
    assert_eq!(result.pages.get_str(&key(&server, "/hidden")), None);
    assert_eq!(result.stats.count(PageOutcome::HttpError), 1);
}

#[tokio::test]
async fn test_non_html_page_is_counted_but_not_parsed() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", &["/report.pdf", "/report.pdf"], 1).await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(html_page(&["/hidden"]), "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/hidden", &[], 0).await;

    let coordinator = Coordinator::new(create_test_config(None), &seed, &seed).unwrap();
    let result = coordinator.run().await.expect("Crawl failed");

    assert_eq!(result.pages.get_str(&key(&server, "/report.pdf")), Some(2));
    assert_eq!(result.pages.get_str(&key(&server, "/hidden")), None);
    assert_eq!(result.stats.count(PageOutcome::Skipped), 1);
}

#[tokio::test]
async fn test_other_hosts_are_never_fetched() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    // Same machine, different hostname
    let other_base = other.uri().replace("127.0.0.1", "localhost");
    let off_host = format!("{}/secret", other_base);

    mount_page(&server, "/", &[off_host.as_str(), "https://example.org/"], 1).await;
    mount_page(&other, "/secret", &[], 0).await;

    let coordinator = Coordinator::new(create_test_config(None), &seed, &seed).unwrap();
    let result = coordinator.run().await.expect("Crawl failed");

    assert_eq!(result.pages.len(), 1);
    assert_eq!(result.stats.off_host_links, 2);
}

#[tokio::test]
async fn test_redirect_off_host_is_not_crawled() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    let target = format!("{}/ext", other.uri().replace("127.0.0.1", "localhost"));
    mount_page(&server, "/", &["/go"], 1).await;
    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", target.as_str()))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&other, "/ext", &["/injected"], 0).await;
    mount_page(&server, "/injected", &[], 0).await;

    let coordinator = Coordinator::new(create_test_config(None), &seed, &seed).unwrap();
    let result = coordinator.run().await.expect("Crawl failed");

    assert_eq!(result.pages.len(), 2);
    assert_eq!(result.pages.get_str(&key(&server, "/go")), Some(1));
    assert_eq!(result.pages.get_str(&key(&server, "/injected")), None);
    assert_eq!(result.stats.count(PageOutcome::Skipped), 1);
}

/// Records when each request arrived and answers after a fixed delay
#[derive(Clone)]
struct SlowPage {
    arrivals: Arc<Mutex<Vec<Instant>>>,
    delay: Duration,
}

impl Respond for SlowPage {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        ResponseTemplate::new(200)
            .set_body_raw(html_page(&[]), "text/html")
            .set_delay(self.delay)
    }
}

#[tokio::test]
async fn test_fan_out_respects_concurrency_cap() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    let children: Vec<String> = (0..8).map(|i| format!("/child/{}", i)).collect();
    let hrefs: Vec<&str> = children.iter().map(String::as_str).collect();
    mount_page(&server, "/", &hrefs, 1).await;

    let slow = SlowPage {
        arrivals: Arc::new(Mutex::new(Vec::new())),
        delay: Duration::from_millis(150),
    };
    Mock::given(method("GET"))
        .and(path_regex(r"^/child/\d+$"))
        .respond_with(slow.clone())
        .expect(8)
        .mount(&server)
        .await;

    let mut config = create_test_config(None);
    config.crawler.max_concurrent_fetches = 2;
    config.crawler.min_request_spacing = 0;

    let coordinator = Coordinator::new(config, &seed, &seed).unwrap();
    let result = coordinator.run().await.expect("Crawl failed");
    assert_eq!(result.stats.count(PageOutcome::Fetched), 9);

    // A request is in flight from its arrival until its delayed response
    let arrivals = slow.arrivals.lock().unwrap().clone();
    for &at in &arrivals {
        let in_flight = arrivals
            .iter()
            .filter(|&&start| start <= at && at < start + slow.delay)
            .count();
        assert!(in_flight <= 2, "{} requests in flight at once", in_flight);
    }
}

#[tokio::test]
async fn test_unreachable_page_is_counted() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    // Same host as the mock server, nothing listening
    mount_page(&server, "/", &["http://127.0.0.1:1/down"], 1).await;

    let coordinator = Coordinator::new(create_test_config(None), &seed, &seed).unwrap();
    let result = coordinator.run().await.expect("Crawl failed");

    assert_eq!(result.pages.get_str("127.0.0.1:1/down"), Some(1));
    assert_eq!(result.stats.count(PageOutcome::Unreachable), 1);
}

#[tokio::test]
async fn test_budget_limits_fetches() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", &["/p1", "/p2", "/p3", "/p4"], 1).await;
    mount_page(&server, "/p1", &["/p4"], 1).await;
    for page in ["/p2", "/p3", "/p4"] {
        mount_page(&server, page, &[], 0).await;
    }

    let coordinator = Coordinator::new(create_test_config(Some(3)), &seed, &seed).unwrap();
    let result = coordinator.run().await.expect("Crawl failed");

    // Every reference is counted, only pages under the budget are fetched
    assert_eq!(result.pages.len(), 5);
    assert_eq!(result.pages.get_str(&key(&server, "/p4")), Some(2));
    assert_eq!(result.stats.count(PageOutcome::Fetched), 2);
    assert_eq!(result.stats.count(PageOutcome::OverBudget), 3);
}

#[tokio::test]
async fn test_shutdown_before_run_fetches_nothing() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", &["/a"], 0).await;

    let coordinator = Coordinator::new(create_test_config(None), &seed, &seed).unwrap();
    let shutdown = coordinator.shutdown_handle();
    shutdown.trigger();
    assert!(shutdown.is_triggered());

    let result = coordinator.run().await.expect("Crawl failed");

    assert_eq!(result.pages.len(), 1);
    assert_eq!(result.pages.get_str(&key(&server, "/")), Some(1));
    assert_eq!(result.stats.count(PageOutcome::Cancelled), 1);
    assert_eq!(result.stats.pages_requested(), 0);
}

#[tokio::test]
async fn test_report_orders_crawled_pages() {
    let server = MockServer::start().await;
    let seed = format!("{}/", server.uri());

    mount_page(&server, "/", &["/popular", "/rare", "/popular"], 1).await;
    mount_page(&server, "/popular", &["/popular"], 1).await;
    mount_page(&server, "/rare", &["/popular"], 1).await;

    let pages = crawl(create_test_config(None), &seed, &seed)
        .await
        .expect("Crawl failed");
    let report = build_report(&pages);

    assert_eq!(report[0].url, key(&server, "/popular"));
    assert_eq!(report[0].count, 4);
    assert_eq!(report.len(), 3);
    assert_eq!(
        report[0].to_string(),
        format!("Found 4 internal links to {}", key(&server, "/popular"))
    );
}

#[tokio::test]
async fn test_invalid_seed_is_fatal() {
    let result = crawl(create_test_config(None), "not a url", "not a url").await;
    assert!(result.is_err());
}
