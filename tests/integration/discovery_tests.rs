//! Page count discovery over real HTTP

use crate::fixtures::*;
use category_pager::config::FetcherConfig;
use category_pager::discovery::{PageCountDiscovery, Termination};
use category_pager::fetcher::{format_user_agent, HttpFetcher, PageFetcher};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http_fetcher() -> HttpFetcher {
    HttpFetcher::new(&user_agent(), &FetcherConfig::default()).expect("Failed to build fetcher")
}

#[tokio::test]
async fn test_fetcher_sends_configured_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hello/"))
        .and(header("user-agent", format_user_agent(&user_agent()).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>hi</p>", "text/html"))
        .mount(&mock_server)
        .await;

    let body = http_fetcher()
        .fetch(&format!("{}/hello/", mock_server.uri()))
        .await;
    assert_eq!(body.as_deref(), Some("<p>hi</p>"));
}

#[tokio::test]
async fn test_fetcher_folds_http_errors_into_none() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/broken/", 500).await;

    let fetcher = http_fetcher();
    assert!(fetcher
        .fetch(&format!("{}/broken/", mock_server.uri()))
        .await
        .is_none());
    // Nothing mounted here, wiremock answers 404
    assert!(fetcher
        .fetch(&format!("{}/missing/", mock_server.uri()))
        .await
        .is_none());
}

#[tokio::test]
async fn test_fetcher_unreachable_host() {
    // Port 9 (discard) is not served in the test environment
    let body = http_fetcher().fetch("http://127.0.0.1:9/").await;
    assert!(body.is_none());
}

#[tokio::test]
async fn test_visible_pagination_needs_no_probes() {
    let mock_server = MockServer::start().await;
    let base = format!("{}/laptops/", mock_server.uri());

    mount_page(
        &mock_server,
        "/laptops/",
        listing_page("laptops", 1, &visible_links(&base, 5)),
    )
    .await;

    let engine = PageCountDiscovery::new(http_fetcher());
    let report = engine.discover(&base).await;

    assert_eq!(report.page_count, 5);
    assert_eq!(report.termination, Termination::VisibleOnly);
    assert_eq!(report.probes_made, 0);
    assert_eq!(requested_paths(&mock_server).await, vec!["/laptops/"]);
}

#[tokio::test]
async fn test_probing_stops_after_consecutive_failures() {
    let mock_server = MockServer::start().await;
    let base = format!("{}/laptops/", mock_server.uri());

    mount_page(
        &mock_server,
        "/laptops/",
        listing_page(
            "laptops",
            1,
            &format!("{}{}", visible_links(&base, 5), NEXT_BLOCK),
        ),
    )
    .await;
    for n in 6..=8 {
        mount_page(
            &mock_server,
            &format!("/laptops/page-{}/", n),
            listing_page("laptops", n, ""),
        )
        .await;
    }
    // A soft error page, a hard 404 and a page too short to be a listing
    mount_page(&mock_server, "/laptops/page-9/", error_page()).await;
    mount_status(&mock_server, "/laptops/page-10/", 404).await;
    mount_page(&mock_server, "/laptops/page-11/", "<p>short</p>".to_string()).await;
    mount_page(
        &mock_server,
        "/laptops/page-12/",
        listing_page("laptops", 12, ""),
    )
    .await;

    let engine = PageCountDiscovery::new(http_fetcher());
    let report = engine.discover(&base).await;

    assert_eq!(report.page_count, 8);
    assert_eq!(report.visible_max, Some(5));
    assert_eq!(report.termination, Termination::ConsecutiveFailures);
    assert_eq!(report.probes_made, 6);

    let paths = requested_paths(&mock_server).await;
    assert!(paths.contains(&"/laptops/page-11/".to_string()));
    assert!(!paths.contains(&"/laptops/page-12/".to_string()));
}

#[tokio::test]
async fn test_unavailable_first_page_counts_as_one() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/laptops/", 503).await;

    let engine = PageCountDiscovery::new(http_fetcher());
    let report = engine
        .discover(&format!("{}/laptops/", mock_server.uri()))
        .await;

    assert_eq!(report.page_count, 1);
    assert_eq!(report.termination, Termination::FirstPageUnavailable);
}

#[tokio::test]
async fn test_create_page_links_and_product_links() {
    let mock_server = MockServer::start().await;
    let base = format!("{}/laptops/", mock_server.uri());

    mount_page(
        &mock_server,
        "/laptops/",
        listing_page("laptops", 1, &visible_links(&base, 3)),
    )
    .await;
    mount_page(
        &mock_server,
        "/laptops/page-2/",
        listing_page("laptops", 2, ""),
    )
    .await;

    let engine = PageCountDiscovery::new(http_fetcher());

    let pages = engine.create_page_links(&base).await;
    assert_eq!(
        pages,
        vec![
            base.clone(),
            format!("{}page-2/", base),
            format!("{}page-3/", base),
        ]
    );

    let links = engine.get_product_links(&pages[1]).await;
    assert_eq!(
        links,
        vec!["/laptops/item-2-a/", "/laptops/item-2-b/"]
    );

    // Page 3 is not served
    assert!(engine.get_product_links(&pages[2]).await.is_empty());
}
