//! Canned shop pages and helpers shared by the integration tests

use category_pager::config::{
    Config, DiscoveryConfig, FetcherConfig, OutputConfig, SiteConfig, UserAgentConfig,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Length of the filler comment that lifts a page past the probe minimum
const PAD: usize = 10_500;

pub const NEXT_BLOCK: &str = r#"<div class="cm-history ty-pagination__item hidden-phone ty-pagination__range cm-ajax"><a>…</a></div>"#;

pub fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestPager".to_string(),
        crawler_version: "1.0".to_string(),
        contact_url: "https://example.com/about".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

/// Creates a test configuration harvesting the given categories
pub fn create_test_config(start_url: &str, categories: Vec<String>, db_path: &str) -> Config {
    Config {
        site: SiteConfig {
            start_url: start_url.to_string(),
            categories,
            max_products: 0,
        },
        user_agent: user_agent(),
        fetcher: FetcherConfig {
            timeout_secs: 5,
            connect_timeout_secs: 2,
        },
        discovery: DiscoveryConfig::default(),
        output: OutputConfig {
            database_path: db_path.to_string(),
            summary_path: "./unused_summary.md".to_string(),
        },
    }
}

pub fn padded(body: &str) -> String {
    format!(
        "<html><head><title>Ноутбуки</title></head><body>{}<!-- {} --></body></html>",
        body,
        "x".repeat(PAD)
    )
}

/// A listing page with two products and the given pagination markup
pub fn listing_page(category: &str, page: u32, pagination: &str) -> String {
    padded(&format!(
        r#"<div class="ty-compact-list__title"><a href="/{category}/item-{page}-a/">A</a></div>
           <div class="ty-compact-list__title"><a href="/{category}/item-{page}-b/">B</a></div>
           <div class="ty-pagination">{pagination}</div>"#
    ))
}

/// Pagination links to pages `1..=last` of the category at `base`
pub fn visible_links(base: &str, last: u32) -> String {
    (1..=last)
        .map(|n| format!(r#"<a href="{}page-{}/">{}</a>"#, base, n, n))
        .collect()
}

pub fn error_page() -> String {
    padded(r#"<div class="ty-exception"><h1 class="ty-exception__title">Страница не найдена</h1></div>"#)
}

pub fn product_page(title: &str, price: &str) -> String {
    format!(
        r#"<html><head><title>{title}</title></head><body>
             <div class="ty-breadcrumbs clearfix"><a href="/">Главная</a><a href="/laptops/">Ноутбуки</a></div>
             <h1 class="ty-product-block-title">{title}</h1>
             <div class="ty-product-block__sku"><span class="ty-control-group__item">SKU-{title}</span></div>
             <div class="ty-features-list">Acme</div>
             <span class="ty-price"><span class="ty-price-num">{price}</span></span>
           </body></html>"#
    )
}

/// Serves `body` as HTML at `route`
pub async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

/// Serves a bare status code at `route`
pub async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Paths of every request the server received, in order
pub async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect()
}
