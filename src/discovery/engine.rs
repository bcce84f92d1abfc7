//! Discovery engine: the signal pass and the bounded forward probe

use crate::discovery::links::{build_page_url, build_page_urls};
use crate::discovery::state::{DiscoveryState, ProbeOutcome, Termination};
use crate::discovery::DiscoveryLimits;
use crate::fetcher::PageFetcher;
use crate::listing::{classify_error, extract_product_links, extract_signal};
use scraper::Html;

/// Outcome of one discovery run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Category URL discovery started from
    pub url: String,

    /// Number of pages in the category (always >= 1)
    pub page_count: u32,

    /// Highest page index advertised on the first page (range included)
    pub visible_max: Option<u32>,

    /// Probe fetches issued after the first page
    pub probes_made: u32,

    /// Why discovery stopped
    pub termination: Termination,
}

impl DiscoveryReport {
    fn decided_on_first_page(
        url: &str,
        page_count: u32,
        visible_max: Option<u32>,
        termination: Termination,
    ) -> Self {
        Self {
            url: url.to_string(),
            page_count,
            visible_max,
            probes_made: 0,
            termination,
        }
    }
}

/// Determines the page count of paginated categories
///
/// The engine owns no mutable state; every call to [`discover`] works on
/// its own [`DiscoveryState`], so one engine may serve several categories
/// concurrently.
///
/// [`discover`]: PageCountDiscovery::discover
pub struct PageCountDiscovery<F> {
    fetcher: F,
    limits: DiscoveryLimits,
}

impl<F: PageFetcher> PageCountDiscovery<F> {
    /// Creates an engine with the default limits
    pub fn new(fetcher: F) -> Self {
        Self::with_limits(fetcher, DiscoveryLimits::default())
    }

    /// Creates an engine with custom limits
    pub fn with_limits(fetcher: F, limits: DiscoveryLimits) -> Self {
        Self { fetcher, limits }
    }

    /// The limits this engine probes with
    pub fn limits(&self) -> &DiscoveryLimits {
        &self.limits
    }

    /// Returns the number of pages in the category at `url`
    pub async fn get_page_count(&self, url: &str) -> u32 {
        self.discover(url).await.page_count
    }

    /// Runs discovery for the category at `url` and reports how it ended
    ///
    /// Never fails: an unreachable or empty category counts as one page.
    pub async fn discover(&self, url: &str) -> DiscoveryReport {
        tracing::debug!("Discovering page count for {}", url);

        let Some(markup) = self.fetcher.fetch(url).await else {
            tracing::info!("First page of {} unavailable, assuming 1 page", url);
            return DiscoveryReport::decided_on_first_page(
                url,
                1,
                None,
                Termination::FirstPageUnavailable,
            );
        };

        let signal = extract_signal(&markup);

        if signal.product_links.is_empty() {
            tracing::info!("No products on first page of {}", url);
            return DiscoveryReport::decided_on_first_page(
                url,
                1,
                None,
                Termination::EmptyFirstPage,
            );
        }

        let Some(visible_max) = signal.effective_max() else {
            tracing::info!("No pagination found on {}, returning 1 page", url);
            return DiscoveryReport::decided_on_first_page(
                url,
                1,
                None,
                Termination::NoPagination,
            );
        };
        tracing::debug!("Highest visible page: page-{}", visible_max);

        if !signal.hints_more_pages() {
            tracing::info!(
                "No further page block on {}. Total pages: {}",
                url,
                visible_max
            );
            return DiscoveryReport::decided_on_first_page(
                url,
                visible_max,
                Some(visible_max),
                Termination::VisibleOnly,
            );
        }

        tracing::info!(
            "More pages hinted on {} (next block: {}, range: {:?}), probing past page-{}",
            url,
            signal.has_next_block,
            signal.range,
            visible_max
        );

        self.find_last_page_by_errors(url, visible_max).await
    }

    /// Discovers the page count and builds the URL of every page
    pub async fn create_page_links(&self, url: &str) -> Vec<String> {
        let page_count = self.get_page_count(url).await;
        tracing::info!("Creating links for {} pages", page_count);

        let pages = build_page_urls(url, page_count);
        tracing::debug!("Created {} page links", pages.len());
        pages
    }

    /// Extracts the product URLs listed on one category page
    ///
    /// Unavailable pages and error pages yield no links.
    pub async fn get_product_links(&self, page_url: &str) -> Vec<String> {
        tracing::debug!("Extracting products from {}", page_url);

        let Some(markup) = self.fetcher.fetch(page_url).await else {
            return Vec::new();
        };

        match product_links_unless_error(&markup) {
            Some(links) => {
                tracing::info!("Found {} products on {}", links.len(), page_url);
                links
            }
            None => {
                tracing::warn!("{} is an error page, skipping", page_url);
                Vec::new()
            }
        }
    }

    /// Probes pages past `start_from` until the failure heuristic stops it
    async fn find_last_page_by_errors(&self, url: &str, start_from: u32) -> DiscoveryReport {
        let mut state = DiscoveryState::starting_after(start_from);

        let termination = loop {
            if let Some(reason) = state.stop_reason(&self.limits) {
                break reason;
            }

            let page_url = build_page_url(url, state.current_page_index);
            tracing::debug!("Probing page-{}", state.current_page_index);

            let markup = self.fetcher.fetch(&page_url).await;
            let outcome = classify_probe(markup.as_deref(), &self.limits);
            log_outcome(state.current_page_index, &outcome);

            state.record(&outcome);
        };

        match termination {
            Termination::ConsecutiveFailures => tracing::info!(
                "Stopped after {} consecutive failures",
                state.consecutive_failures
            ),
            Termination::PageCeiling => tracing::warn!(
                "Reached page ceiling page-{} while probing {}",
                self.limits.max_page_index,
                url
            ),
            _ => tracing::warn!(
                "Used the probe budget of {} fetches on {}",
                self.limits.max_probes,
                url
            ),
        }

        tracing::info!(
            "Found {} pages for {} after {} probes",
            state.last_valid_page_index,
            url,
            state.total_probes_made
        );

        DiscoveryReport {
            url: url.to_string(),
            page_count: state.last_valid_page_index,
            visible_max: Some(start_from),
            probes_made: state.total_probes_made,
            termination,
        }
    }
}

/// Classifies one probed page
///
/// `markup` is what the fetcher returned; `None` means the fetch failed.
pub fn classify_probe(markup: Option<&str>, limits: &DiscoveryLimits) -> ProbeOutcome {
    let Some(markup) = markup else {
        return ProbeOutcome::Unreachable;
    };

    if markup.chars().count() < limits.min_page_length {
        return ProbeOutcome::Unreachable;
    }

    let document = Html::parse_document(markup);

    if let Some(check) = classify_error(&document) {
        return ProbeOutcome::ErrorPage(check);
    }

    match extract_product_links(&document).len() {
        0 => ProbeOutcome::Empty,
        products => ProbeOutcome::Valid { products },
    }
}

/// Product links of a page, or None if the page is an error page
fn product_links_unless_error(markup: &str) -> Option<Vec<String>> {
    let document = Html::parse_document(markup);
    if classify_error(&document).is_some() {
        return None;
    }
    Some(extract_product_links(&document))
}

fn log_outcome(page: u32, outcome: &ProbeOutcome) {
    match outcome {
        ProbeOutcome::Valid { products } => {
            tracing::debug!("page-{} lists {} products", page, products)
        }
        ProbeOutcome::Empty => tracing::debug!("page-{} lists no products", page),
        ProbeOutcome::ErrorPage(check) => {
            tracing::debug!("page-{} is an error page ({})", page, check)
        }
        ProbeOutcome::Unreachable => {
            tracing::debug!("page-{} unavailable or too short", page)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BASE: &str = "https://shop.example.com/laptops/";

    /// Fetcher serving canned pages and recording every request
    #[derive(Default)]
    struct ScriptedFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
            self.pages.insert(url.into(), body.into());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        fn probe_count(&self) -> usize {
            self.requests().len().saturating_sub(1)
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str) -> Option<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned()
        }
    }

    /// Pads markup past the minimum probe length
    fn padded(body: &str) -> String {
        format!(
            "<html><head><title>Ноутбуки</title></head><body>{}<!-- {} --></body></html>",
            body,
            "x".repeat(DEFAULT_PAD)
        )
    }

    const DEFAULT_PAD: usize = 10_500;

    fn listing_page(page: u32, pagination: &str) -> String {
        padded(&format!(
            r#"<div class="ty-compact-list__title"><a href="/p/{page}-a">A</a></div>
               <div class="ty-compact-list__title"><a href="/p/{page}-b">B</a></div>
               <div class="ty-pagination">{pagination}</div>"#
        ))
    }

    fn visible_links(pages: std::ops::RangeInclusive<u32>) -> String {
        pages
            .map(|n| format!(r#"<a href="{}page-{}/">{}</a>"#, BASE, n, n))
            .collect()
    }

    const NEXT_BLOCK: &str =
        r#"<div class="cm-history ty-pagination__item hidden-phone ty-pagination__range cm-ajax"><a>…</a></div>"#;

    fn error_page() -> String {
        padded(r#"<div class="ty-exception"><h1 class="ty-exception__title">Страница не найдена</h1></div>"#)
    }

    fn empty_page() -> String {
        padded("<p>В этой категории пока нет товаров</p>")
    }

    fn page_url(n: u32) -> String {
        build_page_url(BASE, n)
    }

    #[tokio::test]
    async fn test_first_page_unavailable() {
        let fetcher = ScriptedFetcher::default();
        let engine = PageCountDiscovery::new(&fetcher);

        let report = engine.discover(BASE).await;
        assert_eq!(report.page_count, 1);
        assert_eq!(report.termination, Termination::FirstPageUnavailable);
        assert_eq!(fetcher.requests(), vec![BASE.to_string()]);
    }

    #[tokio::test]
    async fn test_first_page_without_products() {
        let fetcher = ScriptedFetcher::default()
            .with_page(BASE, padded(&format!("<p>Пусто</p>{}", visible_links(1..=5))));
        let engine = PageCountDiscovery::new(&fetcher);

        let report = engine.discover(BASE).await;
        assert_eq!(report.page_count, 1);
        assert_eq!(report.termination, Termination::EmptyFirstPage);
    }

    #[tokio::test]
    async fn test_single_page_without_pagination() {
        let fetcher = ScriptedFetcher::default().with_page(BASE, listing_page(1, ""));
        let engine = PageCountDiscovery::new(&fetcher);

        assert_eq!(engine.get_page_count(BASE).await, 1);
        assert_eq!(fetcher.probe_count(), 0);
    }

    #[tokio::test]
    async fn test_visible_pagination_only() {
        let fetcher =
            ScriptedFetcher::default().with_page(BASE, listing_page(1, &visible_links(1..=5)));
        let engine = PageCountDiscovery::new(&fetcher);

        let report = engine.discover(BASE).await;
        assert_eq!(report.page_count, 5);
        assert_eq!(report.termination, Termination::VisibleOnly);
        assert_eq!(report.probes_made, 0);
        assert_eq!(fetcher.probe_count(), 0);
    }

    #[tokio::test]
    async fn test_probe_stops_after_three_error_pages() {
        let mut fetcher = ScriptedFetcher::default().with_page(
            BASE,
            listing_page(1, &format!("{}{}", visible_links(1..=5), NEXT_BLOCK)),
        );
        for n in 6..=8 {
            fetcher = fetcher.with_page(page_url(n), listing_page(n, ""));
        }
        for n in 9..=11 {
            fetcher = fetcher.with_page(page_url(n), error_page());
        }
        // Would be valid, but must never be requested
        fetcher = fetcher.with_page(page_url(12), listing_page(12, ""));

        let engine = PageCountDiscovery::new(&fetcher);
        let report = engine.discover(BASE).await;

        assert_eq!(report.page_count, 8);
        assert_eq!(report.termination, Termination::ConsecutiveFailures);
        assert_eq!(report.probes_made, 6);

        let requests = fetcher.requests();
        assert_eq!(requests.last(), Some(&page_url(11)));
        assert!(!requests.contains(&page_url(12)));
    }

    #[tokio::test]
    async fn test_isolated_failures_are_tolerated() {
        let mut fetcher = ScriptedFetcher::default()
            .with_page(BASE, listing_page(1, &format!("{}{}", visible_links(1..=2), NEXT_BLOCK)));
        // 3 valid, 4 empty, 5 missing, 6 valid, then nothing
        fetcher = fetcher
            .with_page(page_url(3), listing_page(3, ""))
            .with_page(page_url(4), empty_page())
            .with_page(page_url(6), listing_page(6, ""));

        let engine = PageCountDiscovery::new(&fetcher);
        let report = engine.discover(BASE).await;

        assert_eq!(report.page_count, 6);
        assert_eq!(report.termination, Termination::ConsecutiveFailures);
        // pages 3..=9 probed
        assert_eq!(report.probes_made, 7);
    }

    #[tokio::test]
    async fn test_alternating_valid_and_empty_runs_to_ceiling() {
        let mut fetcher = ScriptedFetcher::default()
            .with_page(BASE, listing_page(1, &format!("{}{}", visible_links(1..=5), NEXT_BLOCK)));
        for n in 6..=320 {
            let body = if n % 2 == 0 {
                listing_page(n, "")
            } else {
                empty_page()
            };
            fetcher = fetcher.with_page(page_url(n), body);
        }

        // Lift the probe budget so only the page ceiling applies
        let limits = DiscoveryLimits {
            max_probes: 1_000,
            ..DiscoveryLimits::default()
        };
        let engine = PageCountDiscovery::with_limits(&fetcher, limits);
        let report = engine.discover(BASE).await;

        assert_eq!(report.termination, Termination::PageCeiling);
        assert_eq!(report.page_count, 300);
        assert_eq!(report.probes_made, 295);
        assert!(!fetcher.requests().contains(&page_url(301)));
    }

    #[tokio::test]
    async fn test_probe_budget_caps_fetches() {
        let mut fetcher = ScriptedFetcher::default()
            .with_page(BASE, listing_page(1, &format!("{}{}", visible_links(1..=5), NEXT_BLOCK)));
        for n in 6..=300 {
            fetcher = fetcher.with_page(page_url(n), listing_page(n, ""));
        }

        let engine = PageCountDiscovery::new(&fetcher);
        let report = engine.discover(BASE).await;

        assert_eq!(report.termination, Termination::ProbeBudget);
        assert_eq!(report.probes_made, 200);
        assert_eq!(report.page_count, 205);
        assert_eq!(fetcher.probe_count(), 200);
    }

    #[tokio::test]
    async fn test_range_hint_triggers_probe() {
        let pagination = format!("{}<span>6 - 7</span>", visible_links(1..=5));
        let fetcher = ScriptedFetcher::default()
            .with_page(BASE, listing_page(1, &pagination))
            .with_page(page_url(8), listing_page(8, ""));

        let engine = PageCountDiscovery::new(&fetcher);
        let report = engine.discover(BASE).await;

        // Range folds into the visible max, probing starts at 8
        assert_eq!(report.visible_max, Some(7));
        assert_eq!(fetcher.requests()[1], page_url(8));
        assert_eq!(report.page_count, 8);
        assert_eq!(report.termination, Termination::ConsecutiveFailures);
    }

    #[tokio::test]
    async fn test_short_pages_count_as_unreachable() {
        let short_listing = r#"<div class="ty-compact-list__title"><a href="/p/x">X</a></div>"#;
        let fetcher = ScriptedFetcher::default()
            .with_page(BASE, listing_page(1, &format!("{}{}", visible_links(1..=3), NEXT_BLOCK)))
            .with_page(page_url(4), short_listing)
            .with_page(page_url(5), short_listing)
            .with_page(page_url(6), short_listing);

        let engine = PageCountDiscovery::new(&fetcher);
        assert_eq!(engine.get_page_count(BASE).await, 3);
    }

    #[test]
    fn test_classify_probe() {
        let limits = DiscoveryLimits::default();

        assert_eq!(classify_probe(None, &limits), ProbeOutcome::Unreachable);
        assert_eq!(
            classify_probe(Some("<html></html>"), &limits),
            ProbeOutcome::Unreachable
        );
        assert!(matches!(
            classify_probe(Some(&error_page()), &limits),
            ProbeOutcome::ErrorPage(_)
        ));
        assert_eq!(
            classify_probe(Some(&empty_page()), &limits),
            ProbeOutcome::Empty
        );
        assert_eq!(
            classify_probe(Some(&listing_page(2, "")), &limits),
            ProbeOutcome::Valid { products: 2 }
        );
    }

    #[test]
    fn test_noindex_probe_is_error_page() {
        let body = listing_page(2, "").replace(
            "<title>",
            r#"<meta name="robots" content="noindex, nofollow"><title>"#,
        );
        assert_eq!(
            classify_probe(Some(&body), &DiscoveryLimits::default()),
            ProbeOutcome::ErrorPage(crate::listing::ErrorCheck::NoIndexRobots)
        );
    }

    #[tokio::test]
    async fn test_create_page_links() {
        let fetcher =
            ScriptedFetcher::default().with_page(BASE, listing_page(1, &visible_links(1..=3)));
        let engine = PageCountDiscovery::new(&fetcher);

        let links = engine.create_page_links(BASE).await;
        assert_eq!(links, vec![BASE.to_string(), page_url(2), page_url(3)]);
    }

    #[tokio::test]
    async fn test_get_product_links() {
        let fetcher = ScriptedFetcher::default()
            .with_page(BASE, listing_page(1, ""))
            .with_page(page_url(2), error_page());
        let engine = PageCountDiscovery::new(&fetcher);

        assert_eq!(
            engine.get_product_links(BASE).await,
            vec!["/p/1-a".to_string(), "/p/1-b".to_string()]
        );
        assert!(engine.get_product_links(&page_url(2)).await.is_empty());
        assert!(engine.get_product_links(&page_url(3)).await.is_empty());
    }
}
