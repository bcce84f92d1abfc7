//! Pagination signal extraction
//!
//! Pulls product links and pagination evidence out of one listing page.

use crate::listing::{select_all, select_first, NEXT_BLOCK_SELECTOR, PRODUCT_TITLE_SELECTOR};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Upper bound for a numeric range to be taken as a pagination hint
pub const MAX_RANGE_BOUND: u32 = 1000;

static PAGE_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"page-(\d+)").expect("hardcoded regex pattern is valid"));

static RANGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*-\s*(\d+)").expect("hardcoded regex pattern is valid"));

/// Structural evidence extracted from one listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSignal {
    /// Page indices found as `page-N` anywhere in the markup
    pub visible_pages: BTreeSet<u32>,

    /// Whether the "next block of pages" button is present
    pub has_next_block: bool,

    /// First numeric range `(low, high)` that extends past the visible maximum
    pub range: Option<(u32, u32)>,

    /// Product URLs on the page, deduplicated and sorted
    pub product_links: Vec<String>,
}

impl PageSignal {
    /// Highest visible page index, if any pagination marker was found
    pub fn visible_max(&self) -> Option<u32> {
        self.visible_pages.last().copied()
    }

    /// Visible maximum with the qualifying range folded in
    pub fn effective_max(&self) -> Option<u32> {
        match (self.visible_max(), self.range) {
            (Some(visible), Some((_, high))) => Some(visible.max(high)),
            (visible, _) => visible,
        }
    }

    /// Whether anything hints at pages beyond the visible maximum
    pub fn hints_more_pages(&self) -> bool {
        self.has_next_block || self.range.is_some()
    }
}

/// Parses `markup` and extracts its pagination signal
///
/// # Example
///
/// ```
/// use category_pager::listing::extract_signal;
///
/// let html = r#"<div class="ty-compact-list__title"><a href="/p/1">One</a></div>
///               <a href="/cat/page-2/">2</a>"#;
/// let signal = extract_signal(html);
/// assert_eq!(signal.product_links, vec!["/p/1".to_string()]);
/// assert_eq!(signal.visible_max(), Some(2));
/// ```
pub fn extract_signal(markup: &str) -> PageSignal {
    let document = Html::parse_document(markup);
    extract_signal_from_document(&document, markup)
}

/// Extracts the pagination signal from an already parsed document
///
/// `raw` must be the markup `document` was parsed from; page numbers are
/// matched against the raw text so they are found inside attributes,
/// scripts and comments alike.
pub fn extract_signal_from_document(document: &Html, raw: &str) -> PageSignal {
    let visible_pages = extract_page_numbers(raw);
    let has_next_block = select_first(document, NEXT_BLOCK_SELECTOR).is_some();
    let range = extract_range(document, visible_pages.last().copied());
    let product_links = extract_product_links(document);

    PageSignal {
        visible_pages,
        has_next_block,
        range,
        product_links,
    }
}

/// Collects the product URLs found inside listing title blocks
///
/// Duplicates are removed by exact string and the result is sorted, so the
/// output is identical for identical markup regardless of anchor order.
pub fn extract_product_links(document: &Html) -> Vec<String> {
    let Ok(anchor_selector) = Selector::parse("a") else {
        return Vec::new();
    };

    let links: BTreeSet<String> = select_all(document, PRODUCT_TITLE_SELECTOR)
        .iter()
        .flat_map(|block| block.select(&anchor_selector))
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect();

    links.into_iter().collect()
}

/// Scans the raw markup for `page-N` markers
fn extract_page_numbers(raw: &str) -> BTreeSet<u32> {
    PAGE_NUMBER_REGEX
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        // Values too large for u32 cannot be page numbers
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .collect()
}

/// Finds the first `low - high` text range that looks like pagination
///
/// A range qualifies when `1 <= low <= high <= MAX_RANGE_BOUND` and `high`
/// is beyond the currently known visible maximum.
///
/// Only text nodes are scanned, so a range inside an HTML comment is ignored.
fn extract_range(document: &Html, visible_max: Option<u32>) -> Option<(u32, u32)> {
    for text in document.root_element().text() {
        let Some(caps) = RANGE_REGEX.captures(text) else {
            continue;
        };

        let (Some(low), Some(high)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let (Ok(low), Ok(high)) = (low.as_str().parse::<u32>(), high.as_str().parse::<u32>())
        else {
            continue;
        };

        let in_bounds = 1 <= low && low <= high && high <= MAX_RANGE_BOUND;
        let extends_visible = visible_max.map_or(true, |max| high > max);

        if in_bounds && extends_visible {
            tracing::debug!("Found page range in text: {}", text.trim());
            return Some((low, high));
        }
    }

    None
}
