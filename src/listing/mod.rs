//! Listing page analysis
//!
//! This module turns the markup of a category listing page into:
//! - The set of product URLs on the page
//! - Structural pagination signals (visible page numbers, the "next block"
//!   button, numeric ranges in the text)
//! - A verdict on whether the page is a soft-error page rather than a listing
//!
//! Both the extractor and the classifier are total over arbitrary markup:
//! missing structures yield empty signals, never errors.

mod classifier;
mod signal;

pub use classifier::{classify_error, is_error_page, ErrorCheck, ERROR_CHECKS};
pub use signal::{
    extract_product_links, extract_signal, extract_signal_from_document, PageSignal,
    MAX_RANGE_BOUND,
};

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Block wrapping a product title (and its link) in a listing
pub const PRODUCT_TITLE_SELECTOR: &str = "div.ty-compact-list__title";

/// Pagination button that loads the next block of page numbers
pub const NEXT_BLOCK_SELECTOR: &str =
    "div.cm-history.ty-pagination__item.hidden-phone.ty-pagination__range.cm-ajax";

/// Returns the first element matching `css`, if any
///
/// An unparsable selector matches nothing.
pub(crate) fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

/// Returns every element matching `css`
pub(crate) fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Concatenated text of an element
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Concatenated, trimmed text of an element's descendants matching `css`
pub(crate) fn inner_text(element: &ElementRef<'_>, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    element
        .select(&selector)
        .next()
        .map(|e| element_text(&e).trim().to_string())
}

/// Resolves an href against the URL of the page it was found on
///
/// Only http(s) results are kept.
pub fn resolve_link(page_url: &str, href: &str) -> Option<String> {
    let base = Url::parse(page_url).ok()?;
    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_link() {
        let page = "https://shop.example.com/laptops/page-2/";
        assert_eq!(
            resolve_link(page, "/laptop-a/").as_deref(),
            Some("https://shop.example.com/laptop-a/")
        );
        assert_eq!(
            resolve_link(page, "item-7/").as_deref(),
            Some("https://shop.example.com/laptops/page-2/item-7/")
        );
        assert_eq!(
            resolve_link(page, "https://other.example.com/x").as_deref(),
            Some("https://other.example.com/x")
        );
        assert_eq!(resolve_link(page, "mailto:shop@example.com"), None);
        assert_eq!(resolve_link("not a url", "/x"), None);
    }
}
