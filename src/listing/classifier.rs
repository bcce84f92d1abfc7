//! Soft-error page classifier
//!
//! The site answers requests for nonexistent listing pages with a 200
//! response carrying an error or "moved" notice. This module recognizes
//! such pages from their markup.
//!
//! Checks run in a fixed order and the first match wins. Cheap structural
//! lookups come first; the full-text phrase scan is last.

use crate::listing::{element_text, select_all, select_first, PRODUCT_TITLE_SELECTOR};
use scraper::Html;
use std::fmt;

/// Block rendered by the site's exception handler
const EXCEPTION_BLOCK_SELECTOR: &str = "div.ty-exception";

/// Heading inside the exception block
const EXCEPTION_HEADING_SELECTOR: &str = "h1.ty-exception__title";

/// Title fragments that mark an error page
const ERROR_TITLE_PHRASES: &[&str] = &[
    "страница находится по новому адресу",
    "страница не найдена",
    "404",
    "not found",
    "ошибка",
];

/// Heading fragments that mark a moved or missing page
const MOVED_HEADING_PHRASES: &[&str] = &[
    "страница товара переехала на новый адрес.",
    "страница товара переехала",
    "переехала на новый адрес",
    "не найдена",
];

/// Body text fragments that mark an error page with no listing content
const ERROR_TEXT_PHRASES: &[&str] = &[
    "переехала",
    "новому адресу",
    "404",
    "не найдена",
    "извините за неудобства",
];

/// One independent error-page check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCheck {
    /// The exception block is present
    ExceptionBlock,

    /// The `<title>` contains an error phrase
    ErrorTitle,

    /// The exception heading reports a moved or missing page
    MovedHeading,

    /// A robots meta directive contains `noindex`
    NoIndexRobots,

    /// No product blocks, and the page text contains an error phrase
    ErrorTextWithoutProducts,
}

/// Evaluation order of the checks
pub const ERROR_CHECKS: [ErrorCheck; 5] = [
    ErrorCheck::ExceptionBlock,
    ErrorCheck::ErrorTitle,
    ErrorCheck::MovedHeading,
    ErrorCheck::NoIndexRobots,
    ErrorCheck::ErrorTextWithoutProducts,
];

impl ErrorCheck {
    /// Runs this check against a parsed document
    pub fn matches(&self, document: &Html) -> bool {
        match self {
            Self::ExceptionBlock => select_first(document, EXCEPTION_BLOCK_SELECTOR).is_some(),
            Self::ErrorTitle => select_first(document, "title")
                .map(|title| contains_any(&element_text(&title), ERROR_TITLE_PHRASES))
                .unwrap_or(false),
            Self::MovedHeading => select_first(document, EXCEPTION_HEADING_SELECTOR)
                .map(|heading| contains_any(&element_text(&heading), MOVED_HEADING_PHRASES))
                .unwrap_or(false),
            Self::NoIndexRobots => select_first(document, r#"meta[name="robots"]"#)
                .and_then(|meta| meta.value().attr("content"))
                .map(|content| content.to_lowercase().contains("noindex"))
                .unwrap_or(false),
            Self::ErrorTextWithoutProducts => {
                select_all(document, PRODUCT_TITLE_SELECTOR).is_empty()
                    && contains_any(
                        &document.root_element().text().collect::<String>(),
                        ERROR_TEXT_PHRASES,
                    )
            }
        }
    }

    /// Short name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExceptionBlock => "exception_block",
            Self::ErrorTitle => "error_title",
            Self::MovedHeading => "moved_heading",
            Self::NoIndexRobots => "noindex_robots",
            Self::ErrorTextWithoutProducts => "error_text_without_products",
        }
    }
}

impl fmt::Display for ErrorCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns the first check that flags `document` as an error page
pub fn classify_error(document: &Html) -> Option<ErrorCheck> {
    let matched = ERROR_CHECKS
        .iter()
        .copied()
        .find(|check| check.matches(document));

    if let Some(check) = matched {
        tracing::debug!("Error page detected by {}", check);
    }

    matched
}

/// Returns true if `document` is a soft-error page rather than a listing
///
/// Known false positive: a genuinely empty category whose copy happens to
/// contain one of the body-text phrases is reported as an error page.
pub fn is_error_page(document: &Html) -> bool {
    classify_error(document).is_some()
}

/// Case-insensitive substring search for any of `phrases`
fn contains_any(text: &str, phrases: &[&str]) -> bool {
    let text = text.trim().to_lowercase();
    phrases.iter().any(|phrase| text.contains(&phrase.to_lowercase()))
}
