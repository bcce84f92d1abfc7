//! Page fetching
//!
//! Everything above this module sees the network through [`PageFetcher`]:
//! a URL goes in, markup or nothing comes out. Transport failures, timeouts
//! and non-success statuses are all folded into `None` here so that the
//! discovery engine never has to handle an error from the network layer.

mod http;

pub use http::{build_http_client, fetch_url, format_user_agent, FetchResult, HttpFetcher};

use async_trait::async_trait;

/// Source of raw page markup
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the markup at `url`
    ///
    /// Returns `None` when the page could not be retrieved for any reason.
    /// Implementations must not panic on ordinary HTTP-layer failures.
    async fn fetch(&self, url: &str) -> Option<String>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for &T {
    async fn fetch(&self, url: &str) -> Option<String> {
        (**self).fetch(url).await
    }
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for std::sync::Arc<T> {
    async fn fetch(&self, url: &str) -> Option<String> {
        (**self).fetch(url).await
    }
}
