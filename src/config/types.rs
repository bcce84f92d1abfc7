use crate::discovery::{
    DiscoveryLimits, DEFAULT_MAX_CONSECUTIVE_FAILURES, DEFAULT_MAX_PAGE_INDEX, DEFAULT_MAX_PROBES,
    DEFAULT_MIN_PAGE_LENGTH,
};
use serde::Deserialize;

/// Main configuration structure for Category-Pager
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    pub output: OutputConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Start page holding the top-level category menu
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Explicit category URLs; when non-empty the category walk is skipped
    #[serde(default)]
    pub categories: Vec<String>,

    /// Maximum number of products to parse per run (0 = unlimited)
    #[serde(rename = "max-products", default)]
    pub max_products: u32,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// HTTP fetcher timeouts
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Pagination discovery heuristic configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Probed pages shorter than this (in characters) count as unreachable
    #[serde(rename = "min-page-length", default = "default_min_page_length")]
    pub min_page_length: usize,

    /// Consecutive non-valid probes that end the scan
    #[serde(
        rename = "max-consecutive-failures",
        default = "default_max_consecutive_failures"
    )]
    pub max_consecutive_failures: u32,

    /// Highest page index that will ever be probed
    #[serde(rename = "max-page-index", default = "default_max_page_index")]
    pub max_page_index: u32,

    /// Hard cap on probe fetches per category
    #[serde(rename = "max-probes", default = "default_max_probes")]
    pub max_probes: u32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            min_page_length: default_min_page_length(),
            max_consecutive_failures: default_max_consecutive_failures(),
            max_page_index: default_max_page_index(),
            max_probes: default_max_probes(),
        }
    }
}

impl DiscoveryConfig {
    /// Converts the configured values into engine limits
    pub fn limits(&self) -> DiscoveryLimits {
        DiscoveryLimits {
            min_page_length: self.min_page_length,
            max_consecutive_failures: self.max_consecutive_failures,
            max_page_index: self.max_page_index,
            max_probes: self.max_probes,
        }
    }
}

fn default_min_page_length() -> usize {
    DEFAULT_MIN_PAGE_LENGTH
}

fn default_max_consecutive_failures() -> u32 {
    DEFAULT_MAX_CONSECUTIVE_FAILURES
}

fn default_max_page_index() -> u32 {
    DEFAULT_MAX_PAGE_INDEX
}

fn default_max_probes() -> u32 {
    DEFAULT_MAX_PROBES
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}
