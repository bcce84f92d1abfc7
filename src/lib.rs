//! Category-Pager: a product catalog harvester
//!
//! This crate harvests product listings from a paginated e-commerce category
//! structure. Its core is the pagination boundary discovery engine, which
//! works out how many pages a category really has when the site does not
//! advertise it reliably.

pub mod catalog;
pub mod config;
pub mod discovery;
pub mod fetcher;
pub mod harvest;
pub mod listing;
pub mod output;
pub mod product;
pub mod storage;

use thiserror::Error;

/// Main error type for Category-Pager operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Category-Pager operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use discovery::{build_page_urls, DiscoveryLimits, DiscoveryReport, PageCountDiscovery};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use listing::{extract_signal, is_error_page, PageSignal};
