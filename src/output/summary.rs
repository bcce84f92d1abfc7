//! Summary types and output errors
//!
//! This module defines the data structure a harvest summary is rendered
//! from, and the error type of the output layer.

use crate::discovery::Termination;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("No harvest runs found in database")]
    NoRuns,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// One category line of a summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub url: String,
    pub page_count: u32,
    pub visible_max: Option<u32>,
    pub probes_made: u32,
    pub termination: Termination,
    pub product_links: u32,
    pub products: u64,
}

/// Summary of a single harvest run
#[derive(Debug, Clone, Default)]
pub struct HarvestSummary {
    // Run metadata
    pub run_id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<u64>,
    pub status: String,
    pub config_hash: String,

    // Overall statistics
    pub total_categories: u64,
    pub total_pages: u64,
    pub probed_categories: u64,
    pub total_probes: u64,
    pub total_product_links: u64,
    pub total_products: u64,

    // Termination reason -> category count
    pub terminations: HashMap<Termination, u64>,

    // Per-category rows, ordered by URL
    pub categories: Vec<CategorySummary>,
}

impl HarvestSummary {
    /// Creates a new empty harvest summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of product links that ended up as stored products, in percent
    pub fn harvest_rate(&self) -> f64 {
        if self.total_product_links == 0 {
            return 0.0;
        }
        (self.total_products as f64 / self.total_product_links as f64) * 100.0
    }

    /// Average number of pages per category
    pub fn average_pages(&self) -> f64 {
        if self.total_categories == 0 {
            return 0.0;
        }
        self.total_pages as f64 / self.total_categories as f64
    }
}
