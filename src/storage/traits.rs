//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::discovery::{DiscoveryReport, Termination};
use crate::product::Product;
use crate::storage::{CategoryRecord, RunRecord, RunStatus};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Category not found: {0}")]
    CategoryNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the harvester.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new harvest run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Updates the status of a run
    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Marks a run as completed with a finish timestamp
    fn complete_run(&mut self, run_id: i64) -> StorageResult<()>;

    // ===== Categories =====

    /// Records the discovery result of one category
    ///
    /// Recording the same category twice in a run replaces the earlier row.
    ///
    /// # Returns
    ///
    /// The ID of the category row
    fn record_category(&mut self, run_id: i64, report: &DiscoveryReport) -> StorageResult<i64>;

    /// Stores how many product links were collected across a category's pages
    fn set_category_product_links(&mut self, category_id: i64, count: u32) -> StorageResult<()>;

    /// Gets every category recorded in a run, ordered by URL
    fn get_categories(&self, run_id: i64) -> StorageResult<Vec<CategoryRecord>>;

    /// Counts categories by termination reason within a run
    fn get_termination_summary(&self, run_id: i64) -> StorageResult<HashMap<Termination, u64>>;

    // ===== Products =====

    /// Stores a harvested product, replacing an earlier copy from the same run
    fn upsert_product(
        &mut self,
        run_id: i64,
        category_url: &str,
        url: &str,
        product: &Product,
    ) -> StorageResult<i64>;

    /// Loads a product harvested in a run
    fn get_product(&self, run_id: i64, url: &str) -> StorageResult<Option<Product>>;

    /// Counts products harvested in a run
    fn count_products(&self, run_id: i64) -> StorageResult<u64>;

    /// Counts products per category URL within a run
    fn count_products_by_category(&self, run_id: i64) -> StorageResult<HashMap<String, u64>>;
}
