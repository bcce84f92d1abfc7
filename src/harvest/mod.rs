//! Harvest module - category and product harvesting
//!
//! This module ties the other components together:
//! - Category collection from the start page or the config
//! - Page count discovery per category
//! - Product link extraction and product parsing
//! - Persisting everything under one run record

mod harvester;

pub use harvester::{HarvestReport, Harvester};

use crate::config::Config;
use crate::fetcher::HttpFetcher;
use crate::storage::SqliteStorage;
use crate::HarvestError;
use std::path::Path;

/// Main entry point for harvesting
///
/// Builds the HTTP fetcher and opens the configured database, then runs a
/// complete harvest.
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `config_hash` - Hash of the configuration file, stored on the run
///
/// # Returns
///
/// * `Ok(HarvestReport)` - Harvest completed
/// * `Err(HarvestError)` - Harvest failed
pub async fn harvest(config: Config, config_hash: &str) -> Result<HarvestReport, HarvestError> {
    let fetcher = HttpFetcher::new(&config.user_agent, &config.fetcher)?;
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    let mut harvester = Harvester::new(config, fetcher, storage);
    harvester.run(config_hash).await
}
