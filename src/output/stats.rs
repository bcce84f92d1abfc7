//! Statistics generation from the harvest database
//!
//! This module provides functionality for extracting and displaying
//! harvest statistics from the storage layer.

use crate::discovery::Termination;
use crate::output::summary::{OutputError, OutputResult};
use crate::storage::{RunRecord, Storage};
use std::collections::HashMap;

/// Harvest statistics for one run
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// The run the numbers belong to
    pub run: RunRecord,

    /// Number of categories with a discovery result
    pub total_categories: u64,

    /// Sum of discovered page counts
    pub total_pages: u64,

    /// Categories whose page count needed the forward probe
    pub probed_categories: u64,

    /// Sum of probe fetches spent on discovery
    pub total_probes: u64,

    /// Product links collected across all listing pages
    pub total_product_links: u64,

    /// Products stored
    pub total_products: u64,

    /// Categories per termination reason
    pub terminations: HashMap<Termination, u64>,
}

/// Loads statistics of the latest run from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Successfully loaded statistics
/// * `Err(OutputError)` - No run recorded, or the query failed
pub fn load_statistics(storage: &dyn Storage) -> OutputResult<HarvestStatistics> {
    let run = storage.get_latest_run()?.ok_or(OutputError::NoRuns)?;

    let categories = storage.get_categories(run.id)?;
    let total_pages = categories.iter().map(|c| u64::from(c.page_count)).sum();
    let probed_categories = categories
        .iter()
        .filter(|c| c.termination.probed())
        .count() as u64;
    let total_probes = categories.iter().map(|c| u64::from(c.probes_made)).sum();
    let total_product_links = categories.iter().map(|c| u64::from(c.product_links)).sum();

    let total_products = storage.count_products(run.id)?;
    let terminations = storage.get_termination_summary(run.id)?;

    Ok(HarvestStatistics {
        total_categories: categories.len() as u64,
        total_pages,
        probed_categories,
        total_probes,
        total_product_links,
        total_products,
        terminations,
        run,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Run:");
    println!("  ID: {}", stats.run.id);
    println!("  Started: {}", stats.run.started_at);
    if let Some(finished) = &stats.run.finished_at {
        println!("  Finished: {}", finished);
    }
    println!("  Status: {}", stats.run.status.to_db_string());
    println!();

    println!("Overview:");
    println!("  Categories: {}", stats.total_categories);
    println!("  Listing pages: {}", stats.total_pages);
    println!("  Categories probed: {}", stats.probed_categories);
    println!("  Probe fetches: {}", stats.total_probes);
    println!("  Product links: {}", stats.total_product_links);
    println!("  Products stored: {}", stats.total_products);
    println!();

    if !stats.terminations.is_empty() {
        println!("Discovery Termination:");
        // Sort by count (descending)
        let mut counts: Vec<_> = stats.terminations.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1));

        for (termination, count) in counts {
            let percentage = if stats.total_categories > 0 {
                (*count as f64 / stats.total_categories as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", termination, count, percentage);
        }
        println!();
    }
}
