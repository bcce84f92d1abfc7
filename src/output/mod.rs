//! Output module for generating harvest summaries and reports
//!
//! This module handles:
//! - Loading and printing harvest statistics
//! - Generating markdown summaries of harvest runs

mod markdown;
pub mod stats;
mod summary;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{load_statistics, print_statistics, HarvestStatistics};
pub use summary::{CategorySummary, HarvestSummary, OutputError, OutputResult};

use crate::storage::Storage;

/// Generates a harvest summary of the latest run from storage
///
/// # Arguments
///
/// * `storage` - The storage backend containing harvest data
///
/// # Returns
///
/// * `Ok(HarvestSummary)` - Successfully generated summary
/// * `Err(OutputError)` - Failed to generate summary
pub fn generate_summary(storage: &dyn Storage) -> OutputResult<HarvestSummary> {
    let stats = stats::load_statistics(storage)?;
    let run = &stats.run;

    // Calculate duration if finished
    let duration_seconds = match (
        run.started_at.parse::<chrono::DateTime<chrono::Utc>>(),
        run.finished_at
            .as_deref()
            .map(|f| f.parse::<chrono::DateTime<chrono::Utc>>()),
    ) {
        (Ok(started), Some(Ok(finished))) => {
            Some((finished - started).num_seconds().max(0) as u64)
        }
        _ => None,
    };

    let products_by_category = storage.count_products_by_category(run.id)?;
    let categories = storage
        .get_categories(run.id)?
        .into_iter()
        .map(|record| CategorySummary {
            products: products_by_category
                .get(&record.url)
                .copied()
                .unwrap_or(0),
            url: record.url,
            page_count: record.page_count,
            visible_max: record.visible_max,
            probes_made: record.probes_made,
            termination: record.termination,
            product_links: record.product_links,
        })
        .collect();

    Ok(HarvestSummary {
        run_id: run.id,
        started_at: run.started_at.clone(),
        finished_at: run.finished_at.clone(),
        duration_seconds,
        status: run.status.to_db_string().to_string(),
        config_hash: run.config_hash.clone(),
        total_categories: stats.total_categories,
        total_pages: stats.total_pages,
        probed_categories: stats.probed_categories,
        total_probes: stats.total_probes,
        total_product_links: stats.total_product_links,
        total_products: stats.total_products,
        terminations: stats.terminations.clone(),
        categories,
    })
}
