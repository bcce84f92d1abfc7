//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of harvest runs:
//! run information, totals, termination reasons and per-category page counts.

use crate::discovery::Termination;
use crate::output::summary::{HarvestSummary, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Generates a markdown summary from harvest statistics
///
/// # Arguments
///
/// * `summary` - The harvest summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &HarvestSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a harvest summary as markdown
///
/// # Arguments
///
/// * `summary` - The harvest summary data
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_summary(summary: &HarvestSummary) -> String {
    let mut md = String::new();

    md.push_str("# Category-Pager Harvest Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Run ID**: {}\n", summary.run_id));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = summary.duration_seconds {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", summary.status));
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!(
        "- **Categories**: {}\n",
        summary.total_categories
    ));
    md.push_str(&format!("- **Listing Pages**: {}\n", summary.total_pages));
    md.push_str(&format!(
        "- **Average Pages per Category**: {:.2}\n",
        summary.average_pages()
    ));
    md.push_str(&format!(
        "- **Categories Probed**: {}\n",
        summary.probed_categories
    ));
    md.push_str(&format!("- **Probe Fetches**: {}\n", summary.total_probes));
    md.push_str(&format!(
        "- **Product Links**: {}\n",
        summary.total_product_links
    ));
    md.push_str(&format!(
        "- **Products Stored**: {}\n",
        summary.total_products
    ));
    md.push_str(&format!(
        "- **Harvest Rate**: {:.2}%\n\n",
        summary.harvest_rate()
    ));

    // Termination breakdown, in a fixed order
    if !summary.terminations.is_empty() {
        md.push_str("## Discovery Termination\n\n");
        md.push_str("| Reason | Categories |\n");
        md.push_str("|--------|------------|\n");

        for termination in Termination::all() {
            if let Some(count) = summary.terminations.get(&termination) {
                md.push_str(&format!("| {} | {} |\n", termination, count));
            }
        }
        md.push('\n');
    }

    if !summary.categories.is_empty() {
        md.push_str("## Categories\n\n");
        md.push_str("| URL | Pages | Visible | Probes | Termination | Links | Products |\n");
        md.push_str("|-----|-------|---------|--------|-------------|-------|----------|\n");

        for category in &summary.categories {
            let visible = category
                .visible_max
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                category.url,
                category.page_count,
                visible,
                category.probes_made,
                category.termination,
                category.product_links,
                category.products
            ));
        }
        md.push('\n');
    }

    md
}
