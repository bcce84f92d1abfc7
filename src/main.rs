//! Category-Pager main entry point
//!
//! This is the command-line interface for the Category-Pager catalog harvester.

use category_pager::config::{load_config_with_hash, Config};
use category_pager::discovery::PageCountDiscovery;
use category_pager::fetcher::HttpFetcher;
use category_pager::harvest::harvest;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Category-Pager: a product catalog harvester
///
/// Category-Pager walks an e-commerce site's categories, works out how many
/// listing pages each one really has, and stores the products it finds.
#[derive(Parser, Debug)]
#[command(name = "category-pager")]
#[command(version = "1.0.0")]
#[command(about = "A paginated catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long, conflicts_with_all = ["stats", "export_summary", "count", "links"])]
    dry_run: bool,

    /// Show statistics of the latest run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary", "count", "links"])]
    stats: bool,

    /// Generate markdown summary of the latest run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "count", "links"])]
    export_summary: bool,

    /// Discover the page count of one category and exit
    #[arg(long, value_name = "URL", conflicts_with_all = ["dry_run", "stats", "export_summary", "links"])]
    count: Option<String>,

    /// Print the page URLs of one category and exit
    #[arg(long, value_name = "URL", conflicts_with_all = ["dry_run", "stats", "export_summary", "count"])]
    links: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else if let Some(url) = cli.count {
        handle_count(&config, &url).await?;
    } else if let Some(url) = cli.links {
        handle_links(&config, &url).await?;
    } else {
        handle_harvest(config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("category_pager=info,warn"),
            1 => EnvFilter::new("category_pager=debug,info"),
            2 => EnvFilter::new("category_pager=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Category-Pager Dry Run ===\n");

    println!("Site:");
    println!("  Start URL: {}", config.site.start_url);
    if config.site.max_products == 0 {
        println!("  Max products: unlimited");
    } else {
        println!("  Max products: {}", config.site.max_products);
    }

    println!("\nDiscovery:");
    println!(
        "  Min page length: {} chars",
        config.discovery.min_page_length
    );
    println!(
        "  Max consecutive failures: {}",
        config.discovery.max_consecutive_failures
    );
    println!("  Max page index: {}", config.discovery.max_page_index);
    println!("  Max probes: {}", config.discovery.max_probes);

    println!("\nFetcher:");
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  Connect timeout: {}s", config.fetcher.connect_timeout_secs);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);

    if config.site.categories.is_empty() {
        println!("\nCategories: collected from the start page menu");
    } else {
        println!("\nCategories ({}):", config.site.categories.len());
        for category in &config.site.categories {
            println!("  - {}", category);
        }
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use category_pager::output::{load_statistics, print_statistics};
    use category_pager::storage::SqliteStorage;
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: generates markdown summary
fn handle_export_summary(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use category_pager::output::{generate_markdown_summary, generate_summary};
    use category_pager::storage::SqliteStorage;
    use std::path::Path;

    println!("=== Exporting Harvest Summary ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    tracing::info!("Loading harvest data from database...");
    let summary = generate_summary(&storage)?;

    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(&summary, Path::new(&config.output.summary_path))?;

    println!("✓ Summary exported to: {}", config.output.summary_path);

    Ok(())
}

fn discovery_engine(config: &Config) -> Result<PageCountDiscovery<HttpFetcher>, Box<dyn std::error::Error>> {
    let fetcher = HttpFetcher::new(&config.user_agent, &config.fetcher)?;
    Ok(PageCountDiscovery::with_limits(
        fetcher,
        config.discovery.limits(),
    ))
}

/// Handles the --count mode: discovers one category's page count
async fn handle_count(config: &Config, url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let engine = discovery_engine(config)?;
    let report = engine.discover(url).await;

    println!("Category: {}", report.url);
    println!("Pages: {}", report.page_count);
    if let Some(visible) = report.visible_max {
        println!("Highest visible page: {}", visible);
    }
    if report.termination.probed() {
        let limits = engine.limits();
        println!(
            "Probe fetches: {} (budget {}, ceiling page-{})",
            report.probes_made, limits.max_probes, limits.max_page_index
        );
    }
    println!("Stopped because: {}", report.termination);

    Ok(())
}

/// Handles the --links mode: prints every page URL of one category
async fn handle_links(config: &Config, url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let engine = discovery_engine(config)?;
    for page in engine.create_page_links(url).await {
        println!("{}", page);
    }
    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, config_hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    if config.site.categories.is_empty() {
        tracing::info!("Starting harvest from {}", config.site.start_url);
    } else {
        tracing::info!(
            "Starting harvest of {} configured categories",
            config.site.categories.len()
        );
    }

    match harvest(config, config_hash).await {
        Ok(report) => {
            tracing::info!(
                "Harvest completed: run {}, {} categories, {} product links, {} products ({} failed, {} duplicates)",
                report.run_id,
                report.categories,
                report.product_links,
                report.products,
                report.failed_products,
                report.duplicate_products
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
