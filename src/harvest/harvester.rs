//! Harvester - the end-to-end harvest loop
//!
//! For every category the harvester:
//! - Discovers the page count and records it
//! - Collects product links from every listing page
//! - Fetches, parses and stores each product

use crate::catalog::CategoryWalker;
use crate::config::Config;
use crate::discovery::{build_page_urls, PageCountDiscovery};
use crate::fetcher::PageFetcher;
use crate::listing::resolve_link;
use crate::product::ProductParser;
use crate::storage::{RunStatus, Storage, StorageError};
use crate::HarvestError;
use std::collections::HashSet;
use url::Url;

/// Counters of a finished harvest run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    pub run_id: i64,
    pub categories: u32,
    pub skipped_categories: u32,
    pub pages: u64,
    pub product_links: u64,
    pub products: u64,
    pub failed_products: u64,
    /// Product links already stored under an earlier category of the run
    pub duplicate_products: u64,
}

/// Drives one harvest run over a fetcher and a storage backend
pub struct Harvester<F, S> {
    config: Config,
    fetcher: F,
    storage: S,
}

impl<F: PageFetcher, S: Storage> Harvester<F, S> {
    /// Creates a harvester
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    /// * `fetcher` - Source of page markup
    /// * `storage` - Where runs, categories and products are written
    pub fn new(config: Config, fetcher: F, storage: S) -> Self {
        Self {
            config,
            fetcher,
            storage,
        }
    }

    /// Read access to the storage backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consumes the harvester, returning its storage backend
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Runs a complete harvest
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file, stored on the run
    ///
    /// # Returns
    ///
    /// * `Ok(HarvestReport)` - The run completed
    /// * `Err(HarvestError)` - A storage operation failed; the run is marked failed
    pub async fn run(&mut self, config_hash: &str) -> Result<HarvestReport, HarvestError> {
        let run_id = self.storage.create_run(config_hash)?;
        tracing::info!("Starting harvest run {}", run_id);

        let mut report = HarvestReport {
            run_id,
            ..HarvestReport::default()
        };

        match self.harvest_all(run_id, &mut report).await {
            Ok(()) => {
                self.storage.complete_run(run_id)?;
                tracing::info!(
                    "Harvest run {} completed: {} categories, {} pages, {} products",
                    run_id,
                    report.categories,
                    report.pages,
                    report.products
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!("Harvest run {} failed: {}", run_id, e);
                if let Err(status_err) = self.storage.update_run_status(run_id, RunStatus::Failed)
                {
                    tracing::error!("Could not mark run {} as failed: {}", run_id, status_err);
                }
                Err(e.into())
            }
        }
    }

    /// Category URLs of this run: the configured list, or a walk of the start page
    async fn category_urls(&self) -> Vec<String> {
        if !self.config.site.categories.is_empty() {
            tracing::info!(
                "Using {} configured categories",
                self.config.site.categories.len()
            );
            return self.config.site.categories.clone();
        }

        CategoryWalker::new(&self.fetcher)
            .get_categories(&self.config.site.start_url)
            .await
    }

    async fn harvest_all(
        &mut self,
        run_id: i64,
        report: &mut HarvestReport,
    ) -> Result<(), StorageError> {
        let categories = self.category_urls().await;
        let max_products = u64::from(self.config.site.max_products);

        let Self {
            config,
            fetcher,
            storage,
        } = self;

        let engine = PageCountDiscovery::with_limits(&*fetcher, config.discovery.limits());
        let parser = ProductParser::new(&*fetcher);

        // A product listed in several categories is stored once, under the first
        let mut stored = HashSet::new();

        for category_url in categories {
            if max_products > 0 && report.products >= max_products {
                tracing::info!("Product limit of {} reached", max_products);
                break;
            }

            if let Err(e) = Url::parse(&category_url) {
                tracing::warn!("Skipping category {}: {}", category_url, e);
                report.skipped_categories += 1;
                continue;
            }

            tracing::info!("Harvesting category {}", category_url);
            let discovery = engine.discover(&category_url).await;
            let category_id = storage.record_category(run_id, &discovery)?;
            report.categories += 1;

            // Product links across all pages, in first-seen order
            let mut seen = HashSet::new();
            let mut product_urls = Vec::new();
            for page_url in build_page_urls(&category_url, discovery.page_count) {
                report.pages += 1;
                for href in engine.get_product_links(&page_url).await {
                    let Some(product_url) = resolve_link(&page_url, &href) else {
                        tracing::debug!("Ignoring unusable product link {}", href);
                        continue;
                    };
                    if seen.insert(product_url.clone()) {
                        product_urls.push(product_url);
                    }
                }
            }

            let link_count = u32::try_from(product_urls.len()).unwrap_or(u32::MAX);
            storage.set_category_product_links(category_id, link_count)?;
            report.product_links += product_urls.len() as u64;
            tracing::info!(
                "{}: {} pages, {} product links",
                category_url,
                discovery.page_count,
                product_urls.len()
            );

            for product_url in product_urls {
                if max_products > 0 && report.products >= max_products {
                    break;
                }
                if stored.contains(&product_url) {
                    tracing::debug!("{} already stored in this run", product_url);
                    report.duplicate_products += 1;
                    continue;
                }

                match parser.parse_product(&product_url).await {
                    Some(product) => {
                        storage.upsert_product(run_id, &category_url, &product_url, &product)?;
                        stored.insert(product_url);
                        report.products += 1;
                    }
                    None => report.failed_products += 1,
                }
            }
        }

        Ok(())
    }
}
