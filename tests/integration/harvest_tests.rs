//! Full harvest runs against a mock shop

use crate::fixtures::*;
use category_pager::discovery::Termination;
use category_pager::fetcher::HttpFetcher;
use category_pager::harvest::{harvest, Harvester};
use category_pager::output::{format_markdown_summary, generate_summary, load_statistics};
use category_pager::storage::{RunStatus, SqliteStorage, Storage};
use tempfile::TempDir;
use wiremock::MockServer;

/// Mounts a two-page laptop category and its four products
async fn mount_laptop_category(mock_server: &MockServer) -> String {
    let base = format!("{}/laptops/", mock_server.uri());

    mount_page(
        mock_server,
        "/laptops/",
        listing_page("laptops", 1, &visible_links(&base, 2)),
    )
    .await;
    mount_page(
        mock_server,
        "/laptops/page-2/",
        listing_page("laptops", 2, &visible_links(&base, 2)),
    )
    .await;

    for (item, price) in [
        ("item-1-a", "10 000"),
        ("item-1-b", "12 500,50"),
        ("item-2-a", "9 990"),
    ] {
        mount_page(
            mock_server,
            &format!("/laptops/{}/", item),
            product_page(item, price),
        )
        .await;
    }
    // item-2-b is never served

    base
}

#[tokio::test]
async fn test_full_harvest_of_configured_category() {
    let mock_server = MockServer::start().await;
    let base = mount_laptop_category(&mock_server).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("harvest.db");
    let config = create_test_config(
        &mock_server.uri(),
        vec![base.clone()],
        db_path.to_str().expect("Invalid db path"),
    );

    let report = harvest(config, "test-hash").await.expect("Harvest failed");
    assert_eq!(report.categories, 1);
    assert_eq!(report.pages, 2);
    assert_eq!(report.product_links, 4);
    assert_eq!(report.products, 3);
    assert_eq!(report.failed_products, 1);

    // Reopen the database the way the CLI does
    let storage = SqliteStorage::new(&db_path).expect("Failed to open database");
    let run = storage.get_run(report.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "test-hash");

    let categories = storage.get_categories(report.run_id).unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].url, base);
    assert_eq!(categories[0].page_count, 2);
    assert_eq!(categories[0].termination, Termination::VisibleOnly);
    assert_eq!(categories[0].product_links, 4);

    let product_url = format!("{}/laptops/item-1-b/", mock_server.uri());
    let product = storage
        .get_product(report.run_id, &product_url)
        .unwrap()
        .expect("Product should be stored");
    assert_eq!(product.title, "item-1-b");
    assert_eq!(product.article, "SKU-item-1-b");
    assert_eq!(product.brand, "Acme");
    assert_eq!(product.category, "Ноутбуки");
    assert_eq!(product.primary_price(), Some(12500.5));
    assert_eq!(product.suppliers[0].supplier_offers[0].purchase_url, product_url);

    let stats = load_statistics(&storage).unwrap();
    assert_eq!(stats.total_products, 3);

    let summary = generate_summary(&storage).unwrap();
    let markdown = format_markdown_summary(&summary);
    assert!(markdown.contains(&base));
    assert!(markdown.contains("- **Products Stored**: 3"));
}

#[tokio::test]
async fn test_harvest_walks_start_page_menu() {
    let mock_server = MockServer::start().await;
    let base = mount_laptop_category(&mock_server).await;

    // Relative menu links resolve against the start page
    mount_page(
        &mock_server,
        "/",
        r#"<html><body><ul>
             <li class="ty-menu__item cm-menu-item-responsive dropdown-vertical__dir menu-level-"><a href="/laptops/">Ноутбуки</a></li>
           </ul></body></html>"#
            .to_string(),
    )
    .await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("harvest.db");
    let mut config = create_test_config(
        &format!("{}/", mock_server.uri()),
        Vec::new(),
        db_path.to_str().expect("Invalid db path"),
    );
    config.site.max_products = 2;

    let fetcher = HttpFetcher::new(&config.user_agent, &config.fetcher).unwrap();
    let storage = SqliteStorage::new(&db_path).unwrap();
    let mut harvester = Harvester::new(config, fetcher, storage);

    let report = harvester.run("walk-hash").await.expect("Harvest failed");
    assert_eq!(report.categories, 1);
    assert_eq!(report.products, 2);

    let storage = harvester.into_storage();
    assert_eq!(storage.count_products(report.run_id).unwrap(), 2);
    let categories = storage.get_categories(report.run_id).unwrap();
    assert_eq!(categories[0].url, base);
    let latest = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(latest.id, report.run_id);
}
