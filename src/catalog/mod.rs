//! Category discovery from the store's start page
//!
//! A single-level walk: top-level categories come from the main menu, and a
//! category that has its own subcategory list is replaced by those
//! subcategories. Nothing deeper is followed.

use crate::fetcher::PageFetcher;
use crate::listing::{resolve_link, select_all};
use scraper::{Html, Selector};
use std::collections::BTreeSet;

/// Main menu entry holding a top-level category link
pub const MENU_ITEM_SELECTOR: &str =
    "li.ty-menu__item.cm-menu-item-responsive.dropdown-vertical__dir.menu-level-";

/// Subcategory list on a category page
pub const SUBCATEGORIES_SELECTOR: &str = "ul.subcategories.clearfix";

/// Walks the start page's menu to collect leaf-level category URLs
pub struct CategoryWalker<F> {
    fetcher: F,
}

impl<F: PageFetcher> CategoryWalker<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Collects category URLs reachable from the start page
    ///
    /// The result is deduplicated and sorted. An unavailable start page
    /// yields no categories; an unavailable category page is kept as is.
    pub async fn get_categories(&self, start_url: &str) -> Vec<String> {
        tracing::info!("Collecting categories from {}", start_url);

        let Some(html) = self.fetcher.fetch(start_url).await else {
            tracing::warn!("Start page {} unavailable", start_url);
            return Vec::new();
        };

        let initial = menu_categories(&html, start_url);
        tracing::info!("Found {} top-level categories", initial.len());

        let mut categories = BTreeSet::new();

        for category_url in initial {
            tracing::info!("Checking category: {}", category_url);

            let Some(category_html) = self.fetcher.fetch(&category_url).await else {
                tracing::warn!("Could not fetch {}, keeping it as a category", category_url);
                categories.insert(category_url);
                continue;
            };

            match subcategories(&category_html, &category_url) {
                Some(children) => {
                    tracing::info!(
                        "{} has {} subcategories",
                        category_url,
                        children.len()
                    );
                    categories.extend(children);
                }
                None => {
                    tracing::debug!("No subcategories, keeping {}", category_url);
                    categories.insert(category_url);
                }
            }
        }

        tracing::info!("Total categories: {}", categories.len());
        categories.into_iter().collect()
    }
}

/// Absolute links of the main menu's top-level category entries, in page order
fn menu_categories(html: &str, page_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();
    for item in select_all(&document, MENU_ITEM_SELECTOR) {
        for link in hrefs(&item, page_url) {
            tracing::debug!("Found top-level category: {}", link);
            if !links.contains(&link) {
                links.push(link);
            }
        }
    }
    links
}

/// Absolute links of the subcategory list, or None if the page has no such list
fn subcategories(html: &str, page_url: &str) -> Option<Vec<String>> {
    let document = Html::parse_document(html);
    let list = select_all(&document, SUBCATEGORIES_SELECTOR).into_iter().next()?;
    Some(hrefs(&list, page_url))
}

/// `href`s of anchors below `element`, resolved against `page_url`
fn hrefs(element: &scraper::ElementRef<'_>, page_url: &str) -> Vec<String> {
    let Ok(anchor) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    element
        .select(&anchor)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| !href.is_empty())
        .filter_map(|href| resolve_link(page_url, href))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MapFetcher(HashMap<String, String>);

    #[async_trait]
    impl PageFetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> Option<String> {
            self.0.get(url).cloned()
        }
    }

    const START: &str = "https://shop.example.com/";

    fn menu(links: &[&str]) -> String {
        let items: String = links
            .iter()
            .map(|href| {
                format!(
                    r#"<li class="ty-menu__item cm-menu-item-responsive dropdown-vertical__dir menu-level-"><a href="{}">Cat</a></li>"#,
                    href
                )
            })
            .collect();
        format!("<html><body><ul>{}</ul></body></html>", items)
    }

    #[tokio::test]
    async fn test_walk_replaces_parents_with_subcategories() {
        let mut pages = HashMap::new();
        pages.insert(
            START.to_string(),
            menu(&[
                "https://shop.example.com/computers/",
                "https://shop.example.com/printers/",
                "https://shop.example.com/offline/",
            ]),
        );
        pages.insert(
            "https://shop.example.com/computers/".to_string(),
            r#"<ul class="subcategories clearfix">
                 <li><a href="https://shop.example.com/computers/laptops/">Laptops</a></li>
                 <li><a href="https://shop.example.com/computers/desktops/">Desktops</a></li>
               </ul>"#
                .to_string(),
        );
        pages.insert(
            "https://shop.example.com/printers/".to_string(),
            "<div>Printers listing</div>".to_string(),
        );

        let walker = CategoryWalker::new(MapFetcher(pages));
        let categories = walker.get_categories(START).await;

        assert_eq!(
            categories,
            vec![
                "https://shop.example.com/computers/desktops/",
                "https://shop.example.com/computers/laptops/",
                "https://shop.example.com/offline/",
                "https://shop.example.com/printers/",
            ]
        );
    }

    #[tokio::test]
    async fn test_unavailable_start_page() {
        let walker = CategoryWalker::new(MapFetcher(HashMap::new()));
        assert!(walker.get_categories(START).await.is_empty());
    }

    #[test]
    fn test_menu_categories_ignores_other_lists() {
        let html = format!(
            "{}<li class=\"ty-menu__item\"><a href=\"/footer\">Footer</a></li>",
            menu(&["/a/", "/b/", "/a/"])
        );
        assert_eq!(
            menu_categories(&html, START),
            vec!["https://shop.example.com/a/", "https://shop.example.com/b/"]
        );
    }

    #[tokio::test]
    async fn test_relative_links_resolve_against_their_page() {
        let mut pages = HashMap::new();
        pages.insert(START.to_string(), menu(&["/computers/", "printers/"]));
        pages.insert(
            "https://shop.example.com/computers/".to_string(),
            r#"<ul class="subcategories clearfix">
                 <li><a href="laptops/">Laptops</a></li>
                 <li><a href="/tablets/">Tablets</a></li>
                 <li><a href="javascript:void(0)">More</a></li>
               </ul>"#
                .to_string(),
        );

        let walker = CategoryWalker::new(MapFetcher(pages));
        let categories = walker.get_categories(START).await;

        assert_eq!(
            categories,
            vec![
                "https://shop.example.com/computers/laptops/",
                "https://shop.example.com/printers/",
                "https://shop.example.com/tablets/",
            ]
        );
    }
}
