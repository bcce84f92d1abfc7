//! Page URL construction

/// Builds the URL of page `page` of the category at `base_url`
///
/// Page 1 is the category URL itself; page N > 1 lives at
/// `<base without trailing slash>/page-N/`.
pub fn build_page_url(base_url: &str, page: u32) -> String {
    if page <= 1 {
        base_url.to_string()
    } else {
        format!("{}/page-{}/", base_url.trim_end_matches('/'), page)
    }
}

/// Builds the ordered list of URLs for pages `1..=count`
///
/// # Example
///
/// ```
/// use category_pager::discovery::build_page_urls;
///
/// let urls = build_page_urls("https://shop.example.com/laptops/", 3);
/// assert_eq!(
///     urls,
///     vec![
///         "https://shop.example.com/laptops/",
///         "https://shop.example.com/laptops/page-2/",
///         "https://shop.example.com/laptops/page-3/",
///     ]
/// );
/// ```
pub fn build_page_urls(base_url: &str, count: u32) -> Vec<String> {
    (1..=count).map(|page| build_page_url(base_url, page)).collect()
}
