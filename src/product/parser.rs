//! Product page parser
//!
//! Field extraction is a set of simple DOM lookups. Each lookup has a static
//! fallback, so parsing never fails once the page markup is in hand.

use crate::fetcher::PageFetcher;
use crate::listing::{inner_text, select_all, select_first};
use crate::product::schema::{
    Attribute, PriceInfo, Product, Supplier, SupplierOffer, NO_DATA,
};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Field names under which the characteristics table lists the country
const COUNTRY_FIELD_NAMES: &[&str] = &[
    "Страна изготовления товара",
    "manufacturerCountry",
    "Страна производителя",
    "Страна-производитель",
    "Страна изготовитель",
    "Country",
    "Manufacturer Country",
    "Country of Origin",
];

/// Characteristics already mapped to dedicated fields (compared lower-cased)
const EXCLUDED_ATTRIBUTES: &[&str] = &[
    "название",
    "бренд",
    "производитель",
    "артикул",
    "цена",
    "стоимость",
    "наличие",
    "в наличии",
    "гарантия",
    "страна изготовления товара",
    "категория",
    "описание",
    "manufacturercountry",
];

/// One row of the characteristics table
#[derive(Debug, Clone, PartialEq, Eq)]
struct CharacteristicRow {
    name: String,
    value: String,
    /// First cell contains a `<b>` element (a section header)
    bold_name: bool,
}

impl CharacteristicRow {
    /// Whether the value carries information
    fn has_value(&self) -> bool {
        !self.value.is_empty() && self.value != "-"
    }
}

/// Fetches and parses product pages
pub struct ProductParser<F> {
    fetcher: F,
}

impl<F: PageFetcher> ProductParser<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Fetches the product page at `url` and parses it
    ///
    /// Returns None only when the page could not be fetched.
    pub async fn parse_product(&self, url: &str) -> Option<Product> {
        tracing::info!("Parsing product: {}", url);

        let Some(html) = self.fetcher.fetch(url).await else {
            tracing::error!("Failed to fetch product page: {}", url);
            return None;
        };

        Some(parse_product_html(&html, url))
    }
}

/// Parses product page markup into a [`Product`]
pub fn parse_product_html(html: &str, url: &str) -> Product {
    let document = Html::parse_document(html);
    let rows = characteristic_rows(&document);

    let mut product = Product::new(
        extract_title(&document),
        extract_article(&document),
        extract_brand(&document, &rows),
    );
    product.description = extract_description(&rows);
    product.country_of_origin = extract_country(&rows);
    product.warranty_months = extract_warranty(&rows);
    product.category = extract_category(&document);
    product.attributes = extract_attributes(&rows);
    product.suppliers = vec![extract_supplier(&document, url)];

    product
}

/// Text of an element with every fragment trimmed and joined without separator
fn stripped_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn or_no_data(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| NO_DATA.to_string())
}

fn extract_title(document: &Html) -> String {
    or_no_data(select_first(document, "h1.ty-product-block-title").map(|h1| stripped_text(&h1)))
}

fn extract_article(document: &Html) -> String {
    or_no_data(
        select_first(document, "div.ty-product-block__sku")
            .and_then(|block| inner_text(&block, "span.ty-control-group__item")),
    )
}

fn extract_brand(document: &Html, rows: &[CharacteristicRow]) -> String {
    let from_features = select_first(document, "div.ty-features-list")
        .map(|block| stripped_text(&block))
        .filter(|text| !text.is_empty());

    or_no_data(from_features.or_else(|| row_value(rows, |name| name == "Производитель")))
}

fn extract_description(rows: &[CharacteristicRow]) -> String {
    or_no_data(row_value(rows, |name| name.to_lowercase() == "описание"))
}

fn extract_country(rows: &[CharacteristicRow]) -> String {
    or_no_data(row_value(rows, |name| {
        let name_lower = name.to_lowercase();
        COUNTRY_FIELD_NAMES.contains(&name)
            || COUNTRY_FIELD_NAMES
                .iter()
                .any(|field| name_lower.contains(&field.to_lowercase()))
    }))
}

fn extract_warranty(rows: &[CharacteristicRow]) -> String {
    or_no_data(row_value(rows, |name| name == "Гарантия"))
}

/// Last non-empty breadcrumb
fn extract_category(document: &Html) -> String {
    let crumbs = select_first(document, "div.ty-breadcrumbs.clearfix")
        .and_then(|block| {
            let anchor = Selector::parse("a").ok()?;
            block
                .select(&anchor)
                .map(|a| stripped_text(&a))
                .filter(|text| !text.is_empty())
                .last()
        });

    or_no_data(crumbs)
}

/// Characteristics not mapped to a dedicated field
fn extract_attributes(rows: &[CharacteristicRow]) -> Vec<Attribute> {
    let mut attributes = Vec::new();
    let mut seen = HashSet::new();

    for row in rows {
        let name_lower = row.name.to_lowercase();

        if EXCLUDED_ATTRIBUTES.contains(&name_lower.as_str())
            || !row.has_value()
            || seen.contains(&name_lower)
        {
            continue;
        }

        // Section headers
        if row.bold_name || row.name.ends_with("характеристики") {
            continue;
        }

        tracing::debug!("Added attribute: {} = {}", row.name, row.value);
        attributes.push(Attribute {
            attr_name: row.name.clone(),
            attr_value: row.value.clone(),
        });
        seen.insert(name_lower);
    }

    tracing::info!("Extracted {} attributes", attributes.len());
    attributes
}

/// The store as sole supplier, with the page's price and stock as its offer
fn extract_supplier(document: &Html, url: &str) -> Supplier {
    let price = PriceInfo {
        qnt: 1,
        discount: 0.0,
        price: extract_price(document),
    };

    Supplier {
        supplier_offers: vec![SupplierOffer::new(
            vec![price],
            extract_stock(document),
            url.to_string(),
        )],
        ..Supplier::default()
    }
}

fn extract_price(document: &Html) -> f64 {
    let Some(price_text) = select_first(document, "span.ty-price")
        .and_then(|block| inner_text(&block, "span.ty-price-num"))
        .filter(|text| !text.is_empty())
    else {
        return 0.0;
    };

    parse_price(&price_text).unwrap_or_else(|| {
        tracing::warn!("Could not convert price to a number: {}", price_text);
        0.0
    })
}

/// Parses a displayed price such as `12 345,50 ₽`
fn parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    cleaned.parse::<f64>().ok()
}

fn extract_stock(document: &Html) -> String {
    or_no_data(
        select_first(document, "div.ty-control-group.product-list-field").and_then(|block| {
            inner_text(&block, "span.ty-qty-in-stock.ty-control-group__item")
        }),
    )
}

/// Rows of the first characteristics table with at least two cells
fn characteristic_rows(document: &Html) -> Vec<CharacteristicRow> {
    let (Ok(tbody), Ok(tr), Ok(td), Ok(bold)) = (
        Selector::parse("tbody"),
        Selector::parse("tr"),
        Selector::parse("td"),
        Selector::parse("b"),
    ) else {
        return Vec::new();
    };

    let Some(body) = select_all(document, "div.characteristicBox")
        .first()
        .and_then(|block| block.select(&tbody).next())
    else {
        return Vec::new();
    };

    body.select(&tr)
        .filter_map(|row| {
            let cells: Vec<ElementRef<'_>> = row.select(&td).collect();
            let (name_cell, value_cell) = (cells.first()?, cells.get(1)?);
            Some(CharacteristicRow {
                name: stripped_text(name_cell),
                value: stripped_text(value_cell),
                bold_name: name_cell.select(&bold).next().is_some(),
            })
        })
        .collect()
}

/// Value of the first informative row whose name satisfies `matches`
fn row_value(rows: &[CharacteristicRow], matches: impl Fn(&str) -> bool) -> Option<String> {
    rows.iter()
        .find(|row| matches(&row.name) && row.has_value())
        .map(|row| row.value.clone())
}
