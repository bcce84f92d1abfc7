//! Product pages
//!
//! This module holds the harvested product records and the parser that
//! fills them from a product page.

mod parser;
mod schema;

pub use parser::{parse_product_html, ProductParser};
pub use schema::{
    Attribute, PriceInfo, Product, Supplier, SupplierOffer, CREATED_AT_FORMAT,
    DEFAULT_DELIVERY_TIME, NO_DATA,
};
