//! Product record types
//!
//! Every text field has a non-empty fallback so that a missing value is
//! stored as [`NO_DATA`] rather than as a null.

use serde::{Deserialize, Serialize};

/// Placeholder for a value the page did not provide
pub const NO_DATA: &str = "Нет данных";

/// Default delivery estimate shown for every offer
pub const DEFAULT_DELIVERY_TIME: &str = "Доставка 1-2 дня";

/// Format of [`Product::created_at`]
pub const CREATED_AT_FORMAT: &str = "%d.%m.%Y %H:%M";

const SUPPLIER_NAME: &str = "Alecomp";
const SUPPLIER_TEL: &str = "+7 495 984-51-56";
const SUPPLIER_ADDRESS: &str = "г. Москва, ул. 2-ая Фрезерная, 14 стр.1Б";
const SUPPLIER_DESCRIPTION: &str = "Компьютерный центр Алекомп занимается продажей компьютеров и оргтехники с 2006 года. Нашими покупателями стали сотни компаний из различных секторов экономики. Корпоративные клиенты предъявляют особые требования к надежности поставщиков, поэтому поставщик компьютерной техники Алекомп уделяет особое внимание удобству работы и надежности поставок. В нашем компьютерном магазине собраны все актуальные товары для надежной работы офиса. Мы гарантируем быструю доставку купленного у нас компьютерного оборудования!";

fn no_data() -> String {
    NO_DATA.to_string()
}

fn default_qnt() -> u32 {
    1
}

fn default_delivery_time() -> String {
    DEFAULT_DELIVERY_TIME.to_string()
}

fn now_created_at() -> String {
    chrono::Local::now().format(CREATED_AT_FORMAT).to_string()
}

/// Price for a given quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceInfo {
    #[serde(default = "default_qnt")]
    pub qnt: u32,
    pub discount: f64,
    pub price: f64,
}

/// One purchasable offer from a supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierOffer {
    pub price: Vec<PriceInfo>,
    #[serde(default = "no_data")]
    pub stock: String,
    #[serde(default = "default_delivery_time")]
    pub delivery_time: String,
    #[serde(default = "no_data")]
    pub package_info: String,
    pub purchase_url: String,
}

impl SupplierOffer {
    /// Single-price offer with default delivery and packaging info
    pub fn new(price: Vec<PriceInfo>, stock: String, purchase_url: String) -> Self {
        Self {
            price,
            stock,
            delivery_time: default_delivery_time(),
            package_info: no_data(),
            purchase_url,
        }
    }
}

/// Supplier identity and its offers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(default = "no_data")]
    pub dealer_id: String,
    pub supplier_name: String,
    pub supplier_tel: String,
    pub supplier_address: String,
    pub supplier_description: String,
    #[serde(default)]
    pub supplier_offers: Vec<SupplierOffer>,
}

impl Default for Supplier {
    /// The store being harvested; every product is sold by it
    fn default() -> Self {
        Self {
            dealer_id: no_data(),
            supplier_name: SUPPLIER_NAME.to_string(),
            supplier_tel: SUPPLIER_TEL.to_string(),
            supplier_address: SUPPLIER_ADDRESS.to_string(),
            supplier_description: SUPPLIER_DESCRIPTION.to_string(),
            supplier_offers: Vec::new(),
        }
    }
}

/// Name/value characteristic of a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub attr_name: String,
    pub attr_value: String,
}

/// A harvested product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    #[serde(default = "no_data")]
    pub description: String,
    pub article: String,
    pub brand: String,
    #[serde(default = "no_data")]
    pub country_of_origin: String,
    #[serde(default = "no_data")]
    pub warranty_months: String,
    #[serde(default = "no_data")]
    pub category: String,
    #[serde(default = "now_created_at")]
    pub created_at: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
}

impl Product {
    /// Product with the required fields set and every other field defaulted
    pub fn new(title: String, article: String, brand: String) -> Self {
        Self {
            title,
            description: no_data(),
            article,
            brand,
            country_of_origin: no_data(),
            warranty_months: no_data(),
            category: no_data(),
            created_at: now_created_at(),
            attributes: Vec::new(),
            suppliers: Vec::new(),
        }
    }

    /// Price of the first offer of the first supplier, if any
    pub fn primary_price(&self) -> Option<f64> {
        self.suppliers
            .first()
            .and_then(|s| s.supplier_offers.first())
            .and_then(|o| o.price.first())
            .map(|p| p.price)
    }
}
