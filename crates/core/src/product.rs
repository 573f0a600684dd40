//! Transformation functions for catalog product objects
//!
//! The catalog API returns loosely-typed product objects. [`decode_product`]
//! turns one of them into a display-ready [`ProductRecord`] without ever
//! failing: any field that is missing or has the wrong JSON type takes its
//! documented default and the remaining fields are still decoded.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::html::decode_html_text;

/// Price text used when the product has no usable `price`
pub const NO_PRICE_LISTED: &str = "No Price Listed";

/// Stock text for products that are in stock
pub const IN_STOCK: &str = "In Stock";

/// Stock text for products that are not in stock
pub const BACKORDERED: &str = "Backordered";

/// Keys recognized on a raw product object
pub mod keys {
    pub const PRODUCT_ID: &str = "productId";
    pub const PRODUCT_NAME: &str = "productName";
    pub const SHORT_DESCRIPTION: &str = "shortDescription";
    pub const LONG_DESCRIPTION: &str = "longDescription";
    pub const PRICE: &str = "price";
    pub const PRODUCT_IMAGE: &str = "productImage";
    pub const REVIEW_RATING: &str = "reviewRating";
    pub const REVIEW_COUNT: &str = "reviewCount";
    pub const IN_STOCK: &str = "inStock";
}

/// A decoded catalog product
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ProductRecord {
    /// Position in load order, assigned by the client rather than the API
    pub sequence_id: u64,
    pub external_id: Option<String>,
    pub name: String,
    pub short_description: String,
    pub long_description: String,
    pub price_display: String,
    pub price_value: Option<f64>,
    pub image_url: Option<String>,
    pub rating: f64,
    pub rating_display: String,
    pub review_count: u64,
    pub in_stock: bool,
    pub stock_display: String,
}

/// Decode one raw product object
///
/// A `raw` value that is not a JSON object produces a record where every
/// field holds its default.
pub fn decode_product(raw: &Value, sequence_id: u64) -> ProductRecord {
    let empty = Map::new();
    let fields = raw.as_object().unwrap_or(&empty);

    let price_display = string_field(fields, keys::PRICE)
        .map(str::to_string)
        .unwrap_or_else(|| NO_PRICE_LISTED.to_string());
    let price_value = parse_price(&price_display);

    let rating = fields
        .get(keys::REVIEW_RATING)
        .and_then(Value::as_f64)
        .map(round_rating)
        .unwrap_or(0.0);

    let in_stock = fields
        .get(keys::IN_STOCK)
        .and_then(Value::as_bool)
        .unwrap_or(false);

    ProductRecord {
        sequence_id,
        external_id: string_field(fields, keys::PRODUCT_ID).map(str::to_string),
        name: display_text(fields, keys::PRODUCT_NAME),
        short_description: display_text(fields, keys::SHORT_DESCRIPTION),
        long_description: display_text(fields, keys::LONG_DESCRIPTION),
        price_value,
        price_display,
        image_url: string_field(fields, keys::PRODUCT_IMAGE).map(str::to_string),
        rating,
        rating_display: format_rating(rating),
        review_count: fields
            .get(keys::REVIEW_COUNT)
            .and_then(Value::as_u64)
            .unwrap_or(0),
        in_stock,
        stock_display: format_stock(in_stock).to_string(),
    }
}

/// Parse the numeric value out of a currency-formatted price
///
/// All `$` and `,` characters are removed before parsing, so `"$1,234.50"`
/// becomes `1234.5`. Returns `None` for anything that is not a finite number.
pub fn parse_price(display: &str) -> Option<f64> {
    let digits: String = display.chars().filter(|c| !matches!(c, '$' | ',')).collect();
    digits.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Round a review rating to two decimal places, halves away from zero
pub fn round_rating(raw: f64) -> f64 {
    (raw * 100.0).round() / 100.0
}

/// Format a rating as `"{rating} of 5.0"`, always printing a decimal part
pub fn format_rating(rating: f64) -> String {
    format!("{rating:?} of 5.0")
}

pub fn format_stock(in_stock: bool) -> &'static str {
    if in_stock {
        IN_STOCK
    } else {
        BACKORDERED
    }
}

fn string_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

fn display_text(fields: &Map<String, Value>, key: &str) -> String {
    string_field(fields, key)
        .map(decode_html_text)
        .unwrap_or_default()
}
