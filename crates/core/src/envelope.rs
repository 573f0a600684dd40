//! Response envelope parsing
//!
//! A catalog response is a JSON object holding one page of raw product
//! objects plus pagination metadata. Only a structurally broken payload is an
//! error here; individual products are decoded leniently by
//! [`crate::product::decode_product`].

use serde_json::{Map, Value};

use crate::product::{decode_product, ProductRecord};

/// Keys recognized on the response envelope
pub mod keys {
    pub const PRODUCTS: &str = "products";
    pub const TOTAL_PRODUCTS: &str = "totalProducts";
    pub const PAGE_SIZE: &str = "pageSize";
    pub const PAGE_NUMBER: &str = "pageNumber";
}

/// Error for payloads that do not have the envelope shape
///
/// Every variant displays the same fixed message; [`ProcessingError::detail`]
/// carries the specifics for logs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessingError {
    #[error("Data Processing Error")]
    InvalidJson(String),

    #[error("Data Processing Error")]
    NotAnObject,

    #[error("Data Processing Error")]
    MissingProducts,
}

impl ProcessingError {
    pub fn detail(&self) -> String {
        match self {
            ProcessingError::InvalidJson(msg) => format!("payload is not valid JSON: {msg}"),
            ProcessingError::NotAnObject => "payload is not a JSON object".to_string(),
            ProcessingError::MissingProducts => {
                format!("payload has no `{}` array", keys::PRODUCTS)
            }
        }
    }
}

/// Parsed response envelope
///
/// Pagination values are `None` when the server omitted them or sent
/// something other than a usable integer.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub products: Vec<Value>,
    pub total_products: Option<u64>,
    pub page_size: Option<u32>,
    pub page_number: Option<u32>,
}

/// One decoded page of products
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPage {
    pub records: Vec<ProductRecord>,
    /// Array elements that were not objects and were left out
    pub skipped: usize,
    /// First sequence id not used by this page
    pub next_sequence_id: u64,
}

/// Parse a raw response body into an [`Envelope`]
pub fn parse_envelope(body: &[u8]) -> Result<Envelope, ProcessingError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ProcessingError::InvalidJson(e.to_string()))?;

    let Value::Object(mut fields) = value else {
        return Err(ProcessingError::NotAnObject);
    };

    let products = match fields.remove(keys::PRODUCTS) {
        Some(Value::Array(products)) => products,
        _ => return Err(ProcessingError::MissingProducts),
    };

    Ok(Envelope {
        products,
        total_products: fields.get(keys::TOTAL_PRODUCTS).and_then(Value::as_u64),
        // A zero page size would stall paging, so it is treated as absent.
        page_size: u32_field(&fields, keys::PAGE_SIZE).filter(|size| *size > 0),
        page_number: u32_field(&fields, keys::PAGE_NUMBER),
    })
}

/// Decode the products of one page, numbering them from `first_sequence_id`
pub fn decode_page(products: &[Value], first_sequence_id: u64) -> DecodedPage {
    let mut next_sequence_id = first_sequence_id;
    let mut records = Vec::with_capacity(products.len());
    let mut skipped = 0;

    for raw in products {
        if !raw.is_object() {
            skipped += 1;
            continue;
        }
        records.push(decode_product(raw, next_sequence_id));
        next_sequence_id += 1;
    }

    DecodedPage {
        records,
        skipped,
        next_sequence_id,
    }
}

fn u32_field(fields: &Map<String, Value>, key: &str) -> Option<u32> {
    fields
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}
