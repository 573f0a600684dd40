//! Core library for catalog
//!
//! This crate implements the **Functional Core** of the catalog client,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`catalog_core`** (this crate): Pure transformation functions with zero I/O
//! - **`catalog`**: Fetch orchestration, HTTP transport and the command line shell
//!
//! Everything here is deterministic and tested with fixture data; nothing
//! touches the network or the clock.
//!
//! # Module Organization
//!
//! - [`product`]: Decoding raw product objects into [`product::ProductRecord`]s
//! - [`html`]: Plain-text extraction for HTML-encoded strings
//! - [`envelope`]: Parsing the paged response envelope
//! - [`sort`]: Sort keys and collection ordering
//! - [`pagination`]: Page arithmetic and request URLs
//! - [`retry`]: Failure policy for consumers of the catalog client
//!
//! # Example Usage
//!
//! ```rust
//! use catalog_core::envelope::{decode_page, parse_envelope};
//! use catalog_core::sort::{sort_records, SortKey};
//!
//! let body = br#"{"products":[{"productName":"Lamp","price":"$9.99"}],"totalProducts":1}"#;
//! let envelope = parse_envelope(body).unwrap();
//! let mut page = decode_page(&envelope.products, 0);
//! sort_records(&mut page.records, SortKey::PriceDesc);
//!
//! assert_eq!(page.records[0].price_value, Some(9.99));
//! assert_eq!(envelope.total_products, Some(1));
//! ```

pub mod envelope;
pub mod html;
pub mod pagination;
pub mod product;
pub mod retry;
pub mod sort;
