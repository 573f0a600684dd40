//! Page arithmetic and request construction
//!
//! Pure functions for deciding which page to request next and how to address
//! it on the catalog API. The catalog is paged by page number and page size;
//! the last page is requested with a reduced size so the client never asks
//! for more products than the server reported.

use serde::{Deserialize, Serialize};

/// Production endpoint of the catalog API
pub const DEFAULT_BASE_URL: &str = "https://walmartlabs-test.appspot.com/_ah/api/walmart/v1";

/// Products requested per page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Catalog API location and paging defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: String,
    pub page_size: u32,
}

impl CatalogConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Build the URL for one catalog page
///
/// `GET {base}/walmartproducts/{api_key}/{page_number}/{page_size}`. The API
/// key is a path segment and is percent-encoded.
pub fn request_url(config: &CatalogConfig, page_number: u32, page_size: u32) -> String {
    format!(
        "{}/walmartproducts/{}/{page_number}/{page_size}",
        config.base_url.trim_end_matches('/'),
        urlencoding::encode(&config.api_key)
    )
}

/// Whether more products remain to be loaded
///
/// False until the server has reported a total.
pub fn has_more(record_count: usize, total_count: Option<u64>) -> bool {
    total_count.is_some_and(|total| (record_count as u64) < total)
}

/// Compute the `(page_number, page_size)` of the page after the current one
///
/// The size shrinks to the number of products left when fewer than a full
/// page remain, and never drops below one.
pub fn next_page(page_number: u32, page_size: u32, total_count: u64) -> (u32, u32) {
    let page_size = page_size.max(1);
    let consumed = u64::from(page_number) * u64::from(page_size);
    let remaining = total_count.saturating_sub(consumed);

    let next_size = u32::try_from(remaining).map_or(page_size, |left| left.clamp(1, page_size));

    (page_number.saturating_add(1), next_size)
}
