//! Catalog client
//!
//! The imperative shell around [`catalog_core`]: [`manager::CatalogManager`]
//! fetches pages over a [`transport::Transport`], accumulates decoded
//! products and reports changes to a [`observer::CatalogObserver`].
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use catalog::manager::CatalogManager;
//! use catalog::transport::HttpTransport;
//! use catalog_core::pagination::CatalogConfig;
//!
//! let (tx, mut events) = tokio::sync::mpsc::unbounded_channel();
//! let manager = CatalogManager::new(
//!     CatalogConfig::new(api_key),
//!     Arc::new(HttpTransport::new(Duration::from_secs(30))),
//!     Arc::new(tx),
//! );
//!
//! manager.load_first_page()?;
//! while let Some(event) = events.recv().await {
//!     // re-read manager.records() and decide what to load next
//! }
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod error;
pub mod manager;
pub mod observer;
pub mod transport;

pub use error::Error;

/// Lock a mutex, recovering the guard if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
