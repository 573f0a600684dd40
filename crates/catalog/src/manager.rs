//! Catalog manager: paged fetching, accumulation and sorting
//!
//! [`CatalogManager`] owns the accumulated records and the paging counters.
//! Each load runs on its own Tokio task. All state lives behind a single
//! mutex that is never held across an `.await` or while the observer runs,
//! and at most one request is outstanding at a time: a load issued while
//! another is in flight is rejected with [`Error::Busy`].

use std::sync::{Arc, Mutex, MutexGuard};

use catalog_core::envelope::{decode_page, parse_envelope, Envelope};
use catalog_core::pagination::{has_more, next_page, request_url, CatalogConfig};
use catalog_core::product::ProductRecord;
use catalog_core::sort::{sort_records, SortKey};
use log::{debug, info, warn};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinHandle};

use crate::error::Error;
use crate::lock;
use crate::observer::{inline_dispatcher, CatalogObserver, Dispatcher, Notification};
use crate::transport::{Transport, TransportError};

/// Point-in-time copy of the manager state
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSnapshot {
    pub records: Vec<ProductRecord>,
    pub total_count: Option<u64>,
    pub page_number: u32,
    pub page_size: u32,
    pub sort_key: SortKey,
    pub retry_count: u32,
    pub loading: bool,
}

#[derive(Clone)]
pub struct CatalogManager {
    inner: Arc<Inner>,
}

struct Inner {
    config: CatalogConfig,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn CatalogObserver>,
    dispatcher: Dispatcher,
    state: Mutex<CatalogState>,
}

struct CatalogState {
    records: Vec<ProductRecord>,
    page_number: u32,
    page_size: u32,
    total_count: Option<u64>,
    next_sequence_id: u64,
    sort_key: SortKey,
    retry_count: u32,
    /// Bumped by `cancel`; completions from an older generation are dropped
    generation: u64,
    next_request_id: u64,
    in_flight: Option<InFlight>,
}

struct InFlight {
    request_id: u64,
    abort: AbortHandle,
}

impl CatalogManager {
    /// Create a manager that notifies `observer` directly on the fetch task
    pub fn new(
        config: CatalogConfig,
        transport: Arc<dyn Transport>,
        observer: Arc<dyn CatalogObserver>,
    ) -> Self {
        Self::with_dispatcher(config, transport, observer, inline_dispatcher())
    }

    /// Create a manager whose notifications are handed to `dispatcher`
    pub fn with_dispatcher(
        config: CatalogConfig,
        transport: Arc<dyn Transport>,
        observer: Arc<dyn CatalogObserver>,
        dispatcher: Dispatcher,
    ) -> Self {
        let state = CatalogState {
            records: Vec::new(),
            page_number: 1,
            page_size: config.page_size.max(1),
            total_count: None,
            next_sequence_id: 0,
            sort_key: SortKey::Default,
            retry_count: 0,
            generation: 0,
            next_request_id: 0,
            in_flight: None,
        };

        Self {
            inner: Arc::new(Inner {
                config,
                transport,
                observer,
                dispatcher,
                state: Mutex::new(state),
            }),
        }
    }

    /// Fetch the page at the current page number and size
    ///
    /// Nothing is reset; after a failed load this re-requests the same page.
    /// Fails with [`Error::NoRuntime`] outside a Tokio runtime. The returned
    /// handle completes once the response has been applied and the observer
    /// told.
    pub fn load_first_page(&self) -> Result<JoinHandle<()>, Error> {
        let runtime = current_runtime()?;
        let mut state = self.inner.state();
        self.start_fetch(&runtime, &mut state)
    }

    /// Advance to the next page and fetch it
    ///
    /// Fails with [`Error::NoMorePages`] unless [`CatalogManager::has_more`].
    pub fn load_next_page(&self) -> Result<JoinHandle<()>, Error> {
        let runtime = current_runtime()?;
        let mut state = self.inner.state();

        if state.in_flight.is_some() {
            return Err(Error::Busy);
        }

        let total = match state.total_count {
            Some(total) if has_more(state.records.len(), Some(total)) => total,
            _ => return Err(Error::NoMorePages),
        };

        let (page_number, page_size) = next_page(state.page_number, state.page_size, total);
        state.page_number = page_number;
        state.page_size = page_size;

        self.start_fetch(&runtime, &mut state)
    }

    pub fn has_more(&self) -> bool {
        let state = self.inner.state();
        has_more(state.records.len(), state.total_count)
    }

    /// Re-order every loaded record by `key`
    ///
    /// Pages loaded afterwards are sorted on their own before being appended;
    /// the whole collection is not re-sorted when they arrive.
    pub fn apply_sort(&self, key: SortKey) {
        {
            let mut state = self.inner.state();
            state.sort_key = key;
            sort_records(&mut state.records, key);
        }

        debug!("sorted catalog by {key}");
        self.inner.notify(Notification::Updated);
    }

    /// Abort the in-flight request and invalidate the transport session
    ///
    /// A completion that was already racing the cancel is discarded.
    pub fn cancel(&self) {
        {
            let mut state = self.inner.state();
            state.generation += 1;

            if let Some(in_flight) = state.in_flight.take() {
                in_flight.abort.abort();
                info!("cancelled catalog request {}", in_flight.request_id);
            }
        }

        self.inner.transport.invalidate();
    }

    pub fn records(&self) -> Vec<ProductRecord> {
        self.inner.state().records.clone()
    }

    pub fn record_count(&self) -> usize {
        self.inner.state().records.len()
    }

    pub fn total_count(&self) -> Option<u64> {
        self.inner.state().total_count
    }

    pub fn page_number(&self) -> u32 {
        self.inner.state().page_number
    }

    pub fn page_size(&self) -> u32 {
        self.inner.state().page_size
    }

    pub fn sort_key(&self) -> SortKey {
        self.inner.state().sort_key
    }

    /// Consecutive failed loads since the last success
    pub fn retry_count(&self) -> u32 {
        self.inner.state().retry_count
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state().in_flight.is_some()
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        let state = self.inner.state();
        CatalogSnapshot {
            records: state.records.clone(),
            total_count: state.total_count,
            page_number: state.page_number,
            page_size: state.page_size,
            sort_key: state.sort_key,
            retry_count: state.retry_count,
            loading: state.in_flight.is_some(),
        }
    }

    fn start_fetch(
        &self,
        runtime: &Handle,
        state: &mut CatalogState,
    ) -> Result<JoinHandle<()>, Error> {
        if state.in_flight.is_some() {
            return Err(Error::Busy);
        }

        let request_id = state.next_request_id;
        state.next_request_id += 1;
        let generation = state.generation;

        let url = request_url(&self.inner.config, state.page_number, state.page_size);
        debug!(
            "catalog request {request_id}: page {} size {}",
            state.page_number, state.page_size
        );

        let request = self.inner.transport.get(url);
        let inner = Arc::clone(&self.inner);
        let handle = runtime.spawn(async move {
            let outcome = request.await;
            inner.complete(generation, request_id, outcome);
        });

        state.in_flight = Some(InFlight {
            request_id,
            abort: handle.abort_handle(),
        });

        Ok(handle)
    }
}

fn current_runtime() -> Result<Handle, Error> {
    Handle::try_current().map_err(|_| Error::NoRuntime)
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, CatalogState> {
        lock(&self.state)
    }

    fn complete(
        &self,
        generation: u64,
        request_id: u64,
        outcome: Result<Vec<u8>, TransportError>,
    ) {
        let notification = {
            let mut state = self.state();

            let current = state
                .in_flight
                .as_ref()
                .is_some_and(|in_flight| in_flight.request_id == request_id);
            if state.generation != generation || !current {
                debug!("dropping stale completion for catalog request {request_id}");
                return;
            }
            state.in_flight = None;

            let envelope = outcome
                .map_err(Error::from)
                .and_then(|body| parse_envelope(&body).map_err(Error::from));

            match envelope {
                Ok(envelope) => {
                    state.apply_page(envelope);
                    Notification::Updated
                }
                Err(err) => {
                    state.retry_count = state.retry_count.saturating_add(1);
                    match &err {
                        Error::Processing(processing) => warn!(
                            "catalog request {request_id} returned an unusable payload: {}",
                            processing.detail()
                        ),
                        other => warn!("catalog request {request_id} failed: {other}"),
                    }
                    Notification::Failed(err.to_string())
                }
            }
        };

        self.notify(notification);
    }

    fn notify(&self, notification: Notification) {
        let observer = Arc::clone(&self.observer);
        (self.dispatcher)(Box::new(move || notification.deliver(observer.as_ref())));
    }
}

impl CatalogState {
    fn apply_page(&mut self, envelope: Envelope) {
        let page = decode_page(&envelope.products, self.next_sequence_id);
        if page.skipped > 0 {
            warn!("skipped {} catalog entries that were not objects", page.skipped);
        }

        self.next_sequence_id = page.next_sequence_id;

        let mut batch = page.records;
        if self.sort_key != SortKey::Default {
            sort_records(&mut batch, self.sort_key);
        }
        debug!("appending {} catalog records", batch.len());
        self.records.append(&mut batch);

        if let Some(total) = envelope.total_products {
            self.total_count = Some(total);
        }
        if let Some(page_size) = envelope.page_size {
            self.page_size = page_size;
        }
        if let Some(page_number) = envelope.page_number {
            self.page_number = page_number;
        }

        self.retry_count = 0;
    }
}
