//! Drives a [`CatalogManager`] the way an interactive product list does
//!
//! The session owns the observer side of the manager: it waits for
//! notifications, asks for the next page while the caller wants more, and
//! applies the retry and alert policy from [`catalog_core::retry`].

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use catalog::manager::CatalogManager;
use catalog::observer::Notification;
use catalog::transport::{HttpTransport, Transport};
use catalog_core::pagination::CatalogConfig;
use catalog_core::retry::{alert_message, FailureAction, FailurePolicy, FailureTracker};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::prelude::*;

pub struct Session {
    manager: CatalogManager,
    events: UnboundedReceiver<Notification>,
    failures: FailureTracker,
    spinner: ProgressBar,
}

impl Session {
    pub fn new(config: CatalogConfig, timeout: Duration) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new(timeout)))
    }

    pub fn with_transport(config: CatalogConfig, transport: Arc<dyn Transport>) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let manager = CatalogManager::new(config, transport, Arc::new(tx));

        Self {
            manager,
            events,
            failures: FailureTracker::new(FailurePolicy::default()),
            spinner: new_spinner(),
        }
    }

    pub fn manager(&self) -> &CatalogManager {
        &self.manager
    }

    /// Load pages until `done` is satisfied or the catalog runs out
    ///
    /// `done` is checked after every successful page. Failures are retried on
    /// the same page; once retries are exhausted the alert text is returned
    /// as the error. Ctrl-C cancels the in-flight request.
    pub async fn load_until<F>(&mut self, mut done: F) -> Result<()>
    where
        F: FnMut(&CatalogManager) -> bool,
    {
        self.spinner.set_message("Loading products...");
        self.manager.load_first_page()?;
        let mut loaded = 0;

        loop {
            let event = tokio::select! {
                event = self.events.recv() => event,
                _ = tokio::signal::ctrl_c() => {
                    self.manager.cancel();
                    self.spinner.finish_and_clear();
                    return Err(eyre!("Interrupted"));
                }
            };

            let Some(event) = event else {
                self.spinner.finish_and_clear();
                return Err(eyre!("Catalog notifications stopped unexpectedly"));
            };

            match event {
                Notification::Updated => {
                    self.failures.record_success();

                    let count = self.manager.record_count();
                    self.spinner.set_message(format!("Top {count} Results"));

                    // A page that adds nothing would be requested again forever
                    let stalled = count == loaded;
                    loaded = count;

                    if stalled || done(&self.manager) {
                        break;
                    }

                    match self.manager.load_next_page() {
                        Ok(_) => {}
                        Err(Error::NoMorePages) => break,
                        Err(err) => {
                            self.spinner.finish_and_clear();
                            return Err(err.into());
                        }
                    }
                }
                Notification::Failed(message) => match self.failures.record_failure() {
                    FailureAction::Retry { attempt } => {
                        warn!(
                            "retrying catalog page {} (attempt {attempt}): {message}",
                            self.manager.page_number()
                        );
                        self.manager.load_first_page()?;
                    }
                    FailureAction::Alert => {
                        self.spinner.finish_and_clear();
                        return Err(eyre!(alert_message(&message)));
                    }
                },
            }
        }

        self.spinner.finish_and_clear();
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.manager.is_loading() {
            self.manager.cancel();
        }
    }
}

fn new_spinner() -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));

    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use catalog::transport::TransportError;
    use futures::future::BoxFuture;
    use serde_json::json;

    type Reply = Result<Vec<u8>, TransportError>;

    /// Transport double that answers requests in order from a fixed list
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Reply>>,
        urls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                urls: Mutex::new(Vec::new()),
            })
        }

        fn urls(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn get(&self, url: String) -> BoxFuture<'static, Reply> {
            self.urls.lock().unwrap().push(url);
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Request("no scripted reply".to_string())));

            Box::pin(async move { reply })
        }

        fn invalidate(&self) {}
    }

    fn page(first: usize, count: usize, total: u64) -> Reply {
        let products: Vec<_> = (first..first + count)
            .map(|n| json!({"productName": format!("Product {n}")}))
            .collect();

        Ok(serde_json::to_vec(&json!({"products": products, "totalProducts": total})).unwrap())
    }

    fn failure(message: &str) -> Reply {
        Err(TransportError::Request(message.to_string()))
    }

    fn session(transport: &Arc<ScriptedTransport>) -> Session {
        let config = CatalogConfig::new("key")
            .with_base_url("http://catalog.test/v1")
            .with_page_size(2);

        Session::with_transport(config, transport.clone())
    }

    #[tokio::test]
    async fn test_failures_within_retry_budget_recover() {
        let transport = ScriptedTransport::new(vec![
            failure("timed out"),
            failure("timed out"),
            page(0, 2, 2),
        ]);
        let mut session = session(&transport);

        session.load_until(|_| false).await.unwrap();

        assert_eq!(session.manager().record_count(), 2);
        let urls = transport.urls();
        assert_eq!(urls.len(), 3);
        assert!(urls
            .iter()
            .all(|url| url == "http://catalog.test/v1/walmartproducts/key/1/2"));
    }

    #[tokio::test]
    async fn test_exhausted_retries_return_alert() {
        let transport = ScriptedTransport::new(vec![
            failure("connection refused"),
            failure("connection refused"),
            failure("connection refused"),
        ]);
        let mut session = session(&transport);

        let err = session.load_until(|_| false).await.unwrap_err();

        assert_eq!(err.to_string(), alert_message("connection refused"));
        let urls = transport.urls();
        assert_eq!(urls.len(), 3);
        assert!(urls.iter().all(|url| url == &urls[0]));
        assert!(session.manager().records().is_empty());
    }

    #[tokio::test]
    async fn test_failed_next_page_is_retried_on_same_page() {
        let transport = ScriptedTransport::new(vec![
            page(0, 2, 4),
            failure("reset by peer"),
            page(2, 2, 4),
        ]);
        let mut session = session(&transport);

        session.load_until(|_| false).await.unwrap();

        let urls = transport.urls();
        assert_eq!(urls.len(), 3);
        assert_eq!(urls[1], urls[2]);
        assert!(urls[2].ends_with("/2/2"));
        assert_eq!(session.manager().record_count(), 4);
    }

    #[tokio::test]
    async fn test_retry_budget_resets_after_each_page() {
        let transport = ScriptedTransport::new(vec![
            failure("timed out"),
            failure("timed out"),
            page(0, 2, 4),
            failure("timed out"),
            failure("timed out"),
            page(2, 2, 4),
        ]);
        let mut session = session(&transport);

        session.load_until(|_| false).await.unwrap();

        assert_eq!(session.manager().record_count(), 4);
        assert_eq!(transport.urls().len(), 6);
    }

    #[tokio::test]
    async fn test_empty_page_ends_loading() {
        let transport = ScriptedTransport::new(vec![page(0, 2, 10), page(2, 0, 10)]);
        let mut session = session(&transport);

        session.load_until(|_| false).await.unwrap();

        assert_eq!(transport.urls().len(), 2);
        assert_eq!(session.manager().record_count(), 2);
        assert!(session.manager().has_more());
    }

    #[tokio::test]
    async fn test_stops_when_every_page_is_loaded() {
        let transport = ScriptedTransport::new(vec![page(0, 2, 4), page(2, 2, 4)]);
        let mut session = session(&transport);

        session.load_until(|_| false).await.unwrap();

        assert_eq!(transport.urls().len(), 2);
        assert_eq!(session.manager().record_count(), 4);
        assert!(!session.manager().has_more());
    }

    #[tokio::test]
    async fn test_stops_once_caller_is_satisfied() {
        let transport = ScriptedTransport::new(vec![page(0, 2, 6), page(2, 2, 6), page(4, 2, 6)]);
        let mut session = session(&transport);

        session
            .load_until(|manager| manager.record_count() >= 4)
            .await
            .unwrap();

        assert_eq!(transport.urls().len(), 2);
        assert_eq!(session.manager().record_count(), 4);
    }
}
