//! Notification contract between the catalog manager and its consumer

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

/// Receives catalog changes
///
/// After `on_updated` the observer re-reads whatever manager state it
/// displays. `on_failed` carries a human-readable message.
pub trait CatalogObserver: Send + Sync {
    fn on_updated(&self);

    fn on_failed(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Updated,
    Failed(String),
}

impl Notification {
    pub fn deliver(&self, observer: &dyn CatalogObserver) {
        match self {
            Notification::Updated => observer.on_updated(),
            Notification::Failed(message) => observer.on_failed(message),
        }
    }
}

/// Runs a notification job on the context the consumer chooses
pub type Dispatcher = Arc<dyn Fn(Box<dyn FnOnce() + Send>) + Send + Sync>;

/// Dispatcher that runs every job immediately on the calling task
pub fn inline_dispatcher() -> Dispatcher {
    Arc::new(|job: Box<dyn FnOnce() + Send>| job())
}

/// Forwards notifications into a channel, for consumers that run an event loop
impl CatalogObserver for UnboundedSender<Notification> {
    fn on_updated(&self) {
        let _ = self.send(Notification::Updated);
    }

    fn on_failed(&self, message: &str) {
        let _ = self.send(Notification::Failed(message.to_string()));
    }
}
