//! HTTP transport for catalog requests

use std::sync::Mutex;
use std::time::Duration;

use futures::future::BoxFuture;
use log::debug;

use crate::lock;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("{0}")]
    Request(String),

    #[error("The catalog server responded with HTTP {0}")]
    Status(u16),
}

/// Fetches raw response bodies for the catalog manager
///
/// Implementations own their session. `invalidate` tears it down; the next
/// `get` builds a fresh one.
pub trait Transport: Send + Sync {
    fn get(&self, url: String) -> BoxFuture<'static, Result<Vec<u8>, TransportError>>;

    fn invalidate(&self);
}

/// [`Transport`] backed by a lazily created `reqwest::Client`
pub struct HttpTransport {
    timeout: Duration,
    session: Mutex<Option<reqwest::Client>>,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            session: Mutex::new(None),
        }
    }

    fn session(&self) -> Result<reqwest::Client, TransportError> {
        let mut session = lock(&self.session);

        if let Some(client) = session.as_ref() {
            return Ok(client.clone());
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to build HTTP client: {e}")))?;

        debug!("created catalog HTTP session (timeout {:?})", self.timeout);
        *session = Some(client.clone());

        Ok(client)
    }

    #[cfg(test)]
    fn has_session(&self) -> bool {
        lock(&self.session).is_some()
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: String) -> BoxFuture<'static, Result<Vec<u8>, TransportError>> {
        let session = self.session();

        Box::pin(async move {
            let client = session?;

            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|e| TransportError::Request(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::Status(status.as_u16()));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::Request(e.to_string()))?;

            Ok(body.to_vec())
        })
    }

    fn invalidate(&self) {
        if lock(&self.session).take().is_some() {
            debug!("invalidated catalog HTTP session");
        }
    }
}
