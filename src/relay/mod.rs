//! Best-effort notification of a remote front-end peer.
//!
//! The relay is an out-of-band channel: whether anyone hears about the live
//! URL never changes the outcome of the demo itself. Every failure mode here
//! (no peer connected, transport timeout, transport error) is logged and
//! swallowed.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::consts::DEFAULT_RELAY_TIMEOUT;

/// A request/response channel to a connected remote peer.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Identity of the single connected peer, if any.
    async fn resolve_peer(&self) -> Option<String>;

    /// Invoke `method` on `destination` with a JSON payload, waiting at most
    /// `timeout` for the peer's response.
    async fn call(
        &self,
        destination: &str,
        method: &str,
        payload: serde_json::Value,
        timeout: Duration,
    ) -> Result<String>;
}

/// A transport with nobody on the other end. Stands in when no signaling
/// bridge is configured; every delivery is skipped.
pub struct NullTransport;

#[async_trait]
impl Transport for NullTransport {
    async fn resolve_peer(&self) -> Option<String> {
        None
    }

    async fn call(
        &self,
        _destination: &str,
        _method: &str,
        _payload: serde_json::Value,
        _timeout: Duration,
    ) -> Result<String> {
        Ok(String::new())
    }
}

/// Delivers notifications over a [`Transport`], absorbing every failure.
pub struct Relay {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl Relay {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            timeout: DEFAULT_RELAY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send `payload` to the connected peer. Returns normally no matter
    /// what happens: no peer resolvable skips the delivery, and transport
    /// errors or timeouts are logged, never raised.
    pub async fn deliver(&self, method: &str, payload: serde_json::Value) {
        let Some(destination) = self.transport.resolve_peer().await else {
            tracing::info!(method, "no remote peer connected, skipping delivery");
            return;
        };

        match self
            .transport
            .call(&destination, method, payload, self.timeout)
            .await
        {
            Ok(_) => tracing::info!(method, destination = %destination, "delivered"),
            Err(e) => {
                tracing::warn!(method, destination = %destination, error = %e, "delivery failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NoPeerTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for NoPeerTransport {
        async fn resolve_peer(&self) -> Option<String> {
            None
        }

        async fn call(
            &self,
            _destination: &str,
            _method: &str,
            _payload: serde_json::Value,
            _timeout: Duration,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(String::new())
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn resolve_peer(&self) -> Option<String> {
            Some("viewer".to_string())
        }

        async fn call(
            &self,
            _destination: &str,
            _method: &str,
            _payload: serde_json::Value,
            _timeout: Duration,
        ) -> Result<String> {
            anyhow::bail!("connection reset")
        }
    }

    #[tokio::test]
    async fn no_peer_skips_the_call() {
        let transport = Arc::new(NoPeerTransport {
            calls: AtomicUsize::new(0),
        });
        let relay = Relay::new(transport.clone());

        relay
            .deliver("presentDemoToUser", serde_json::json!({"liveUrl": "x"}))
            .await;

        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transport_error_does_not_escape() {
        let relay = Relay::new(Arc::new(FailingTransport));
        relay
            .deliver("presentDemoToUser", serde_json::json!({"liveUrl": "x"}))
            .await;
    }
}
