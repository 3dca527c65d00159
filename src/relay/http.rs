use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Transport;

/// Transport over an HTTP signaling bridge.
///
/// The bridge fronts the real-time session the user is connected to: it
/// knows which participants are present and can forward an RPC to one of
/// them, returning the participant's response.
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn resolve_peer(&self) -> Option<String> {
        let resp = self
            .client
            .get(format!("{}/participants", self.base_url))
            .send()
            .await
            .ok()?;
        let participants: Participants = resp.json().await.ok()?;
        // The demo session has at most one viewer; take the first.
        participants.identities.into_iter().next()
    }

    async fn call(
        &self,
        destination: &str,
        method: &str,
        payload: serde_json::Value,
        timeout: Duration,
    ) -> Result<String> {
        let envelope = RpcEnvelope {
            destination_identity: destination,
            method,
            payload,
        };

        // The timeout covers the whole exchange; a peer that returns headers
        // but stalls the body must not hold the caller open.
        let exchange = async {
            let resp = self
                .client
                .post(format!("{}/rpc", self.base_url))
                .json(&envelope)
                .send()
                .await?;

            if !resp.status().is_success() {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                bail!("rpc to {} failed ({}): {}", destination, status, text);
            }

            Ok(resp.text().await?)
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => bail!("rpc to {} timed out after {:?}", destination, timeout),
        }
    }
}

// --- Bridge types ---

#[derive(Deserialize)]
struct Participants {
    identities: Vec<String>,
}

#[derive(Serialize)]
struct RpcEnvelope<'a> {
    destination_identity: &'a str,
    method: &'a str,
    payload: serde_json::Value,
}
