use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{AutomationResult, Engine};
use crate::signal::SignalSlot;

const API_KEY_ENV: &str = "BROWSER_AGENT_API_KEY";

/// An engine backed by a remote browser-agent gateway.
///
/// The gateway drives a real browser from a natural-language task and
/// exposes a live view of the session. Two calls: create a session (which
/// returns the live URL), then run the task in it and wait for the result.
pub struct BrowserEngine {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl BrowserEngine {
    /// Build an engine from a gateway base URL. The API key comes from
    /// `BROWSER_AGENT_API_KEY`; its absence is only an error at preflight
    /// so construction itself never fails.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: std::env::var(API_KEY_ENV).unwrap_or_default(),
            client: reqwest::Client::new(),
        }
    }

    async fn create_session(&self, task: &str) -> Result<Session> {
        let resp = self
            .client
            .post(format!("{}/v1/sessions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&CreateSessionRequest { task })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("browser gateway refused session ({}): {}", status, text);
        }

        Ok(resp.json().await?)
    }

    async fn run_session(&self, session_id: &str) -> Result<RunResponse> {
        // Long poll: the gateway answers when the run reaches a terminal state.
        let resp = self
            .client
            .post(format!("{}/v1/sessions/{}/run", self.base_url, session_id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("browser gateway run failed ({}): {}", status, text);
        }

        Ok(resp.json().await?)
    }
}

#[async_trait]
impl Engine for BrowserEngine {
    fn preflight(&self) -> Result<()> {
        if self.base_url.is_empty() {
            bail!("browser gateway URL is not configured");
        }
        if self.api_key.is_empty() {
            bail!("missing credentials: set {}", API_KEY_ENV);
        }
        Ok(())
    }

    async fn execute(&self, task: &str, slot: Arc<SignalSlot>) -> Result<AutomationResult> {
        let session = self.create_session(task).await?;
        tracing::info!(session_id = %session.id, "browser session created");

        if let Some(live_url) = &session.live_url {
            slot.write(live_url);
        }

        let run = self.run_session(&session.id).await?;

        Ok(if run.success {
            AutomationResult::completed(
                run.message.unwrap_or_else(|| "task completed".to_string()),
                run.final_result,
            )
        } else {
            AutomationResult::failed(
                run.message.unwrap_or_else(|| "task failed".to_string()),
                run.error.unwrap_or_else(|| "no error detail".to_string()),
            )
        })
    }
}

// --- API types ---

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    task: &'a str,
}

#[derive(Deserialize)]
struct Session {
    id: String,
    live_url: Option<String>,
}

#[derive(Deserialize)]
struct RunResponse {
    success: bool,
    message: Option<String>,
    final_result: Option<String>,
    error: Option<String>,
}
