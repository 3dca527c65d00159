pub mod browser;
pub mod mock;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::signal::SignalSlot;

/// Terminal record of one automation run. Produced exactly once per
/// [`Engine::execute`] call, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AutomationResult {
    pub fn completed(message: impl Into<String>, final_result: Option<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            final_result,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            final_result: None,
            error: Some(error.into()),
        }
    }
}

/// The automation boundary. Everything behind it (browser control, page
/// understanding, the LLM driving both) is someone else's problem.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Synchronous configuration check, run before anything is spawned.
    /// Missing credentials or a bad endpoint fail here, and only here.
    fn preflight(&self) -> Result<()> {
        Ok(())
    }

    /// Run `task` to completion. Once the underlying browser session is
    /// allocated, its live URL (if any) is written into `slot`: at most
    /// once, and not at all if session creation never gets that far.
    async fn execute(&self, task: &str, slot: Arc<SignalSlot>) -> Result<AutomationResult>;
}
