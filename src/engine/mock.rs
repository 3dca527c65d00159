use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{AutomationResult, Engine};
use crate::signal::SignalSlot;

/// A scripted engine for tests. Writes an optional live URL after a delay,
/// then returns a canned result after a configurable run time.
pub struct MockEngine {
    live_url: Option<String>,
    url_delay: Duration,
    run_duration: Duration,
    result: AutomationResult,
    preflight_error: Option<String>,
    executions: AtomicUsize,
    last_task: Mutex<Option<String>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            live_url: None,
            url_delay: Duration::ZERO,
            run_duration: Duration::ZERO,
            result: AutomationResult::completed("task completed", None),
            preflight_error: None,
            executions: AtomicUsize::new(0),
            last_task: Mutex::new(None),
        }
    }

    /// Publish `url` to the run's slot after `delay`.
    pub fn with_live_url(mut self, url: &str, delay: Duration) -> Self {
        self.live_url = Some(url.to_string());
        self.url_delay = delay;
        self
    }

    /// Keep running for `duration` after the URL is published.
    pub fn with_run_duration(mut self, duration: Duration) -> Self {
        self.run_duration = duration;
        self
    }

    pub fn with_result(mut self, result: AutomationResult) -> Self {
        self.result = result;
        self
    }

    /// Fail preflight with `message`, simulating engine misconfiguration.
    pub fn with_preflight_error(mut self, message: &str) -> Self {
        self.preflight_error = Some(message.to_string());
        self
    }

    /// How many times `execute` has been entered.
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }

    /// The task string from the most recent `execute` call.
    pub fn last_task(&self) -> Option<String> {
        self.last_task.lock().unwrap().clone()
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Engine for MockEngine {
    fn preflight(&self) -> Result<()> {
        if let Some(message) = &self.preflight_error {
            bail!("{}", message);
        }
        Ok(())
    }

    async fn execute(&self, task: &str, slot: Arc<SignalSlot>) -> Result<AutomationResult> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        *self.last_task.lock().unwrap() = Some(task.to_string());

        if let Some(url) = &self.live_url {
            tokio::time::sleep(self.url_delay).await;
            slot.write(url);
        }

        tokio::time::sleep(self.run_duration).await;
        Ok(self.result.clone())
    }
}
