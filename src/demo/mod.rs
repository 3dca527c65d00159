//! Demo orchestration: start a run in the background, poll its slot for the
//! live URL, best-effort relay it to whoever is watching, and respond.
//!
//! Two call sites share this: the voice-agent tool via [`DemoService::start`]
//! (respond as soon as the URL is known or the budget elapses) and the
//! demo-creation path via [`DemoService::create`] (additionally wait for the
//! run's terminal state and shape a full report). In both, the polling
//! deadline only bounds the response; the run itself is never cancelled.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::consts::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT, PRESENT_DEMO_METHOD};
use crate::engine::{AutomationResult, Engine};
use crate::extract::Extractor;
use crate::relay::Relay;
use crate::runs::log::RunLog;
use crate::runs::{RunId, RunRegistry, RunStatus};
use crate::signal::SignalSlot;
use crate::task::Task;

/// Outcome of the start-and-relay orchestration. `Failed` is reserved for
/// "could not even start"; a missing live URL is still `Started`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DemoResponse {
    Started(StartedDemo),
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct StartedDemo {
    pub success: bool,
    pub message: String,
    pub live_url: Option<String>,
    pub run_id: RunId,
}

/// Input for the demo-creation path.
#[derive(Debug, Clone, Default)]
pub struct DemoRequest {
    pub task: String,
    pub feature_name: Option<String>,
    /// Documentation to mine for usage instructions: (filename, text).
    pub docs: Option<(String, String)>,
}

/// Full report for a demo run that was driven to completion.
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub message: String,
    pub task: String,
    pub run_id: RunId,
    pub live_url: Option<String>,
    pub automation_result: AutomationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_usage_instructions: Option<String>,
}

/// Wires the engine, run registry, and relay together.
pub struct DemoService {
    engine: Arc<dyn Engine>,
    runs: Arc<RunRegistry>,
    relay: Relay,
    extractor: Option<Arc<dyn Extractor>>,
    log: Option<Arc<RunLog>>,
    poll_timeout: Duration,
    poll_interval: Duration,
}

impl DemoService {
    pub fn new(engine: Arc<dyn Engine>, runs: Arc<RunRegistry>, relay: Relay) -> Self {
        Self {
            engine,
            runs,
            relay,
            extractor: None,
            log: None,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn with_log(mut self, log: Arc<RunLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn with_poll_budget(mut self, timeout: Duration, interval: Duration) -> Self {
        self.poll_timeout = timeout;
        self.poll_interval = interval;
        self
    }

    pub fn runs(&self) -> &Arc<RunRegistry> {
        &self.runs
    }

    /// Start `task` in the background, wait up to the polling budget for its
    /// live URL, and relay the URL if it arrived. Responds without joining
    /// the run; only a launch failure is reported as an error.
    pub async fn start(&self, task: &Task) -> DemoResponse {
        let slot = Arc::new(SignalSlot::new());
        slot.reset();

        let run_id = match self
            .runs
            .launch(Arc::clone(&self.engine), task.description(), Arc::clone(&slot))
            .await
        {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(error = %e, "demo could not be started");
                return DemoResponse::Failed {
                    error: e.to_string(),
                };
            }
        };
        tracing::info!(run_id = %run_id, "demo run launched");

        let live_url = slot.await_value(self.poll_timeout, self.poll_interval).await;

        match &live_url {
            Some(url) => {
                tracing::info!(run_id = %run_id, live_url = %url, "live URL obtained");
                if let Some(log) = &self.log
                    && let Err(e) = log.record_live_url(run_id, url)
                {
                    tracing::warn!(run_id = %run_id, error = %e, "failed to record live URL");
                }
                self.relay
                    .deliver(
                        PRESENT_DEMO_METHOD,
                        serde_json::json!({ "liveUrl": url, "type": "demo" }),
                    )
                    .await;
            }
            None => {
                tracing::info!(run_id = %run_id, "live URL not ready within polling budget");
            }
        }

        let message = match &live_url {
            Some(_) => "Here is the demo.".to_string(),
            None => "Demo started; the live view is not ready yet.".to_string(),
        };

        DemoResponse::Started(StartedDemo {
            success: true,
            message,
            live_url,
            run_id,
        })
    }

    /// Create a demo and drive it to completion: compose the final task from
    /// the request (extracting usage instructions from any attached docs),
    /// run the start-and-relay orchestration, then wait for the run's
    /// terminal state and shape the report.
    ///
    /// Launch and extraction failures are errors; an unsuccessful automation
    /// is a normal report with `automation_result.success == false`.
    pub async fn create(&self, request: DemoRequest) -> Result<DemoReport> {
        let instructions = match (&request.docs, &self.extractor) {
            (Some((filename, text)), Some(extractor)) => {
                tracing::info!(file = %filename, "extracting feature usage instructions");
                let instructions = extractor
                    .extract_usage(text)
                    .await
                    .with_context(|| format!("failed to process file {}", filename))?;
                Some(instructions)
            }
            (Some((filename, _)), None) => {
                anyhow::bail!("cannot process file {}: no extractor configured", filename)
            }
            (None, _) => None,
        };

        let task = Task::with_usage_instructions(&request.task, instructions.as_deref());

        let started = match self.start(&task).await {
            DemoResponse::Started(started) => started,
            DemoResponse::Failed { error } => anyhow::bail!("{}", error),
        };

        let automation_result = match self
            .runs
            .wait_terminal(started.run_id, self.poll_interval)
            .await
        {
            Some(RunStatus::Completed(result)) => result,
            Some(RunStatus::Failed { error }) => {
                AutomationResult::failed("automation run failed", error)
            }
            _ => AutomationResult::failed("automation run vanished", "run not found in registry"),
        };

        let message = if automation_result.success {
            "Demo created successfully".to_string()
        } else {
            "Demo created but automation failed".to_string()
        };

        Ok(DemoReport {
            message,
            task: request.task,
            run_id: started.run_id,
            live_url: started.live_url,
            automation_result,
            feature_name: request.feature_name,
            uploaded_file: request.docs.map(|(filename, _)| filename),
            feature_usage_instructions: instructions,
        })
    }
}
