//! Detached automation runs, keyed by run id.
//!
//! [`RunRegistry::launch`] spawns the engine call as a background task and
//! returns immediately; the caller never joins the run. Terminal states are
//! recorded in the registry (and the run log, when one is attached) so
//! "what happened to run X" stays answerable after the response went out.

pub mod log;

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::engine::{AutomationResult, Engine};
use crate::signal::SignalSlot;
use self::log::RunLog;

/// Identifies one end-to-end run, from launch through terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RunId(Uuid);

impl RunId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a run currently stands.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed(AutomationResult),
    Failed { error: String },
}

/// Tracks every launched run. Cheap to clone handles out of; the map is
/// shared with the detached tasks that update it.
pub struct RunRegistry {
    runs: Arc<RwLock<HashMap<RunId, RunStatus>>>,
    log: Option<Arc<RunLog>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self {
            runs: Arc::new(RwLock::new(HashMap::new())),
            log: None,
        }
    }

    /// Attach a persistent run log. Terminal states are appended to it.
    pub fn with_log(log: Arc<RunLog>) -> Self {
        Self {
            runs: Arc::new(RwLock::new(HashMap::new())),
            log: Some(log),
        }
    }

    /// Start a run in the background and return its id without waiting.
    ///
    /// The engine's preflight runs synchronously first; that is the only
    /// failure the caller ever sees. Everything after the spawn is detached:
    /// errors inside the run are logged and recorded, never propagated, and
    /// the run is never cancelled by anyone who launched it.
    pub async fn launch(
        &self,
        engine: Arc<dyn Engine>,
        task: &str,
        slot: Arc<SignalSlot>,
    ) -> Result<RunId> {
        engine.preflight().context("engine preflight failed")?;

        let id = RunId::new();
        self.runs.write().await.insert(id, RunStatus::Running);

        if let Some(log) = &self.log
            && let Err(e) = log.record_started(id, task)
        {
            tracing::warn!(run_id = %id, error = %e, "failed to record run start");
        }

        let task = task.to_string();
        let runs = Arc::clone(&self.runs);
        let log = self.log.clone();

        tokio::spawn(async move {
            let status = match engine.execute(&task, slot).await {
                Ok(result) => {
                    if result.success {
                        tracing::info!(run_id = %id, message = %result.message, "run completed");
                    } else {
                        tracing::warn!(run_id = %id, message = %result.message, "run finished unsuccessfully");
                    }
                    RunStatus::Completed(result)
                }
                Err(e) => {
                    tracing::error!(run_id = %id, error = %e, "run failed");
                    RunStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };

            if let Some(log) = &log
                && let Err(e) = log.record_finished(id, &status)
            {
                tracing::warn!(run_id = %id, error = %e, "failed to record run outcome");
            }

            runs.write().await.insert(id, status);
        });

        Ok(id)
    }

    /// Current status of a run, if the registry knows it.
    pub async fn status(&self, id: RunId) -> Option<RunStatus> {
        self.runs.read().await.get(&id).cloned()
    }

    /// Snapshot of all known runs.
    pub async fn list(&self) -> Vec<(RunId, RunStatus)> {
        self.runs
            .read()
            .await
            .iter()
            .map(|(id, status)| (*id, status.clone()))
            .collect()
    }

    /// Wait until `id` leaves the `Running` state, checking at `interval`.
    /// Intended for tests and the CLI's `--wait` mode, not the orchestration.
    pub async fn wait_terminal(&self, id: RunId, interval: std::time::Duration) -> Option<RunStatus> {
        loop {
            match self.status(id).await {
                Some(RunStatus::Running) => tokio::time::sleep(interval).await,
                other => return other,
            }
        }
    }
}

impl Default for RunRegistry {
    fn default() -> Self {
        Self::new()
    }
}
