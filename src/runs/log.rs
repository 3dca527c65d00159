use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::sync::Mutex;

use super::{RunId, RunStatus};

/// SQLite-backed append-only record of runs, for inspection after the
/// orchestration has long since responded.
pub struct RunLog {
    conn: Mutex<Connection>,
}

/// One row of the run log.
#[derive(Debug, Clone, Serialize)]
pub struct RunEntry {
    pub id: String,
    pub task: String,
    pub started_at: String,
    pub status: String,
    pub detail: Option<String>,
    pub live_url: Option<String>,
}

impl RunLog {
    /// Open or create the log in the given database. Use `":memory:"` for tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS runs (
                id         TEXT PRIMARY KEY,
                started_at TEXT NOT NULL DEFAULT (datetime('now')),
                task       TEXT NOT NULL,
                status     TEXT NOT NULL,
                detail     TEXT,
                live_url   TEXT
            )",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    pub fn record_started(&self, id: RunId, task: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO runs (id, task, status) VALUES (?1, ?2, 'running')",
            rusqlite::params![id.to_string(), task],
        )?;
        Ok(())
    }

    pub fn record_live_url(&self, id: RunId, live_url: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE runs SET live_url = ?2 WHERE id = ?1",
            rusqlite::params![id.to_string(), live_url],
        )?;
        Ok(())
    }

    pub fn record_finished(&self, id: RunId, status: &RunStatus) -> Result<()> {
        let (label, detail) = match status {
            RunStatus::Running => ("running", None),
            RunStatus::Completed(result) => {
                let label = if result.success { "completed" } else { "unsuccessful" };
                (label, Some(serde_json::to_string(result)?))
            }
            RunStatus::Failed { error } => ("failed", Some(error.clone())),
        };
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE runs SET status = ?2, detail = ?3 WHERE id = ?1",
            rusqlite::params![id.to_string(), label, detail],
        )?;
        Ok(())
    }

    /// All recorded runs, oldest first.
    pub fn list(&self) -> Result<Vec<RunEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, task, started_at, status, detail, live_url
             FROM runs ORDER BY started_at ASC, id ASC",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(RunEntry {
                    id: row.get(0)?,
                    task: row.get(1)?,
                    started_at: row.get(2)?,
                    status: row.get(3)?,
                    detail: row.get(4)?,
                    live_url: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
