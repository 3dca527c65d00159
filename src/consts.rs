//! Project-wide constants.

use std::path::PathBuf;
use std::time::Duration;

pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// How long the orchestration waits for a live URL before responding without one.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(15);

/// Cadence of live-URL checks during the polling phase.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Response timeout for a single relay delivery to the front-end peer.
pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// RPC method the front-end handles when a demo's live URL arrives.
pub const PRESENT_DEMO_METHOD: &str = "presentDemoToUser";

/// Default database path: `~/.showrun/showrun.db`.
/// Holds the run log; use `:memory:` for ephemeral.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .expect("cannot determine home directory")
        .join(".showrun")
        .join("showrun.db")
}
