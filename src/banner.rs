//! Startup banner display.

use std::time::Duration;

use crate::consts::REPO;

/// Session configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub engine: &'a str,
    pub relay: &'a str,
    pub run_log: &'a str,
    pub poll_timeout: Duration,
    pub poll_interval: Duration,
}

/// Print the startup banner with session info.
pub fn print_banner(info: &BannerInfo) {
    println!(
        r#"
   ╔═══════════════════════════════════════╗
   ║            S H O W R U N              ║
   ║     live demos, run by an agent       ║
   ╚═══════════════════════════════════════╝

   version   {}
   repo      {}
   engine    {}
   relay     {}
   run log   {}
   polling   up to {:?} every {:?}
"#,
        env!("CARGO_PKG_VERSION"),
        REPO,
        info.engine,
        info.relay,
        info.run_log,
        info.poll_timeout,
        info.poll_interval,
    );
}
