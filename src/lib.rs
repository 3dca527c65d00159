//! showrun: backend core for live browser-automation demos.
//!
//! The interesting part is the coordination pattern in [`demo`]: a demo run
//! is launched detached, a per-run [`signal::SignalSlot`] is polled for the
//! session's late-arriving live URL, and the URL is relayed best-effort to a
//! connected front-end peer, all without ever blocking on, or cancelling,
//! the run itself.

pub mod banner;
pub mod consts;
pub mod demo;
pub mod engine;
pub mod extract;
pub mod relay;
pub mod runs;
pub mod signal;
pub mod task;
pub mod tools;
