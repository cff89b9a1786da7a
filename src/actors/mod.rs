//! Actor-based poll loop
//!
//! The collector runs as an independent async task and is controlled through a command channel.
//!
//! ```text
//! clock.sleep(interval) → transport.fetch → decode → evaluate → AlertSink
//!        ↑
//!        └─── Commands (PollNow, GetState, Shutdown)
//! ```
//!
//! Every collector owns its own [`collector::PollState`]; monitoring several hosts means spawning
//! several collectors.

pub mod collector;
pub mod messages;
