//! Throttled broadcast pipeline
//!
//! A pipeline is one pump task that owns the current source reader and
//! throttle stage and feeds the broadcast sink:
//!
//! ```text
//!   source reader ──► throttle (bytes/s pacing) ──► BroadcastSink ──► listeners
//! ```
//!
//! At most one pipeline is active process-wide. The [`Streamer`] owns its
//! lifecycle and serializes start/stop/inject; effect injection hot-swaps the
//! source reader for an external mixer process without interrupting listeners.

pub mod sink;
pub mod source;
pub mod streamer;
pub mod throttle;

pub use sink::BroadcastSink;
pub use streamer::Streamer;
pub use throttle::Throttle;
