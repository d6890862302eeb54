//! Single-source, multi-listener live audio broadcaster
//!
//! One authoritative audio source is throttled to real-time playback rate and
//! fanned out to every connected listener; short effect clips can be spliced
//! into the running broadcast by hot-swapping the pipeline's source for an
//! external mixer process.
//!
//! # Architecture
//!
//! ```text
//!   song file ──► SourceStage ──► Throttle ──► BroadcastSink
//!                     ▲  (bytes/s pacing)          │
//!        FX inject    │                            ├──► listener channel ──► HTTP body
//!   mixer (sox -m) ───┘                            ├──► listener channel ──► HTTP body
//!                                                  └──► ...
//! ```
//!
//! [`pipeline::Streamer`] owns the single active pipeline;
//! [`registry::ClientRegistry`] holds the listener channels;
//! [`controller::BroadcastController`] maps inbound commands onto both.

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod fx;
pub mod pipeline;
pub mod probe;
pub mod registry;
pub mod server;

pub use command::Command;
pub use config::BroadcastConfig;
pub use controller::{BroadcastController, CommandOutcome};
pub use error::{Error, Result};
pub use pipeline::{BroadcastSink, Streamer, Throttle};
pub use registry::{ClientRegistry, ListenerId};
