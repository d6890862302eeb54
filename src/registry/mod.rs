//! Listener registry
//!
//! The registry tracks every connected listener and its output channel. It is
//! the single piece of state shared between the connection boundary (which
//! registers and removes listeners) and the pipeline (which fans chunks out).
//!
//! # Architecture
//!
//! ```text
//!                  Arc<ClientRegistry>
//!             ┌──────────────────────────────┐
//!             │ listeners: HashMap<          │
//!             │   ListenerId,                │
//!             │   mpsc::Sender<Bytes>,       │
//!             │ >                            │
//!             └─────────────┬────────────────┘
//!                           │
//!        ┌──────────────────┼──────────────────┐
//!        │                  │                  │
//!        ▼                  ▼                  ▼
//!   [Pipeline]         [Listener]         [Listener]
//!   sink.send()        rx.recv()          rx.recv()
//!        │                  │                  │
//!        └──► try_send per sender ──► HTTP response body
//! ```
//!
//! # Zero-Copy Design
//!
//! Chunks are `bytes::Bytes`, so every listener's channel holds a reference
//! to the same allocation; fan-out clones the handle, not the audio data.

pub mod listener;
pub mod store;

pub use listener::{ListenerId, ListenerStream};
pub use store::ClientRegistry;
