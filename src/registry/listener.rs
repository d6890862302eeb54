//! Listener identity and connection-side stream
//!
//! `ListenerStream` adapts a listener's receive channel into a byte stream
//! suitable for an HTTP response body and deregisters the listener when the
//! connection drops it.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_stream::Stream;
use uuid::Uuid;

use super::store::ClientRegistry;

/// Unique identifier for a connected listener
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// Generate a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered listener's chunk stream
///
/// Yields each broadcast chunk as it arrives. Dropping the stream (the HTTP
/// connection closed) schedules removal of the listener from the registry;
/// until that runs, the broadcast path also prunes the closed channel lazily.
pub struct ListenerStream {
    id: ListenerId,
    rx: mpsc::Receiver<Bytes>,
    registry: Arc<ClientRegistry>,
}

impl ListenerStream {
    /// Wrap a registered listener's receiver
    pub fn new(id: ListenerId, rx: mpsc::Receiver<Bytes>, registry: Arc<ClientRegistry>) -> Self {
        Self { id, rx, registry }
    }

    /// The listener's id
    pub fn id(&self) -> &ListenerId {
        &self.id
    }
}

impl Stream for ListenerStream {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx).map(|chunk| chunk.map(Ok))
    }
}

impl Drop for ListenerStream {
    fn drop(&mut self) {
        let id = self.id.clone();
        let registry = Arc::clone(&self.registry);

        // Deregister asynchronously; outside a runtime (plain drops in tests)
        // the broadcast path's lazy pruning covers cleanup.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                registry.remove(&id).await;
            });
        }
    }
}
