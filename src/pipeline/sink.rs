//! Broadcast fan-out sink
//!
//! Terminal stage of the pipeline: each chunk it accepts is offered to every
//! listener registered at that moment. A dead listener is pruned instead of
//! written to; a slow one has the chunk dropped. Neither ever fails the
//! broadcast or blocks the pipeline's pacing.

use std::sync::Arc;

use bytes::Bytes;

use crate::registry::ClientRegistry;

/// Sink that duplicates each chunk to all registered listeners
#[derive(Clone)]
pub struct BroadcastSink {
    registry: Arc<ClientRegistry>,
}

impl BroadcastSink {
    /// Create a sink fanning out to `registry`
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver one chunk to every current listener, pruning dead ones
    pub async fn send(&self, chunk: Bytes) {
        let dead = self.registry.offer(&chunk).await;
        self.registry.prune(&dead).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fan_out_to_all_listeners() {
        let registry = Arc::new(ClientRegistry::new(8));
        let sink = BroadcastSink::new(Arc::clone(&registry));

        let (_a, mut rx_a) = registry.register().await;
        let (_b, mut rx_b) = registry.register().await;
        let (_c, mut rx_c) = registry.register().await;

        sink.send(Bytes::from_static(b"one")).await;
        sink.send(Bytes::from_static(b"two")).await;

        for rx in [&mut rx_a, &mut rx_b, &mut rx_c] {
            assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"one"));
            assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"two"));
        }
    }

    #[tokio::test]
    async fn test_closed_listener_pruned_within_one_cycle() {
        let registry = Arc::new(ClientRegistry::new(8));
        let sink = BroadcastSink::new(Arc::clone(&registry));

        let (_gone, rx_gone) = registry.register().await;
        let (_alive, mut rx_alive) = registry.register().await;
        drop(rx_gone);

        sink.send(Bytes::from_static(b"chunk")).await;

        assert_eq!(registry.len().await, 1);
        assert_eq!(rx_alive.recv().await.unwrap(), Bytes::from_static(b"chunk"));
    }

    #[tokio::test]
    async fn test_send_with_no_listeners_is_harmless() {
        let registry = Arc::new(ClientRegistry::new(8));
        let sink = BroadcastSink::new(registry);

        sink.send(Bytes::from_static(b"chunk")).await;
    }
}
