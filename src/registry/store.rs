//! Listener registry implementation
//!
//! Concurrent-safe collection of listener output channels keyed by a unique
//! connection id. Registration and removal may race an in-progress broadcast;
//! the `RwLock` guarantees a broadcast never observes a half-mutated map.

use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::{mpsc, RwLock};

use super::listener::ListenerId;

/// Central registry for all connected listeners
///
/// Thread-safe via `RwLock`. Broadcasting is read-heavy (one read lock per
/// chunk); registration and pruning take the write lock briefly.
pub struct ClientRegistry {
    /// Map of listener id to that listener's chunk channel
    listeners: RwLock<HashMap<ListenerId, mpsc::Sender<Bytes>>>,

    /// Chunks buffered per listener before writes are dropped
    buffer: usize,
}

impl ClientRegistry {
    /// Create a registry whose listener channels buffer `buffer` chunks
    pub fn new(buffer: usize) -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            buffer: buffer.max(1),
        }
    }

    /// Register a new listener
    ///
    /// Issues a fresh unique id and a dedicated channel. The receiver half is
    /// handed to the connection; the sender half stays in the registry for
    /// fan-out. Infallible.
    pub async fn register(&self) -> (ListenerId, mpsc::Receiver<Bytes>) {
        let id = ListenerId::new();
        let (tx, rx) = mpsc::channel(self.buffer);

        let mut listeners = self.listeners.write().await;
        listeners.insert(id.clone(), tx);

        tracing::info!(
            listener = %id,
            listeners = listeners.len(),
            "Listener registered"
        );

        (id, rx)
    }

    /// Remove a listener
    ///
    /// Idempotent: removing an unknown id is a no-op.
    pub async fn remove(&self, id: &ListenerId) {
        let mut listeners = self.listeners.write().await;

        if listeners.remove(id).is_some() {
            tracing::info!(
                listener = %id,
                listeners = listeners.len(),
                "Listener removed"
            );
        }
    }

    /// Number of registered listeners
    pub async fn len(&self) -> usize {
        self.listeners.read().await.len()
    }

    /// Whether no listeners are registered
    pub async fn is_empty(&self) -> bool {
        self.listeners.read().await.is_empty()
    }

    /// Offer a chunk to every registered listener
    ///
    /// Writes are non-blocking: a listener whose channel is closed is marked
    /// dead, a listener whose buffer is full has this chunk dropped. Returns
    /// the ids that must be pruned.
    pub(crate) async fn offer(&self, chunk: &Bytes) -> Vec<ListenerId> {
        let listeners = self.listeners.read().await;
        let mut dead = Vec::new();

        for (id, tx) in listeners.iter() {
            match tx.try_send(chunk.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    dead.push(id.clone());
                }
                Err(mpsc::error::TrySendError::Full(_)) => {
                    // Slow listener: drop this chunk for it rather than
                    // stalling the broadcast.
                    tracing::debug!(listener = %id, "Listener buffer full, chunk dropped");
                }
            }
        }

        dead
    }

    /// Remove a batch of dead listeners found during a broadcast
    pub(crate) async fn prune(&self, dead: &[ListenerId]) {
        if dead.is_empty() {
            return;
        }

        let mut listeners = self.listeners.write().await;
        for id in dead {
            if listeners.remove(id).is_some() {
                tracing::info!(listener = %id, "Dead listener pruned");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_register_issues_unique_ids() {
        let registry = ClientRegistry::new(8);

        let (a, _rx_a) = registry.register().await;
        let (b, _rx_b) = registry.register().await;

        assert_ne!(a, b);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let registry = ClientRegistry::new(8);

        let (id, _rx) = registry.register().await;
        registry.remove(&id).await;
        assert_eq!(registry.len().await, 0);

        // Second removal of the same id is a no-op
        registry.remove(&id).await;
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_offer_reaches_every_listener() {
        let registry = ClientRegistry::new(8);

        let (_a, mut rx_a) = registry.register().await;
        let (_b, mut rx_b) = registry.register().await;

        let dead = registry.offer(&Bytes::from_static(b"chunk")).await;
        assert!(dead.is_empty());

        assert_eq!(rx_a.recv().await.unwrap(), Bytes::from_static(b"chunk"));
        assert_eq!(rx_b.recv().await.unwrap(), Bytes::from_static(b"chunk"));
    }

    #[tokio::test]
    async fn test_offer_reports_closed_listeners() {
        let registry = ClientRegistry::new(8);

        let (gone, rx) = registry.register().await;
        let (_alive, _rx_alive) = registry.register().await;
        drop(rx);

        let dead = registry.offer(&Bytes::from_static(b"chunk")).await;
        assert_eq!(dead, vec![gone]);

        registry.prune(&dead).await;
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_full_buffer_drops_chunk_but_keeps_listener() {
        let registry = ClientRegistry::new(1);

        let (_id, mut rx) = registry.register().await;

        let dead = registry.offer(&Bytes::from_static(b"first")).await;
        assert!(dead.is_empty());

        // Buffer holds one chunk; the second write is dropped, not fatal
        let dead = registry.offer(&Bytes::from_static(b"second")).await;
        assert!(dead.is_empty());
        assert_eq!(registry.len().await, 1);

        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"first"));
    }

    #[tokio::test]
    async fn test_registration_concurrent_with_broadcast() {
        let registry = Arc::new(ClientRegistry::new(64));

        let broadcaster = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                for _ in 0..100 {
                    let dead = registry.offer(&Bytes::from_static(b"x")).await;
                    registry.prune(&dead).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        let churner = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                for _ in 0..100 {
                    let (id, rx) = registry.register().await;
                    drop(rx);
                    registry.remove(&id).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        broadcaster.await.unwrap();
        churner.await.unwrap();
        assert_eq!(registry.len().await, 0);
    }
}
