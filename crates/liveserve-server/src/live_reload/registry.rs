//! Connected-client registry.
//!
//! The only shared mutable state in the server: the set of live WebSocket
//! connections that reload frames fan out to. A single mutex covers
//! registration, deregistration and broadcast, so the set never changes
//! underneath an iterating broadcaster.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

/// Identifier handed out at registration, used to deregister.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ClientId(u64);

/// Sending side of a connection's outbound frame queue.
///
/// The receiving end lives in the connection task that owns the socket, so
/// a send here never blocks on client I/O.
pub(crate) type FrameSender = mpsc::UnboundedSender<Arc<[u8]>>;

/// Thread-safe set of live connections.
pub(crate) struct ClientRegistry {
    inner: Mutex<RegistryInner>,
}

struct RegistryInner {
    clients: HashMap<u64, FrameSender>,
    next_id: u64,
}

impl ClientRegistry {
    /// Create an empty registry.
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                clients: HashMap::new(),
                next_id: 0,
            }),
        }
    }

    /// Add a connection that completed its handshake.
    pub(crate) fn register(&self, sender: FrameSender) -> ClientId {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.clients.insert(id, sender);
        tracing::debug!(client_id = id, clients = inner.clients.len(), "Client registered");
        ClientId(id)
    }

    /// Remove a connection. No-op when a failed broadcast already pruned it.
    pub(crate) fn unregister(&self, id: ClientId) {
        let mut inner = self.inner.lock().unwrap();
        if inner.clients.remove(&id.0).is_some() {
            tracing::debug!(
                client_id = id.0,
                clients = inner.clients.len(),
                "Client deregistered"
            );
        }
    }

    /// Queue a frame for every live connection.
    ///
    /// A send only fails when the connection task is gone; that entry is
    /// removed and delivery to the remaining clients continues. Returns the
    /// number of clients the frame was queued for.
    pub(crate) fn broadcast(&self, frame: &Arc<[u8]>) -> usize {
        let mut inner = self.inner.lock().unwrap();

        let mut stale = Vec::new();
        for (&id, sender) in &inner.clients {
            if sender.send(Arc::clone(frame)).is_err() {
                stale.push(id);
            }
        }
        for id in &stale {
            inner.clients.remove(id);
        }
        if !stale.is_empty() {
            tracing::debug!(pruned = stale.len(), "Pruned dead clients during broadcast");
        }

        inner.clients.len()
    }

    /// Number of registered connections.
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().unwrap().clients.len()
    }
}
