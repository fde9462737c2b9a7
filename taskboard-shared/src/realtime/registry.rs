/// Connection registry for live WebSocket clients
///
/// Maps an authenticated user ID to its live socket handle. At most one
/// entry is current per user: a newer connection for the same user
/// supersedes the registry pointer, and the superseded handle is
/// returned to the caller to be closed.
///
/// The registry is transport-agnostic: a [`ClientHandle`] is a channel
/// of [`SocketCommand`]s, and the socket task on the other end turns
/// them into actual frames. That keeps the dispatcher and the heartbeat
/// free of any WebSocket types.
///
/// Each handle carries a connection ID so that cleanup for an orphaned
/// old socket cannot evict a newer entry for the same user.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use tracing::debug;
use uuid::Uuid;

/// Outbound instruction for a socket task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketCommand {
    /// Send a serialized event as a text frame
    Event(String),

    /// Send a transport-level ping frame
    Ping,
}

/// Handle to one admitted connection
///
/// Cloning shares the same outbound channel and connection identity.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    connection_id: Uuid,
    sender: UnboundedSender<SocketCommand>,
}

impl ClientHandle {
    /// Creates a handle and the receiving end its socket task drains
    pub fn new() -> (Self, UnboundedReceiver<SocketCommand>) {
        let (tx, rx) = unbounded_channel();
        let handle = Self {
            connection_id: Uuid::new_v4(),
            sender: tx,
        };
        (handle, rx)
    }

    /// Unique ID of this connection instance
    pub fn connection_id(&self) -> Uuid {
        self.connection_id
    }

    /// Whether the socket task is still draining this handle
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Queues a serialized event; returns false if the connection is gone
    pub fn send_event(&self, payload: String) -> bool {
        self.sender.send(SocketCommand::Event(payload)).is_ok()
    }

    /// Queues a liveness probe; returns false if the connection is gone
    pub fn ping(&self) -> bool {
        self.sender.send(SocketCommand::Ping).is_ok()
    }
}

/// Registry of currently admitted connections
///
/// Cheap to clone; clones share the same underlying map. All mutating
/// operations are individually atomic with respect to each other.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<HashMap<i64, ClientHandle>>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces the entry for a user
    ///
    /// Returns the superseded handle when the user already had a live
    /// connection; the caller decides its fate (this system closes it).
    pub async fn admit(&self, user_id: i64, handle: ClientHandle) -> Option<ClientHandle> {
        let mut guard = self.inner.write().await;
        let superseded = guard.insert(user_id, handle);

        debug!(
            user_id,
            total = guard.len(),
            superseded = superseded.is_some(),
            "Connection admitted"
        );

        superseded
    }

    /// Removes a user's entry if it belongs to the given connection
    ///
    /// Idempotent: removing an absent user, or passing the connection ID
    /// of an already-superseded socket, is a no-op. The guard keeps a
    /// stale socket's cleanup from evicting the user's newer connection.
    pub async fn remove(&self, user_id: i64, connection_id: Uuid) {
        let mut guard = self.inner.write().await;

        if guard
            .get(&user_id)
            .map(|h| h.connection_id() == connection_id)
            .unwrap_or(false)
        {
            guard.remove(&user_id);
            debug!(user_id, total = guard.len(), "Connection removed");
        }
    }

    /// Point-in-time snapshot of all admitted connections
    ///
    /// The returned list does not react to concurrent admits/removals;
    /// consumers iterate it freely without holding the lock.
    pub async fn live_handles(&self) -> Vec<(i64, ClientHandle)> {
        let guard = self.inner.read().await;
        guard.iter().map(|(id, h)| (*id, h.clone())).collect()
    }

    /// Number of currently admitted connections
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether no connection is currently admitted
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_admit_and_snapshot() {
        let registry = ConnectionRegistry::new();
        let (handle, _rx) = ClientHandle::new();

        registry.admit(42, handle).await;

        let live = registry.live_handles().await;
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].0, 42);
    }

    #[tokio::test]
    async fn test_admit_supersedes_previous_entry() {
        let registry = ConnectionRegistry::new();
        let (first, _rx1) = ClientHandle::new();
        let (second, _rx2) = ClientHandle::new();
        let first_id = first.connection_id();

        assert!(registry.admit(42, first).await.is_none());
        let superseded = registry.admit(42, second).await.unwrap();

        assert_eq!(superseded.connection_id(), first_id);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (handle, _rx) = ClientHandle::new();
        let conn_id = handle.connection_id();

        registry.admit(42, handle).await;
        registry.remove(42, conn_id).await;
        assert!(registry.is_empty().await);

        // Second removal is a no-op
        registry.remove(42, conn_id).await;
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_stale_removal_keeps_newer_connection() {
        let registry = ConnectionRegistry::new();
        let (old, _rx1) = ClientHandle::new();
        let (new, _rx2) = ClientHandle::new();
        let old_id = old.connection_id();

        registry.admit(42, old).await;
        registry.admit(42, new).await;

        // The orphaned old socket cleaning up must not evict the new entry
        registry.remove(42, old_id).await;
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_snapshot_does_not_track_later_mutation() {
        let registry = ConnectionRegistry::new();
        let (handle, _rx) = ClientHandle::new();
        let conn_id = handle.connection_id();

        registry.admit(42, handle).await;
        let snapshot = registry.live_handles().await;

        registry.remove(42, conn_id).await;
        assert_eq!(snapshot.len(), 1);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_handle_open_state_follows_receiver() {
        let (handle, rx) = ClientHandle::new();
        assert!(handle.is_open());
        assert!(handle.ping());

        drop(rx);
        assert!(!handle.is_open());
        assert!(!handle.send_event("{}".to_string()));
    }
}
