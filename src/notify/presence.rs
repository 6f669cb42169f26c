use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::notify::protocol::ServerEvent;

/// A handle to push events to one live connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub connection_id: Uuid,
    pub sender: mpsc::UnboundedSender<ServerEvent>,
}

impl ConnectionHandle {
    /// A fresh handle plus the receiver its session should drain.
    pub fn open() -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (sender, rx) = mpsc::unbounded_channel();
        let handle = Self {
            connection_id: Uuid::new_v4(),
            sender,
        };
        (handle, rx)
    }
}

/// Result of a single push attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// No live connection for the user; the event is dropped.
    NotConnected,
    /// A connection was registered but its session had already gone away.
    Closed,
}

/// Maps verified user identities to at most one live connection.
#[async_trait]
pub trait Presence: Send + Sync {
    /// Registers `handle` for `user_id`, replacing any previous connection.
    async fn register(&self, user_id: Uuid, handle: ConnectionHandle);

    /// Removes the mapping only if it still points at `connection_id`.
    /// Returns whether anything was removed.
    async fn unregister(&self, user_id: Uuid, connection_id: Uuid) -> bool;

    /// At-most-once push; never queues or retries.
    async fn send(&self, user_id: Uuid, event: ServerEvent) -> Delivery;

    async fn is_connected(&self, user_id: Uuid) -> bool;
}

/// In-process presence registry.
#[derive(Default)]
pub struct PresenceHub {
    connections: RwLock<HashMap<Uuid, ConnectionHandle>>,
}

impl PresenceHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

#[async_trait]
impl Presence for PresenceHub {
    async fn register(&self, user_id: Uuid, handle: ConnectionHandle) {
        let previous = self.connections.write().await.insert(user_id, handle);

        // Dropping the old sender ends the superseded session's event stream.
        if let Some(old) = previous {
            tracing::debug!(
                %user_id,
                connection_id = %old.connection_id,
                "connection superseded"
            );
        }
    }

    async fn unregister(&self, user_id: Uuid, connection_id: Uuid) -> bool {
        let mut connections = self.connections.write().await;
        match connections.get(&user_id) {
            Some(current) if current.connection_id == connection_id => {
                connections.remove(&user_id);
                true
            }
            _ => false,
        }
    }

    async fn send(&self, user_id: Uuid, event: ServerEvent) -> Delivery {
        let stale = {
            let connections = self.connections.read().await;
            let Some(handle) = connections.get(&user_id) else {
                return Delivery::NotConnected;
            };
            match handle.sender.send(event) {
                Ok(()) => return Delivery::Delivered,
                Err(_) => handle.connection_id,
            }
        };

        // The session dropped its receiver without unregistering yet.
        self.unregister(user_id, stale).await;
        Delivery::Closed
    }

    async fn is_connected(&self, user_id: Uuid) -> bool {
        self.connections.read().await.contains_key(&user_id)
    }
}
