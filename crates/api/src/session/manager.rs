//! Registry of active consumer sessions.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::{mpsc, Mutex, RwLock};

use sensord_core::types::Timestamp;
use sensord_core::SensorKind;

use crate::session::ConsumerSession;

/// Channel sender half for pushing messages to a consumer's WebSocket.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// One connected consumer: its session state plus its outbound channel.
///
/// The session sits behind a `tokio::sync::Mutex` because live-reading
/// merges, explicit page requests, and periodic refetches all mutate the
/// same snapshot from different tasks -- within one session they must
/// serialize, across sessions everything runs concurrently.
pub struct SessionHandle {
    pub session: Mutex<ConsumerSession>,
    /// Channel sender for outbound messages to this consumer.
    pub sender: WsSender,
    /// When this consumer connected.
    pub connected_at: Timestamp,
}

/// Manages all active consumer sessions.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
}

impl SessionManager {
    /// Create a new, empty session manager.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new consumer session for one sensor kind.
    ///
    /// Returns the handle plus the receiver half of the outbound channel so
    /// the caller can forward messages to the WebSocket sink.
    pub async fn add(
        &self,
        conn_id: String,
        kind: SensorKind,
    ) -> (Arc<SessionHandle>, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = Arc::new(SessionHandle {
            session: Mutex::new(ConsumerSession::new(kind)),
            sender: tx,
            connected_at: chrono::Utc::now(),
        });
        self.sessions
            .write()
            .await
            .insert(conn_id, Arc::clone(&handle));
        (handle, rx)
    }

    /// Remove a session by its connection ID. Removing an unknown or
    /// already-removed ID is a no-op.
    pub async fn remove(&self, conn_id: &str) {
        self.sessions.write().await.remove(conn_id);
    }

    /// Return the current number of active sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Send a Close frame to every consumer, then clear the map.
    ///
    /// Used during graceful shutdown to notify all consumers before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut sessions = self.sessions.write().await;
        let count = sessions.len();
        for handle in sessions.values() {
            let _ = handle.sender.send(Message::Close(None));
        }
        sessions.clear();
        tracing::info!(count, "Closed all consumer sessions");
    }

    /// Send a Ping frame to every connected consumer.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones.
    pub async fn ping_all(&self) {
        let sessions = self.sessions.read().await;
        for handle in sessions.values() {
            let _ = handle.sender.send(Message::Ping(axum::body::Bytes::new()));
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
