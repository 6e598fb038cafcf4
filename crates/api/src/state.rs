use std::sync::Arc;

use sensord_events::ReadingHub;
use sensord_store::ReadingStore;

use crate::config::ServerConfig;
use crate::session::SessionManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Append-only reading history.
    pub store: Arc<ReadingStore>,
    /// Per-kind live broadcast hub.
    pub hub: Arc<ReadingHub>,
    /// Consumer session manager (one session per live WebSocket consumer).
    pub sessions: Arc<SessionManager>,
}
