use std::sync::Arc;
use std::time::Duration;

use crate::session::SessionManager;

/// Interval between heartbeat pings (in seconds).
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Spawn a background task that sends periodic Ping frames to all connected
/// consumers.
///
/// The task runs until the process shuts down; the returned `JoinHandle` is
/// used to abort it explicitly during graceful shutdown.
pub fn start_heartbeat(sessions: Arc<SessionManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let count = sessions.session_count().await;
            tracing::debug!(count, "Consumer heartbeat ping");
            sessions.ping_all().await;
        }
    })
}
