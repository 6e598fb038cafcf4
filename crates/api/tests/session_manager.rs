//! Unit tests for `SessionManager`.
//!
//! These exercise the consumer-session registry directly, without any HTTP
//! upgrades. They verify add/remove semantics, idempotent release, and
//! graceful shutdown behaviour.

use axum::extract::ws::Message;
use sensord_api::session::SessionManager;
use sensord_core::SensorKind;

// ---------------------------------------------------------------------------
// Test: new manager starts with zero sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_sessions() {
    let manager = SessionManager::new();

    assert_eq!(manager.session_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: add() increments the session count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_increments_session_count() {
    let manager = SessionManager::new();

    let (_handle, _rx) = manager
        .add("conn-1".to_string(), SensorKind::CpuTemperature)
        .await;

    assert_eq!(manager.session_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: remove() decrements the session count and is idempotent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_decrements_session_count() {
    let manager = SessionManager::new();

    let (_handle, _rx) = manager
        .add("conn-1".to_string(), SensorKind::CpuTemperature)
        .await;
    assert_eq!(manager.session_count().await, 1);

    manager.remove("conn-1").await;
    assert_eq!(manager.session_count().await, 0);

    // Removing the same session again has no effect and raises no error.
    manager.remove("conn-1").await;
    assert_eq!(manager.session_count().await, 0);
}

#[tokio::test]
async fn remove_unknown_id_is_noop() {
    let manager = SessionManager::new();

    let (_handle, _rx) = manager
        .add("conn-1".to_string(), SensorKind::Memory)
        .await;
    manager.remove("nonexistent").await;

    assert_eq!(manager.session_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: the handle holds a session of the requested kind
// ---------------------------------------------------------------------------

#[tokio::test]
async fn handle_session_has_the_requested_kind() {
    let manager = SessionManager::new();

    let (handle, _rx) = manager
        .add("conn-1".to_string(), SensorKind::CpuLoad)
        .await;

    let session = handle.session.lock().await;
    assert_eq!(session.kind(), SensorKind::CpuLoad);
    assert!(session.snapshot().is_none());
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears all sessions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = SessionManager::new();

    let (_h1, mut rx1) = manager
        .add("conn-1".to_string(), SensorKind::CpuTemperature)
        .await;
    let (_h2, mut rx2) = manager
        .add("conn-2".to_string(), SensorKind::Memory)
        .await;
    assert_eq!(manager.session_count().await, 2);

    manager.shutdown_all().await;

    // Session count should be zero after shutdown.
    assert_eq!(manager.session_count().await, 0);

    // Both receivers should have received a Close message.
    let msg1 = rx1.recv().await.expect("rx1 should receive Close");
    assert!(
        matches!(msg1, Message::Close(None)),
        "Expected Close(None), got: {msg1:?}"
    );

    let msg2 = rx2.recv().await.expect("rx2 should receive Close");
    assert!(
        matches!(msg2, Message::Close(None)),
        "Expected Close(None), got: {msg2:?}"
    );
}

// ---------------------------------------------------------------------------
// Test: ping_all() reaches every connected consumer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_reaches_every_session() {
    let manager = SessionManager::new();

    let (_h1, mut rx1) = manager
        .add("conn-1".to_string(), SensorKind::CpuTemperature)
        .await;
    let (_h2, mut rx2) = manager
        .add("conn-2".to_string(), SensorKind::CpuTemperature)
        .await;

    manager.ping_all().await;

    assert!(matches!(rx1.recv().await, Some(Message::Ping(_))));
    assert!(matches!(rx2.recv().await, Some(Message::Ping(_))));
}
