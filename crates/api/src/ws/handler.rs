//! Live subscription WebSocket handler.
//!
//! `GET /api/v1/sensors/{kind}/live` upgrades to a WebSocket and wires up a
//! consumer session: a sender task forwarding outbound messages, a live
//! forwarder merging hub pushes into the snapshot, a periodic refetch task,
//! and the inbound command loop on the current task. All three spawned
//! tasks are aborted and the session removed on disconnect, so nothing is
//! delivered after release.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;

use sensord_core::{CoreError, Reading, SensorKind};
use sensord_store::ReadingStore;

use crate::auth::jwt::validate_token;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::session::SessionHandle;
use crate::state::AppState;
use crate::ws::protocol::{error_event, send_event, ClientCommand, ServerEvent};

/// Query parameters accepted on the upgrade request.
#[derive(Debug, Deserialize)]
pub struct LiveParams {
    /// Access token fallback for browser WebSocket clients, which cannot
    /// set an `Authorization` header on the upgrade request.
    pub token: Option<String>,
}

/// HTTP handler that authenticates and upgrades to a live subscription.
pub async fn live_handler(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(kind): Path<String>,
    Query(params): Query<LiveParams>,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let user = authenticate(user, &params, &state)?;
    let kind: SensorKind = kind.parse()?;

    // Reject unknown kinds before upgrading so the consumer gets a proper
    // 404 instead of an immediately-closed socket.
    state.store.total_count(kind)?;

    tracing::info!(username = %user.username, kind = %kind, "Live subscription accepted");
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, kind)))
}

/// Resolve the consumer identity from the `Authorization` header or the
/// `?token=` fallback.
fn authenticate(
    user: Option<AuthUser>,
    params: &LiveParams,
    state: &AppState,
) -> Result<AuthUser, AppError> {
    if let Some(user) = user {
        return Ok(user);
    }

    let token = params.token.as_deref().ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Missing Authorization header or token query parameter".into(),
        ))
    })?;

    let claims = validate_token(token, &state.config.jwt)
        .map_err(|_| AppError::Core(CoreError::Unauthorized("Invalid or expired token".into())))?;

    Ok(AuthUser {
        username: claims.sub,
        role: claims.role,
    })
}

/// Manage a single consumer connection after upgrade.
async fn handle_socket(socket: WebSocket, state: AppState, kind: SensorKind) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, kind = %kind, "Consumer connected");

    let (handle, mut rx) = state.sessions.add(conn_id.clone(), kind).await;
    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Live forwarder: merge hub pushes into the snapshot and notify the
    // consumer. The kind was validated before the upgrade, so subscription
    // cannot fail here; the guard stays for defense in depth at the hub.
    let live_task = match state.hub.subscribe(kind) {
        Ok(receiver) => tokio::spawn(forward_live_readings(receiver, Arc::clone(&handle))),
        Err(e) => {
            tracing::error!(conn_id = %conn_id, error = %e, "Live subscription unavailable");
            send_event(&handle.sender, &error_event(&e));
            tokio::spawn(std::future::ready(()))
        }
    };

    // Periodic refetch: replace the snapshot from the store on a schedule,
    // independent of the live stream.
    let refetch_task = tokio::spawn(periodic_refetch(
        Arc::clone(&handle),
        Arc::clone(&state.store),
        Duration::from_secs(state.config.refetch_interval_secs),
    ));

    // Inbound loop: consumer commands.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => handle_command(&text, &handle, &state).await,
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {
                // Binary / Ping -- ignore.
            }
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove the session and abort all tasks. Dropping the live
    // forwarder drops its broadcast receiver, which is the unsubscribe.
    state.sessions.remove(&conn_id).await;
    live_task.abort();
    refetch_task.abort();
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "Consumer disconnected");
}

/// Consume the hub subscription: merge each reading into the session
/// snapshot, then push it to the consumer.
async fn forward_live_readings(
    mut receiver: broadcast::Receiver<Reading>,
    handle: Arc<SessionHandle>,
) {
    loop {
        match receiver.recv().await {
            Ok(reading) => {
                {
                    let mut session = handle.session.lock().await;
                    session.on_live_reading(reading.clone());
                }
                send_event(&handle.sender, &ServerEvent::Reading { reading });
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                // The periodic refetch restores anything lost here.
                tracing::warn!(skipped, "Live subscription lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::debug!("Broadcast hub closed, live forwarder stopping");
                break;
            }
        }
    }
}

/// Reissue the session's base query on a fixed schedule and push the fresh
/// snapshot to the consumer.
async fn periodic_refetch(handle: Arc<SessionHandle>, store: Arc<ReadingStore>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately; the consumer just got its data.
    interval.tick().await;

    loop {
        interval.tick().await;

        let mut session = handle.session.lock().await;
        let outcome = match session.refetch(&store) {
            Ok(Some(page)) => Some(ServerEvent::Page { page: page.clone() }),
            Ok(None) => None,
            Err(e) => Some(error_event(&e)),
        };
        drop(session);

        if let Some(event) = outcome {
            send_event(&handle.sender, &event);
        }
    }
}

/// Parse and execute one consumer command, replying with the resulting
/// page or a typed error. The session lock serializes this against live
/// merges and the periodic refetch.
async fn handle_command(text: &str, handle: &Arc<SessionHandle>, state: &AppState) {
    let command = match serde_json::from_str::<ClientCommand>(text) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!(error = %e, raw = %text, "Unknown or malformed consumer command");
            send_event(
                &handle.sender,
                &ServerEvent::Error {
                    code: "BAD_REQUEST",
                    message: "malformed command".into(),
                },
            );
            return;
        }
    };

    let mut session = handle.session.lock().await;
    let result = match command {
        ClientCommand::FirstPage { page_size } => session
            .request_first_page(&state.store, page_size)
            .map(|page| Some(page.clone())),
        ClientCommand::LastPage { page_size } => session
            .request_last_page(&state.store, page_size)
            .map(|page| Some(page.clone())),
        ClientCommand::NextPage => session
            .advance_forward(&state.store)
            .map(|page| page.cloned()),
        ClientCommand::PreviousPage => session
            .advance_backward(&state.store)
            .map(|page| page.cloned()),
        ClientCommand::Refetch => session.refetch(&state.store).map(|page| page.cloned()),
    };
    drop(session);

    match result {
        Ok(Some(page)) => send_event(&handle.sender, &ServerEvent::Page { page }),
        Ok(None) => {}
        Err(e) => send_event(&handle.sender, &error_event(&e)),
    }
}
