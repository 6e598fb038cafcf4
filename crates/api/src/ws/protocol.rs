//! JSON message protocol between a live consumer and the server.

use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};

use sensord_core::{CoreError, Reading};
use sensord_store::Page;

use crate::error::classify_core_error;
use crate::session::manager::WsSender;

/// Commands a consumer may send over an open live connection.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    /// Replace the snapshot with the oldest page.
    FirstPage {
        #[serde(default)]
        page_size: Option<usize>,
    },
    /// Replace the snapshot with the newest page.
    LastPage {
        #[serde(default)]
        page_size: Option<usize>,
    },
    /// Merge the page after the held end cursor.
    NextPage,
    /// Merge the page before the held start cursor.
    PreviousPage,
    /// Reissue the base query, replacing the snapshot.
    Refetch,
}

/// Events the server pushes to a consumer.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A full snapshot (reply to a page command or a periodic refetch).
    Page {
        #[serde(flatten)]
        page: Page,
    },
    /// One live reading, pushed as it is captured.
    Reading {
        #[serde(flatten)]
        reading: Reading,
    },
    /// A typed rejection of the consumer's last command.
    Error { code: &'static str, message: String },
}

/// Build an error event from a domain error, reusing the HTTP surface's
/// code/message mapping.
pub fn error_event(error: &CoreError) -> ServerEvent {
    let (_, code, message) = classify_core_error(error);
    ServerEvent::Error { code, message }
}

/// Serialize an event and queue it on a consumer's outbound channel.
///
/// A closed channel means the consumer is disconnecting; the event is
/// silently dropped and the connection teardown does the cleanup.
pub fn send_event(sender: &WsSender, event: &ServerEvent) {
    let json = serde_json::to_string(event).expect("ServerEvent is always serialisable");
    let _ = sender.send(Message::Text(json.into()));
}
