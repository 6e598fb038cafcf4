//! Live subscription surface: WebSocket upgrade, session wiring, heartbeat.

pub mod handler;
pub mod heartbeat;
pub mod protocol;

pub use heartbeat::start_heartbeat;
