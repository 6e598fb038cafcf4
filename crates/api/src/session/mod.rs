//! Per-consumer session state.
//!
//! A [`ConsumerSession`] holds one consumer's live page snapshot and the
//! merge logic that keeps it free of duplicates; the [`SessionManager`]
//! owns all active sessions, one per connected WebSocket consumer.

pub mod consumer;
pub mod manager;

pub use consumer::ConsumerSession;
pub use manager::{SessionHandle, SessionManager};
