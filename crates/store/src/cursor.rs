//! Opaque pagination cursors.
//!
//! A cursor encodes a position in one kind's ordered reading sequence. The
//! encoding (base64 of the capture timestamp in microseconds) is an
//! implementation detail -- consumers must treat the token as opaque so the
//! ordering key can change without breaking them.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::DateTime;
use sensord_core::types::Timestamp;
use sensord_core::CoreError;

/// Encode a capture timestamp as an opaque cursor token.
pub fn encode(captured_at: Timestamp) -> String {
    STANDARD.encode(captured_at.timestamp_micros().to_string())
}

/// Decode a cursor token back to its capture timestamp.
///
/// Any malformed token is a `Validation` error -- cursors are produced by
/// this module only, so a bad one is a caller mistake, not a server fault.
pub fn decode(token: &str) -> Result<Timestamp, CoreError> {
    let malformed = || CoreError::Validation(format!("malformed cursor: {token}"));

    let bytes = STANDARD.decode(token).map_err(|_| malformed())?;
    let micros: i64 = std::str::from_utf8(&bytes)
        .map_err(|_| malformed())?
        .parse()
        .map_err(|_| malformed())?;
    DateTime::from_timestamp_micros(micros).ok_or_else(malformed)
}
