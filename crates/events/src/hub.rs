//! In-process broadcast hub for live sensor readings.
//!
//! [`ReadingHub`] keeps one `tokio::sync::broadcast` channel per sensor
//! kind. Each kind has a single publisher (its sampler loop) and any number
//! of independent subscribers. It is designed to be shared via
//! `Arc<ReadingHub>` across the application.

use std::collections::HashMap;

use tokio::sync::broadcast;

use sensord_core::{CoreError, Reading, SensorKind};

/// Default per-subscriber buffer capacity for each kind's channel.
const DEFAULT_CAPACITY: usize = 256;

/// Per-sensor-kind fan-out of newly captured readings.
///
/// `publish` never blocks: each subscriber has its own bounded buffer inside
/// the broadcast channel, and a slow subscriber drops its own oldest
/// readings (observed as `RecvError::Lagged`) without affecting the
/// publisher or its peers. A new subscriber sees only readings published
/// after it attaches -- there is no backlog replay. Unsubscribing is simply
/// dropping the receiver; nothing is delivered after the drop.
pub struct ReadingHub {
    channels: HashMap<SensorKind, broadcast::Sender<Reading>>,
}

impl ReadingHub {
    /// Create a hub with one channel of the given capacity per kind.
    pub fn new(kinds: &[SensorKind], capacity: usize) -> Self {
        let channels = kinds
            .iter()
            .map(|kind| {
                let (sender, _) = broadcast::channel(capacity);
                (*kind, sender)
            })
            .collect();
        Self { channels }
    }

    /// Create a hub for every known kind at the default capacity.
    pub fn with_all_kinds() -> Self {
        Self::new(&SensorKind::ALL, DEFAULT_CAPACITY)
    }

    /// Publish a reading to every current subscriber of its kind.
    ///
    /// Zero subscribers is not an error -- the reading is simply dropped
    /// (history is already persisted by the store before publish).
    pub fn publish(&self, reading: Reading) -> Result<(), CoreError> {
        let kind = reading.kind();
        let sender = self
            .channels
            .get(&kind)
            .ok_or_else(|| CoreError::unknown_kind(kind.as_str()))?;

        // Ignore the SendError -- it only means there are zero receivers.
        let _ = sender.send(reading);
        Ok(())
    }

    /// Subscribe to readings of one kind, starting from now.
    pub fn subscribe(&self, kind: SensorKind) -> Result<broadcast::Receiver<Reading>, CoreError> {
        self.channels
            .get(&kind)
            .map(broadcast::Sender::subscribe)
            .ok_or_else(|| CoreError::unknown_kind(kind.as_str()))
    }

    /// Number of currently attached subscribers for a kind.
    pub fn subscriber_count(&self, kind: SensorKind) -> usize {
        self.channels
            .get(&kind)
            .map(broadcast::Sender::receiver_count)
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
