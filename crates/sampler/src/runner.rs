//! Timer-driven sampling loop, one task per sensor kind.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use sensord_events::ReadingHub;
use sensord_store::ReadingStore;

use crate::probe::SensorProbe;

/// Acquire one reading and distribute it: append to the store, then publish
/// to the hub.
///
/// Every failure mode is contained here:
/// - acquisition failure: logged, nothing appended or published;
/// - store rejection (out-of-range value, non-monotonic timestamp): logged,
///   nothing published;
/// - hub rejection (unregistered kind): logged.
///
/// Returns `true` when the reading made it all the way to publish, which is
/// what the loop reports in its debug logging.
pub fn sample_and_distribute(
    probe: &dyn SensorProbe,
    store: &ReadingStore,
    hub: &ReadingHub,
) -> bool {
    let kind = probe.kind();

    let reading = match probe.sample() {
        Ok(reading) => reading,
        Err(e) => {
            tracing::warn!(kind = %kind, error = %e, "Sensor acquisition failed, skipping tick");
            return false;
        }
    };

    if let Err(e) = store.append(reading.clone()) {
        tracing::warn!(kind = %kind, error = %e, "Reading rejected by store, skipping publish");
        return false;
    }

    if let Err(e) = hub.publish(reading) {
        tracing::error!(kind = %kind, error = %e, "Reading could not be published");
        return false;
    }

    true
}

/// Run the sampling loop for one sensor kind until cancelled.
///
/// A tick that fires while the previous sample is still in flight is
/// coalesced (`MissedTickBehavior::Skip`), never queued, so a slow sensor
/// cannot build an unbounded backlog.
pub async fn run(
    probe: Arc<dyn SensorProbe>,
    store: Arc<ReadingStore>,
    hub: Arc<ReadingHub>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let kind = probe.kind();
    tracing::info!(kind = %kind, interval_ms = interval.as_millis() as u64, "Sampler loop started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(kind = %kind, "Sampler loop stopping");
                break;
            }
            _ = ticker.tick() => {
                let published = sample_and_distribute(probe.as_ref(), &store, &hub);
                tracing::debug!(kind = %kind, published, "Sampler tick complete");
            }
        }
    }
}

/// Spawn [`run`] on the current runtime and hand back its join handle.
pub fn spawn(
    probe: Arc<dyn SensorProbe>,
    store: Arc<ReadingStore>,
    hub: Arc<ReadingHub>,
    interval: Duration,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(run(probe, store, hub, interval, cancel))
}
