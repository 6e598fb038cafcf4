//! Sensor acquisition contract.

use sensord_core::{Reading, SensorKind};

/// Failure to acquire a reading from the host.
///
/// These are expected outcomes (a sensor file missing on this board, a
/// transiently garbled value), not program errors -- the sampler loop logs
/// them and skips the tick.
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("sensor source unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("unparseable sensor output: {0}")]
    Parse(String),
}

/// A source of readings for one sensor kind.
///
/// `sample` is synchronous -- the host sources are tiny procfs/sysfs files --
/// and is called from the kind's sampler task only, so implementations do
/// not need interior mutability.
pub trait SensorProbe: Send + Sync {
    /// The kind of reading this probe produces.
    fn kind(&self) -> SensorKind;

    /// Acquire one reading, stamped with the capture time.
    fn sample(&self) -> Result<Reading, AcquisitionError>;
}
