//! Sensor reading model.
//!
//! A [`Reading`] couples a sensor-specific value shape with its capture
//! timestamp. The sensor kind is derived from the value variant, so a
//! kind/value mismatch is unrepresentable. Readings are immutable once
//! created; their identity for deduplication is `(kind, captured_at)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Lowest physically possible temperature in Celsius.
const ABSOLUTE_ZERO_CELSIUS: f64 = -273.15;

// ---------------------------------------------------------------------------
// SensorKind
// ---------------------------------------------------------------------------

/// A distinct category of hardware measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    #[serde(rename = "cpu-temp")]
    CpuTemperature,
    #[serde(rename = "cpu-load")]
    CpuLoad,
    #[serde(rename = "memory")]
    Memory,
}

impl SensorKind {
    /// Every kind the system knows about.
    pub const ALL: [SensorKind; 3] = [
        SensorKind::CpuTemperature,
        SensorKind::CpuLoad,
        SensorKind::Memory,
    ];

    /// Stable wire name, matching the serde rename.
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::CpuTemperature => "cpu-temp",
            SensorKind::CpuLoad => "cpu-load",
            SensorKind::Memory => "memory",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpu-temp" => Ok(SensorKind::CpuTemperature),
            "cpu-load" => Ok(SensorKind::CpuLoad),
            "memory" => Ok(SensorKind::Memory),
            other => Err(CoreError::unknown_kind(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// ReadingValue
// ---------------------------------------------------------------------------

/// Sensor-specific value shape, tagged by kind on the wire.
///
/// Serializes flat, e.g. `{"kind":"cpu-temp","celsius":41.2}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum ReadingValue {
    #[serde(rename = "cpu-temp")]
    CpuTemperature { celsius: f64 },

    /// Load averages as percent of total CPU capacity (normalised by core
    /// count, as reported by the acquisition layer).
    #[serde(rename = "cpu-load")]
    CpuLoad {
        last_minute: f64,
        last_five_minutes: f64,
        last_fifteen_minutes: f64,
    },

    #[serde(rename = "memory")]
    Memory {
        used_kb: u64,
        free_kb: u64,
        disk_cache_kb: u64,
    },
}

impl ReadingValue {
    pub fn kind(&self) -> SensorKind {
        match self {
            ReadingValue::CpuTemperature { .. } => SensorKind::CpuTemperature,
            ReadingValue::CpuLoad { .. } => SensorKind::CpuLoad,
            ReadingValue::Memory { .. } => SensorKind::Memory,
        }
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// A single captured sensor measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    #[serde(flatten)]
    pub value: ReadingValue,
    pub captured_at: Timestamp,
}

impl Reading {
    pub fn new(value: ReadingValue, captured_at: Timestamp) -> Self {
        Self { value, captured_at }
    }

    pub fn kind(&self) -> SensorKind {
        self.value.kind()
    }

    /// Deduplication identity: `(kind, captured_at)`.
    pub fn identity(&self) -> (SensorKind, Timestamp) {
        (self.kind(), self.captured_at)
    }

    /// Check the value against its declared physical range.
    ///
    /// Byte counts are unsigned by construction, so only the float-valued
    /// shapes need runtime checks.
    pub fn validate(&self) -> Result<(), CoreError> {
        match &self.value {
            ReadingValue::CpuTemperature { celsius } => {
                if !celsius.is_finite() || *celsius < ABSOLUTE_ZERO_CELSIUS {
                    return Err(CoreError::Validation(format!(
                        "cpu temperature out of physical range: {celsius}"
                    )));
                }
            }
            ReadingValue::CpuLoad {
                last_minute,
                last_five_minutes,
                last_fifteen_minutes,
            } => {
                for (label, load) in [
                    ("lastMinute", last_minute),
                    ("lastFiveMinutes", last_five_minutes),
                    ("lastFifteenMinutes", last_fifteen_minutes),
                ] {
                    if !load.is_finite() || *load < 0.0 {
                        return Err(CoreError::Validation(format!(
                            "cpu load {label} out of range: {load}"
                        )));
                    }
                }
            }
            ReadingValue::Memory { .. } => {}
        }
        Ok(())
    }
}
