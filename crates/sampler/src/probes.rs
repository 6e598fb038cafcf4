//! Host sensor probes backed by procfs/sysfs.
//!
//! Each probe reads one small kernel-exported file and parses it with a pure
//! function so the parsing can be tested on fixture strings. Paths are
//! injectable for the same reason.

use std::path::PathBuf;

use chrono::Utc;

use sensord_core::{Reading, ReadingValue, SensorKind};

use crate::probe::{AcquisitionError, SensorProbe};

/// Default thermal zone exposing the CPU temperature in millidegrees.
const THERMAL_ZONE_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";

const LOADAVG_PATH: &str = "/proc/loadavg";

const MEMINFO_PATH: &str = "/proc/meminfo";

// ---------------------------------------------------------------------------
// CPU temperature
// ---------------------------------------------------------------------------

/// Reads the CPU temperature from a sysfs thermal zone.
pub struct ThermalZoneProbe {
    path: PathBuf,
}

impl ThermalZoneProbe {
    pub fn new() -> Self {
        Self::with_path(THERMAL_ZONE_PATH)
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ThermalZoneProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorProbe for ThermalZoneProbe {
    fn kind(&self) -> SensorKind {
        SensorKind::CpuTemperature
    }

    fn sample(&self) -> Result<Reading, AcquisitionError> {
        let raw = std::fs::read_to_string(&self.path)?;
        let celsius = parse_thermal_zone(&raw)?;
        Ok(Reading::new(
            ReadingValue::CpuTemperature { celsius },
            Utc::now(),
        ))
    }
}

/// Parse a thermal zone value (millidegrees Celsius on one line).
fn parse_thermal_zone(raw: &str) -> Result<f64, AcquisitionError> {
    let millidegrees: i64 = raw
        .trim()
        .parse()
        .map_err(|_| AcquisitionError::Parse(format!("thermal zone value: {:?}", raw.trim())))?;
    Ok(millidegrees as f64 / 1000.0)
}

// ---------------------------------------------------------------------------
// CPU load
// ---------------------------------------------------------------------------

/// Reads load averages from `/proc/loadavg`, normalised by core count so the
/// values are percent-of-total-capacity.
pub struct LoadAvgProbe {
    path: PathBuf,
    cores: usize,
}

impl LoadAvgProbe {
    pub fn new() -> Self {
        Self::with_path(LOADAVG_PATH)
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        let cores = std::thread::available_parallelism()
            .map(usize::from)
            .unwrap_or(1);
        Self {
            path: path.into(),
            cores,
        }
    }
}

impl Default for LoadAvgProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorProbe for LoadAvgProbe {
    fn kind(&self) -> SensorKind {
        SensorKind::CpuLoad
    }

    fn sample(&self) -> Result<Reading, AcquisitionError> {
        let raw = std::fs::read_to_string(&self.path)?;
        let (last_minute, last_five_minutes, last_fifteen_minutes) =
            parse_loadavg(&raw, self.cores)?;
        Ok(Reading::new(
            ReadingValue::CpuLoad {
                last_minute,
                last_five_minutes,
                last_fifteen_minutes,
            },
            Utc::now(),
        ))
    }
}

/// Parse the three load averages from `/proc/loadavg` content.
fn parse_loadavg(raw: &str, cores: usize) -> Result<(f64, f64, f64), AcquisitionError> {
    let mut fields = raw.split_whitespace();
    let mut next = || -> Result<f64, AcquisitionError> {
        fields
            .next()
            .and_then(|f| f.parse::<f64>().ok())
            .ok_or_else(|| AcquisitionError::Parse(format!("loadavg line: {:?}", raw.trim())))
    };

    let cores = cores.max(1) as f64;
    Ok((
        100.0 * next()? / cores,
        100.0 * next()? / cores,
        100.0 * next()? / cores,
    ))
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Reads memory usage from `/proc/meminfo`.
///
/// `used` is derived the way `free(1)` reports it: total minus free minus
/// buffers and page cache; buffers + cache are reported separately as the
/// reclaimable disk cache.
pub struct MemInfoProbe {
    path: PathBuf,
}

impl MemInfoProbe {
    pub fn new() -> Self {
        Self::with_path(MEMINFO_PATH)
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for MemInfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorProbe for MemInfoProbe {
    fn kind(&self) -> SensorKind {
        SensorKind::Memory
    }

    fn sample(&self) -> Result<Reading, AcquisitionError> {
        let raw = std::fs::read_to_string(&self.path)?;
        let (used_kb, free_kb, disk_cache_kb) = parse_meminfo(&raw)?;
        Ok(Reading::new(
            ReadingValue::Memory {
                used_kb,
                free_kb,
                disk_cache_kb,
            },
            Utc::now(),
        ))
    }
}

/// Parse `MemTotal`/`MemFree`/`Buffers`/`Cached` (kB) out of meminfo content.
fn parse_meminfo(raw: &str) -> Result<(u64, u64, u64), AcquisitionError> {
    let mut total = None;
    let mut free = None;
    let mut buffers = None;
    let mut cached = None;

    for line in raw.lines() {
        let Some((label, rest)) = line.split_once(':') else {
            continue;
        };
        let slot = match label.trim() {
            "MemTotal" => &mut total,
            "MemFree" => &mut free,
            "Buffers" => &mut buffers,
            "Cached" => &mut cached,
            _ => continue,
        };
        *slot = rest.split_whitespace().next().and_then(|v| v.parse::<u64>().ok());
    }

    match (total, free, buffers, cached) {
        (Some(total), Some(free), Some(buffers), Some(cached)) => {
            let disk_cache_kb = buffers + cached;
            let used_kb = total.saturating_sub(free).saturating_sub(disk_cache_kb);
            Ok((used_kb, free, disk_cache_kb))
        }
        _ => Err(AcquisitionError::Parse(
            "meminfo missing MemTotal/MemFree/Buffers/Cached".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thermal_zone_parses_millidegrees() {
        assert_eq!(parse_thermal_zone("48312\n").unwrap(), 48.312);
        assert!(parse_thermal_zone("temp=48.3'C\n").is_err());
        assert!(parse_thermal_zone("").is_err());
    }

    #[test]
    fn loadavg_parses_and_normalises_by_cores() {
        let raw = "0.50 1.00 2.00 2/345 6789\n";
        let (one, five, fifteen) = parse_loadavg(raw, 4).unwrap();
        assert_eq!(one, 12.5);
        assert_eq!(five, 25.0);
        assert_eq!(fifteen, 50.0);
    }

    #[test]
    fn loadavg_rejects_truncated_line() {
        assert!(parse_loadavg("0.50 1.00", 4).is_err());
        assert!(parse_loadavg("", 4).is_err());
    }

    #[test]
    fn meminfo_derives_used_and_disk_cache() {
        let raw = "MemTotal:        8000000 kB\n\
                   MemFree:         2000000 kB\n\
                   MemAvailable:    5000000 kB\n\
                   Buffers:          500000 kB\n\
                   Cached:          1500000 kB\n";
        let (used, free, cache) = parse_meminfo(raw).unwrap();
        assert_eq!(free, 2_000_000);
        assert_eq!(cache, 2_000_000);
        assert_eq!(used, 4_000_000);
    }

    #[test]
    fn meminfo_missing_fields_is_a_parse_error() {
        let err = parse_meminfo("MemTotal: 8000000 kB\n").unwrap_err();
        assert!(matches!(err, AcquisitionError::Parse(_)));
    }
}
