//! Append-only in-memory reading history.
//!
//! [`ReadingStore`] keeps one time series per registered sensor kind,
//! ordered by capture timestamp. Each kind has a single writer (its sampler
//! loop); readers run concurrently under the read lock and never observe a
//! partially appended reading.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use sensord_core::types::Timestamp;
use sensord_core::{CoreError, Reading, SensorKind};

/// Paging direction relative to an exclusive cursor bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Readings strictly after the bound, oldest first.
    Forward,
    /// Readings strictly before the bound, still returned ascending.
    Backward,
}

/// In-memory append-only history of sensor readings.
pub struct ReadingStore {
    series: RwLock<HashMap<SensorKind, Vec<Reading>>>,
}

impl ReadingStore {
    /// Create a store that accepts and serves only the given kinds.
    pub fn new(kinds: &[SensorKind]) -> Self {
        let series = kinds.iter().map(|k| (*k, Vec::new())).collect();
        Self {
            series: RwLock::new(series),
        }
    }

    /// Create a store registered for every known sensor kind.
    pub fn with_all_kinds() -> Self {
        Self::new(&SensorKind::ALL)
    }

    /// Append a reading to its kind's series.
    ///
    /// Fails with `Validation` if the value is out of its physical range or
    /// `captured_at` is not strictly greater than the last appended
    /// timestamp for that kind. Out-of-order samples are rejected, not
    /// reordered. Fails with `NotFound` for an unregistered kind.
    pub fn append(&self, reading: Reading) -> Result<(), CoreError> {
        reading.validate()?;

        let mut series = self.series.write().unwrap_or_else(PoisonError::into_inner);
        let kind = reading.kind();
        let readings = series
            .get_mut(&kind)
            .ok_or_else(|| CoreError::unknown_kind(kind.as_str()))?;

        if let Some(last) = readings.last() {
            if reading.captured_at <= last.captured_at {
                return Err(CoreError::Validation(format!(
                    "non-monotonic capture time for {kind}: {} <= {}",
                    reading.captured_at, last.captured_at
                )));
            }
        }

        readings.push(reading);
        Ok(())
    }

    /// Query at most `limit` readings past the exclusive `bound`.
    ///
    /// Results are always ascending by `captured_at`, whichever direction is
    /// requested. `bound = None` means "from the start" (forward) or "from
    /// the end" (backward).
    pub fn query_range(
        &self,
        kind: SensorKind,
        bound: Option<Timestamp>,
        limit: usize,
        direction: Direction,
    ) -> Result<Vec<Reading>, CoreError> {
        let series = self.series.read().unwrap_or_else(PoisonError::into_inner);
        let readings = series
            .get(&kind)
            .ok_or_else(|| CoreError::unknown_kind(kind.as_str()))?;

        let slice = match direction {
            Direction::Forward => {
                let start = match bound {
                    Some(ts) => readings.partition_point(|r| r.captured_at <= ts),
                    None => 0,
                };
                let end = (start + limit).min(readings.len());
                &readings[start..end]
            }
            Direction::Backward => {
                let end = match bound {
                    Some(ts) => readings.partition_point(|r| r.captured_at < ts),
                    None => readings.len(),
                };
                let start = end.saturating_sub(limit);
                &readings[start..end]
            }
        };

        Ok(slice.to_vec())
    }

    /// Number of readings held for a kind.
    pub fn total_count(&self, kind: SensorKind) -> Result<usize, CoreError> {
        let series = self.series.read().unwrap_or_else(PoisonError::into_inner);
        series
            .get(&kind)
            .map(Vec::len)
            .ok_or_else(|| CoreError::unknown_kind(kind.as_str()))
    }

    /// Capture time of the most recent reading for a kind, if any.
    pub fn last_captured_at(&self, kind: SensorKind) -> Result<Option<Timestamp>, CoreError> {
        let series = self.series.read().unwrap_or_else(PoisonError::into_inner);
        series
            .get(&kind)
            .map(|readings| readings.last().map(|r| r.captured_at))
            .ok_or_else(|| CoreError::unknown_kind(kind.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use sensord_core::ReadingValue;

    fn temp_at(secs: i64, celsius: f64) -> Reading {
        Reading::new(
            ReadingValue::CpuTemperature { celsius },
            Utc.timestamp_opt(secs, 0).unwrap(),
        )
    }

    #[test]
    fn append_then_query_returns_ascending() {
        let store = ReadingStore::with_all_kinds();
        for secs in 1..=5 {
            store.append(temp_at(secs, 40.0 + secs as f64)).unwrap();
        }

        let readings = store
            .query_range(SensorKind::CpuTemperature, None, 10, Direction::Forward)
            .unwrap();
        assert_eq!(readings.len(), 5);
        assert!(readings.windows(2).all(|w| w[0].captured_at < w[1].captured_at));
    }

    #[test]
    fn append_out_of_order_is_rejected_and_state_unchanged() {
        let store = ReadingStore::with_all_kinds();
        store.append(temp_at(10, 40.0)).unwrap();

        // Earlier than the last appended timestamp.
        let err = store.append(temp_at(5, 41.0)).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));

        // Equal to the last appended timestamp.
        let err = store.append(temp_at(10, 41.0)).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));

        assert_eq!(store.total_count(SensorKind::CpuTemperature).unwrap(), 1);
        assert_eq!(
            store.last_captured_at(SensorKind::CpuTemperature).unwrap(),
            Some(Utc.timestamp_opt(10, 0).unwrap())
        );
    }

    #[test]
    fn append_out_of_range_value_is_rejected() {
        let store = ReadingStore::with_all_kinds();
        let err = store.append(temp_at(1, -400.0)).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
        assert_eq!(store.total_count(SensorKind::CpuTemperature).unwrap(), 0);
    }

    #[test]
    fn unregistered_kind_is_not_found() {
        let store = ReadingStore::new(&[SensorKind::Memory]);
        let err = store
            .query_range(SensorKind::CpuTemperature, None, 10, Direction::Forward)
            .unwrap_err();
        assert_matches!(err, CoreError::NotFound { .. });

        let err = store.append(temp_at(1, 40.0)).unwrap_err();
        assert_matches!(err, CoreError::NotFound { .. });
    }

    #[test]
    fn forward_bound_is_exclusive() {
        let store = ReadingStore::with_all_kinds();
        for secs in 1..=3 {
            store.append(temp_at(secs, 40.0)).unwrap();
        }

        let bound = Utc.timestamp_opt(1, 0).unwrap();
        let readings = store
            .query_range(SensorKind::CpuTemperature, Some(bound), 10, Direction::Forward)
            .unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].captured_at, Utc.timestamp_opt(2, 0).unwrap());
    }

    #[test]
    fn backward_returns_newest_window_ascending() {
        let store = ReadingStore::with_all_kinds();
        for secs in 1..=5 {
            store.append(temp_at(secs, 40.0)).unwrap();
        }

        let readings = store
            .query_range(SensorKind::CpuTemperature, None, 2, Direction::Backward)
            .unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].captured_at, Utc.timestamp_opt(4, 0).unwrap());
        assert_eq!(readings[1].captured_at, Utc.timestamp_opt(5, 0).unwrap());

        let bound = Utc.timestamp_opt(4, 0).unwrap();
        let readings = store
            .query_range(SensorKind::CpuTemperature, Some(bound), 10, Direction::Backward)
            .unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[2].captured_at, Utc.timestamp_opt(3, 0).unwrap());
    }
}
