//! Cursor-based pagination engine.
//!
//! Converts a `first`/`after` or `last`/`before` request into a store range
//! query and builds a [`Page`]. One extra lookahead reading past the
//! requested size resolves the paging-direction flag without a separate
//! count query; the opposite flag is implied by cursor presence (an
//! exclusive cursor bound means there are items on the other side).

use serde::{Deserialize, Serialize};

use sensord_core::{CoreError, Reading, SensorKind};

use crate::cursor;
use crate::store::{Direction, ReadingStore};

/// Page size used when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Upper bound on the caller-supplied page size.
pub const MAX_PAGE_SIZE: usize = 100;

// ---------------------------------------------------------------------------
// Request / result types
// ---------------------------------------------------------------------------

/// Pagination arguments (`?first=&after=` or `?last=&before=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageArgs {
    pub first: Option<usize>,
    pub after: Option<String>,
    pub last: Option<usize>,
    pub before: Option<String>,
}

impl PageArgs {
    /// Forward page of `size` items after the given cursor.
    pub fn forward(size: usize, after: Option<String>) -> Self {
        Self {
            first: Some(size),
            after,
            ..Default::default()
        }
    }

    /// Backward page of `size` items before the given cursor.
    pub fn backward(size: usize, before: Option<String>) -> Self {
        Self {
            last: Some(size),
            before,
            ..Default::default()
        }
    }
}

/// Position metadata for a [`Page`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub start_cursor: Option<String>,
    pub has_previous_page: bool,
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

/// One window of a kind's reading history.
///
/// `items` are unique by `(kind, captured_at)` and ascend by `captured_at`;
/// `start_cursor`/`end_cursor` correspond to the first and last item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub items: Vec<Reading>,
    pub page_info: PageInfo,
    pub total_count: usize,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Resolve a pagination request against the store.
///
/// Exactly one direction may be requested: `first`/`after` (forward) or
/// `last`/`before` (backward). All arguments unset means "first page at the
/// default size". Items always ascend by `captured_at` regardless of
/// direction -- backward paging reads the newest-first window internally and
/// the store hands it back already ascending.
pub fn paginate(store: &ReadingStore, kind: SensorKind, args: &PageArgs) -> Result<Page, CoreError> {
    let forward_requested = args.first.is_some() || args.after.is_some();
    let backward_requested = args.last.is_some() || args.before.is_some();
    if forward_requested && backward_requested {
        return Err(CoreError::Validation(
            "cannot combine forward (first/after) and backward (last/before) paging".into(),
        ));
    }

    let size = validate_page_size(if backward_requested { args.last } else { args.first })?;
    let total_count = store.total_count(kind)?;

    let (items, page_info) = if backward_requested {
        let bound = args.before.as_deref().map(cursor::decode).transpose()?;
        let mut items = store.query_range(kind, bound, size + 1, Direction::Backward)?;

        // The lookahead is the extra oldest item at the head of the window.
        let has_previous_page = items.len() > size;
        if has_previous_page {
            items.remove(0);
        }
        let page_info = PageInfo {
            start_cursor: None,
            has_previous_page,
            end_cursor: None,
            has_next_page: args.before.is_some(),
        };
        (items, page_info)
    } else {
        let bound = args.after.as_deref().map(cursor::decode).transpose()?;
        let mut items = store.query_range(kind, bound, size + 1, Direction::Forward)?;

        // The lookahead is the extra newest item at the tail.
        let has_next_page = items.len() > size;
        items.truncate(size);
        let page_info = PageInfo {
            start_cursor: None,
            has_previous_page: args.after.is_some(),
            end_cursor: None,
            has_next_page,
        };
        (items, page_info)
    };

    let page_info = PageInfo {
        start_cursor: items.first().map(|r| cursor::encode(r.captured_at)),
        end_cursor: items.last().map(|r| cursor::encode(r.captured_at)),
        ..page_info
    };

    tracing::debug!(
        kind = %kind,
        items = items.len(),
        total_count,
        "Built readings page"
    );

    Ok(Page {
        items,
        page_info,
        total_count,
    })
}

/// Check a caller-supplied page size against the allowed bounds.
fn validate_page_size(requested: Option<usize>) -> Result<usize, CoreError> {
    let size = requested.unwrap_or(DEFAULT_PAGE_SIZE);
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(CoreError::Validation(format!(
            "page size must be between 1 and {MAX_PAGE_SIZE}, got {size}"
        )));
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};
    use sensord_core::ReadingValue;

    fn seeded_store(count: i64) -> ReadingStore {
        let store = ReadingStore::with_all_kinds();
        for secs in 1..=count {
            store
                .append(Reading::new(
                    ReadingValue::CpuTemperature {
                        celsius: 40.0 + secs as f64,
                    },
                    Utc.timestamp_opt(secs, 0).unwrap(),
                ))
                .unwrap();
        }
        store
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let store = seeded_store(3);
        let err = paginate(
            &store,
            SensorKind::CpuTemperature,
            &PageArgs::forward(0, None),
        )
        .unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn oversized_page_is_rejected() {
        let store = seeded_store(3);
        let err = paginate(
            &store,
            SensorKind::CpuTemperature,
            &PageArgs::forward(MAX_PAGE_SIZE + 1, None),
        )
        .unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn mixed_directions_are_rejected() {
        let store = seeded_store(3);
        let args = PageArgs {
            first: Some(2),
            last: Some(2),
            ..Default::default()
        };
        let err = paginate(&store, SensorKind::CpuTemperature, &args).unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[test]
    fn empty_series_yields_empty_page() {
        let store = ReadingStore::with_all_kinds();
        let page = paginate(&store, SensorKind::Memory, &PageArgs::default()).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.page_info.start_cursor, None);
        assert_eq!(page.page_info.end_cursor, None);
        assert!(!page.page_info.has_next_page);
        assert!(!page.page_info.has_previous_page);
    }

    #[test]
    fn default_args_return_first_page_at_default_size() {
        let store = seeded_store(DEFAULT_PAGE_SIZE as i64 + 5);
        let page = paginate(&store, SensorKind::CpuTemperature, &PageArgs::default()).unwrap();
        assert_eq!(page.items.len(), DEFAULT_PAGE_SIZE);
        assert!(page.page_info.has_next_page);
        assert!(!page.page_info.has_previous_page);
    }

    #[test]
    fn page_serializes_camel_case_envelope() {
        let store = seeded_store(1);
        let page = paginate(&store, SensorKind::CpuTemperature, &PageArgs::default()).unwrap();
        let json = serde_json::to_value(&page).unwrap();
        assert!(json["pageInfo"]["startCursor"].is_string());
        assert!(json["pageInfo"]["hasNextPage"].is_boolean());
        assert_eq!(json["totalCount"], 1);
        assert_eq!(json["items"][0]["kind"], "cpu-temp");
    }
}
