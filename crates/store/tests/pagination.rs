//! Pagination engine tests against a seeded reading store.
//!
//! Covers cursor round-trips, page ordering/uniqueness invariants, and the
//! forward/backward page-info flags.

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use sensord_core::{CoreError, Reading, ReadingValue, SensorKind};
use sensord_store::{paginate, PageArgs, ReadingStore};

/// Store with `cpu-temp` readings at t=1..=count seconds, 40.0 + t degrees.
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
            .expect("seed append should succeed");
    }
    store
}

fn seconds_of(page_items: &[Reading]) -> Vec<i64> {
    page_items.iter().map(|r| r.captured_at.timestamp()).collect()
}

// ---------------------------------------------------------------------------
// Test: first page of three readings, size 2, then advance
// ---------------------------------------------------------------------------

#[test]
fn first_page_then_next_page_covers_all_readings() {
    let store = seeded_store(3);

    let first = paginate(
        &store,
        SensorKind::CpuTemperature,
        &PageArgs::forward(2, None),
    )
    .expect("first page should succeed");

    assert_eq!(seconds_of(&first.items), vec![1, 2]);
    assert!(first.page_info.has_next_page);
    assert!(!first.page_info.has_previous_page);
    assert_eq!(first.total_count, 3);

    let next = paginate(
        &store,
        SensorKind::CpuTemperature,
        &PageArgs::forward(2, first.page_info.end_cursor.clone()),
    )
    .expect("next page should succeed");

    assert_eq!(seconds_of(&next.items), vec![3]);
    assert!(!next.page_info.has_next_page);
    assert!(next.page_info.has_previous_page);
    assert_eq!(next.total_count, 3);
}

// ---------------------------------------------------------------------------
// Test: forward round-trip has no gap and no overlap
// ---------------------------------------------------------------------------

#[test]
fn forward_round_trip_has_no_gap_and_no_overlap() {
    let store = seeded_store(25);
    let mut cursor = None;
    let mut seen = Vec::new();

    loop {
        let page = paginate(
            &store,
            SensorKind::CpuTemperature,
            &PageArgs::forward(7, cursor.clone()),
        )
        .expect("page should succeed");

        assert!(page.items.len() <= 7);
        seen.extend(seconds_of(&page.items));

        if !page.page_info.has_next_page {
            break;
        }
        cursor = page.page_info.end_cursor.clone();
    }

    assert_eq!(seen, (1..=25).collect::<Vec<_>>());
}

// ---------------------------------------------------------------------------
// Test: items are ascending and unique on every page
// ---------------------------------------------------------------------------

#[test]
fn page_items_are_ascending_and_unique() {
    let store = seeded_store(12);

    for args in [
        PageArgs::forward(5, None),
        PageArgs::backward(5, None),
        PageArgs::default(),
    ] {
        let page = paginate(&store, SensorKind::CpuTemperature, &args)
            .expect("page should succeed");

        assert!(
            page.items
                .windows(2)
                .all(|w| w[0].captured_at < w[1].captured_at),
            "items must ascend strictly (which also rules out duplicates)"
        );
    }
}

// ---------------------------------------------------------------------------
// Test: backward paging returns the newest window, ascending
// ---------------------------------------------------------------------------

#[test]
fn last_page_returns_newest_items_ascending() {
    let store = seeded_store(10);

    let page = paginate(
        &store,
        SensorKind::CpuTemperature,
        &PageArgs::backward(3, None),
    )
    .expect("last page should succeed");

    assert_eq!(seconds_of(&page.items), vec![8, 9, 10]);
    assert!(page.page_info.has_previous_page);
    assert!(!page.page_info.has_next_page);
}

#[test]
fn previous_page_walks_backwards_without_overlap() {
    let store = seeded_store(10);

    let last = paginate(
        &store,
        SensorKind::CpuTemperature,
        &PageArgs::backward(4, None),
    )
    .expect("last page should succeed");
    assert_eq!(seconds_of(&last.items), vec![7, 8, 9, 10]);

    let previous = paginate(
        &store,
        SensorKind::CpuTemperature,
        &PageArgs::backward(4, last.page_info.start_cursor.clone()),
    )
    .expect("previous page should succeed");

    assert_eq!(seconds_of(&previous.items), vec![3, 4, 5, 6]);
    assert!(previous.page_info.has_previous_page);
    assert!(previous.page_info.has_next_page);
}

// ---------------------------------------------------------------------------
// Test: cursors correspond to the first and last item
// ---------------------------------------------------------------------------

#[test]
fn cursors_round_trip_through_the_engine() {
    let store = seeded_store(6);

    let page = paginate(
        &store,
        SensorKind::CpuTemperature,
        &PageArgs::forward(3, None),
    )
    .expect("page should succeed");

    // Using the end cursor as the next `after` bound must yield items
    // strictly after the prior page's last item.
    let next = paginate(
        &store,
        SensorKind::CpuTemperature,
        &PageArgs::forward(3, page.page_info.end_cursor.clone()),
    )
    .expect("next page should succeed");

    let prior_last = page.items.last().expect("page is non-empty").captured_at;
    assert!(next.items.iter().all(|r| r.captured_at > prior_last));
}

// ---------------------------------------------------------------------------
// Test: malformed cursor and unknown kind are typed rejections
// ---------------------------------------------------------------------------

#[test]
fn malformed_cursor_is_a_validation_error() {
    let store = seeded_store(3);
    let err = paginate(
        &store,
        SensorKind::CpuTemperature,
        &PageArgs::forward(2, Some("!!not-a-cursor!!".into())),
    )
    .unwrap_err();
    assert_matches!(err, CoreError::Validation(_));
}

#[test]
fn unknown_kind_is_a_not_found_error() {
    let store = ReadingStore::new(&[SensorKind::Memory]);
    let err = paginate(&store, SensorKind::CpuLoad, &PageArgs::default()).unwrap_err();
    assert_matches!(err, CoreError::NotFound { .. });
}
