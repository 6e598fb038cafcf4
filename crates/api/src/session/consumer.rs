//! One consumer's view of a sensor kind's history.
//!
//! The session holds exactly one [`Page`] snapshot plus the base query that
//! produced it. New data arrives at the head via live pushes; older pages
//! are merged in at the tail via the advance calls. Every mutation is keyed
//! on the reading identity `(kind, captured_at)`, so a reading can never
//! appear twice no matter how pushes, advances, and refetches interleave.
//!
//! All methods are synchronous and take `&mut self` -- callers serialize
//! access per session (the manager wraps each session in a mutex).

use std::collections::HashSet;

use sensord_core::{CoreError, Reading, SensorKind};
use sensord_store::{paginate, Page, PageArgs, ReadingStore, DEFAULT_PAGE_SIZE};

/// Transient per-consumer pagination + live-merge state.
///
/// Owned by exactly one connected consumer; never shared, never persisted.
pub struct ConsumerSession {
    kind: SensorKind,
    /// The query that produced the current snapshot, reissued on refetch.
    /// `None` until the consumer requests its first page.
    base_query: Option<PageArgs>,
    snapshot: Option<Page>,
}

impl ConsumerSession {
    pub fn new(kind: SensorKind) -> Self {
        Self {
            kind,
            base_query: None,
            snapshot: None,
        }
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// The currently held page, if any has been requested yet.
    pub fn snapshot(&self) -> Option<&Page> {
        self.snapshot.as_ref()
    }

    /// Fetch the oldest page, replacing any previous snapshot.
    ///
    /// An active live subscription is unaffected -- page refreshes never
    /// resubscribe.
    pub fn request_first_page(
        &mut self,
        store: &ReadingStore,
        page_size: Option<usize>,
    ) -> Result<&Page, CoreError> {
        let args = PageArgs::forward(page_size.unwrap_or(DEFAULT_PAGE_SIZE), None);
        self.request_page(store, args)
    }

    /// Fetch the newest page, replacing any previous snapshot.
    pub fn request_last_page(
        &mut self,
        store: &ReadingStore,
        page_size: Option<usize>,
    ) -> Result<&Page, CoreError> {
        let args = PageArgs::backward(page_size.unwrap_or(DEFAULT_PAGE_SIZE), None);
        self.request_page(store, args)
    }

    fn request_page(&mut self, store: &ReadingStore, args: PageArgs) -> Result<&Page, CoreError> {
        let page = paginate(store, self.kind, &args)?;
        self.base_query = Some(args);
        Ok(self.snapshot.insert(page))
    }

    /// Fetch the page after the held `end_cursor` and merge it in.
    ///
    /// Merging is a union keyed on reading identity: existing items keep
    /// their position, new items append in query order. `page_info` and
    /// `total_count` are replaced by the new query's values -- they reflect
    /// the server's current state, not an accumulation. Returns `Ok(None)`
    /// (and changes nothing) when there is no snapshot or no end cursor to
    /// advance past; on error the held snapshot is untouched.
    pub fn advance_forward(&mut self, store: &ReadingStore) -> Result<Option<&Page>, CoreError> {
        let Some(cursor) = self
            .snapshot
            .as_ref()
            .and_then(|s| s.page_info.end_cursor.clone())
        else {
            return Ok(None);
        };

        let args = PageArgs::forward(self.page_size(), Some(cursor));
        self.advance(store, args)
    }

    /// Fetch the page before the held `start_cursor` and merge it in.
    pub fn advance_backward(&mut self, store: &ReadingStore) -> Result<Option<&Page>, CoreError> {
        let Some(cursor) = self
            .snapshot
            .as_ref()
            .and_then(|s| s.page_info.start_cursor.clone())
        else {
            return Ok(None);
        };

        let args = PageArgs::backward(self.page_size(), Some(cursor));
        self.advance(store, args)
    }

    fn advance(&mut self, store: &ReadingStore, args: PageArgs) -> Result<Option<&Page>, CoreError> {
        let fetched = paginate(store, self.kind, &args)?;

        // Checked by the advance_* guards: a cursor implies a snapshot.
        let Some(snapshot) = self.snapshot.as_mut() else {
            return Ok(None);
        };

        union_into(&mut snapshot.items, fetched.items);
        snapshot.page_info = fetched.page_info;
        snapshot.total_count = fetched.total_count;
        Ok(self.snapshot.as_ref())
    }

    /// Merge a live-pushed reading into the snapshot head.
    ///
    /// Prepends the reading (new data arrives at the head) and bumps
    /// `total_count`; `page_info` cursors are deliberately left unchanged --
    /// they only move via explicit requests. A reading already present by
    /// identity, or of a different kind, is ignored entirely. Returns
    /// whether the snapshot changed.
    pub fn on_live_reading(&mut self, reading: Reading) -> bool {
        if reading.kind() != self.kind {
            return false;
        }
        let Some(snapshot) = self.snapshot.as_mut() else {
            return false;
        };
        if snapshot
            .items
            .iter()
            .any(|r| r.identity() == reading.identity())
        {
            return false;
        }

        snapshot.items.insert(0, reading);
        snapshot.total_count += 1;
        true
    }

    /// Reissue the base query from scratch, replacing the snapshot.
    ///
    /// The safeguard against missed live events or store drift: whatever
    /// partial state the snapshot accumulated is discarded in favour of the
    /// store's current answer. `Ok(None)` when no page was ever requested.
    pub fn refetch(&mut self, store: &ReadingStore) -> Result<Option<&Page>, CoreError> {
        let Some(args) = self.base_query.clone() else {
            return Ok(None);
        };
        let page = paginate(store, self.kind, &args)?;
        Ok(Some(self.snapshot.insert(page)))
    }

    /// Page size of the base query, for the advance calls.
    fn page_size(&self) -> usize {
        self.base_query
            .as_ref()
            .and_then(|args| args.first.or(args.last))
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

/// Union `fetched` into `existing`, keyed on reading identity. Existing
/// items keep their position; new items append in their query order.
fn union_into(existing: &mut Vec<Reading>, fetched: Vec<Reading>) {
    let mut seen: HashSet<_> = existing.iter().map(Reading::identity).collect();
    for reading in fetched {
        if seen.insert(reading.identity()) {
            existing.push(reading);
        }
    }
}
