//! Collection state and run results

use crate::error::Error;
use crate::types::Item;

// ============================================================================
// Collection State
// ============================================================================

/// Mutable state of one collection run.
///
/// Created fresh per run, owned exclusively by the in-flight `collect`
/// call, and discarded once the result is handed to the caller. Items only
/// ever grow; the page index only ever advances until exhaustion.
#[derive(Debug, Clone, Default)]
pub struct CollectionState {
    /// Accumulated items: insertion order is page order, then in-page order
    pub items: Vec<Item>,
    /// Index of the page currently being fetched
    pub page_index: u32,
    /// No further requests will be issued for this run
    pub exhausted: bool,
    /// Pages fetched so far
    pub pages_fetched: u32,
    /// Page-count bound latched from the first successful page
    pub bounded_total: Option<u32>,
}

impl CollectionState {
    /// Create state for a run starting at the source's page origin
    pub fn new(origin: u32) -> Self {
        Self {
            page_index: origin,
            ..Self::default()
        }
    }

    /// Append one page's items, preserving order
    pub fn append(&mut self, items: Vec<Item>) {
        self.items.extend(items);
    }

    /// Latch the page-count bound. Only the first call takes effect; later
    /// pages reporting a different total are ignored.
    pub fn latch_total(&mut self, total: Option<u32>) {
        if self.pages_fetched == 0 {
            self.bounded_total = total;
        }
    }

    /// Advance to the next page index
    pub fn advance(&mut self) {
        self.page_index += 1;
    }

    /// Mark the source as exhausted
    pub fn mark_exhausted(&mut self) {
        self.exhausted = true;
    }
}

// ============================================================================
// Run Result
// ============================================================================

/// Statistics from one collection run
#[derive(Debug, Clone, Default)]
pub struct CollectStats {
    /// Total items accumulated
    pub items_collected: usize,
    /// Total pages fetched
    pub pages_fetched: u32,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

/// Outcome of one collection run.
///
/// A failed fetch does not discard what came before it: the items gathered
/// up to that point are returned alongside the error. A run that ended on
/// a stopping policy (or a DOM wait expiry) reports `exhausted` with no
/// error; a run that ended on the item cap reports neither.
#[derive(Debug)]
pub struct Collected {
    /// Accumulated items across all fetched pages, in order
    pub items: Vec<Item>,
    /// Whether the source reported or implied exhaustion
    pub exhausted: bool,
    /// Run statistics
    pub stats: CollectStats,
    /// The error that aborted the run, if any
    pub error: Option<Error>,
}

impl Collected {
    /// Whether the run finished without a surfaced error
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Return the items, or the error if the run was aborted.
    ///
    /// Convenience for callers that have no use for partial results.
    pub fn into_items(self) -> crate::error::Result<Vec<Item>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.items),
        }
    }
}
