//! Common types used throughout pagewalk
//!
//! The data model is deliberately small: a page is an ordered batch of
//! opaque items plus whatever termination metadata the source reported.
//! The collector counts and accumulates items; it never looks inside them.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// One record of interest extracted from a page.
///
/// Items are source-defined field-name → value mappings; the core treats
/// them as opaque JSON.
pub type Item = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// Page Metadata
// ============================================================================

/// Termination metadata reported by a source alongside one page.
///
/// Sources signal exhaustion in different ways; a page carries whichever
/// fields its source exposes and leaves the rest unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Total page count reported by the source, if any
    pub total_pages: Option<u32>,
    /// Explicit "more pages" flag, if any
    pub has_more: Option<bool>,
    /// Cursor/URL for the next page, if any (`None` also means "not reported")
    pub next_cursor: Option<String>,
}

impl PageMeta {
    /// Metadata with no termination signals at all
    pub fn none() -> Self {
        Self::default()
    }

    /// Metadata carrying a total page count
    pub fn with_total_pages(total: u32) -> Self {
        Self {
            total_pages: Some(total),
            ..Self::default()
        }
    }

    /// Metadata carrying an explicit "more pages" flag
    pub fn with_has_more(has_more: bool) -> Self {
        Self {
            has_more: Some(has_more),
            ..Self::default()
        }
    }

    /// Metadata carrying a next-page cursor (`None` = source said "no more")
    pub fn with_next_cursor(cursor: Option<String>) -> Self {
        Self {
            next_cursor: cursor,
            ..Self::default()
        }
    }

    /// Whether the source says more pages are available.
    ///
    /// The explicit flag wins when present; otherwise a set cursor counts
    /// as "more". Sources that report neither are treated as done, which
    /// matches APIs where a missing `more` field means false.
    pub fn more_available(&self) -> bool {
        match self.has_more {
            Some(flag) => flag,
            None => self.next_cursor.is_some(),
        }
    }
}

// ============================================================================
// Page
// ============================================================================

/// One retrievable unit of a paginated listing: an ordered batch of items
/// plus termination metadata.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Items in source order
    pub items: Vec<Item>,
    /// Number of raw items the source returned for this page, before any
    /// caller-side filtering. Exhaustion checks count raw items, so a page
    /// whose items were all filtered out does not read as empty.
    pub raw_count: usize,
    /// Termination metadata
    pub meta: PageMeta,
}

impl Page {
    /// Create a page from items with no termination metadata
    pub fn new(items: Vec<Item>) -> Self {
        let raw_count = items.len();
        Self {
            items,
            raw_count,
            meta: PageMeta::none(),
        }
    }

    /// Create an empty page with no termination metadata
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Set the termination metadata
    #[must_use]
    pub fn with_meta(mut self, meta: PageMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Override the raw item count (for fetchers that filter items)
    #[must_use]
    pub fn with_raw_count(mut self, raw_count: usize) -> Self {
        self.raw_count = raw_count;
        self
    }

    /// Number of items kept on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the page kept no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
