//! Stopping policies
//!
//! Sources signal exhaustion differently, so the policy is a tagged
//! variant evaluated by the collector after every page, never a set of
//! per-source code paths.

use super::state::CollectionState;
use crate::types::PageMeta;
use serde::{Deserialize, Serialize};

/// How a collection run decides that a source is exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoppingPolicy {
    /// Stop once the next page index would pass the page-count bound the
    /// source reported on the first successful page. The bound is latched
    /// once and never re-read.
    BoundedPages,

    /// Stop when the page metadata says no more pages are available.
    /// Sources without an explicit flag fall back to cursor presence.
    ExplicitFlag,

    /// Stop when a fetch returns zero raw items. Raw counts are what the
    /// source returned, not what survived caller-side filtering.
    #[default]
    NoNewItems,
}

impl StoppingPolicy {
    /// Evaluate the policy against one fetched page.
    ///
    /// Called with the state as of that page: the bound already latched,
    /// the page's items already appended, `page_index` not yet advanced.
    pub fn evaluate(
        &self,
        meta: &PageMeta,
        raw_count: usize,
        state: &CollectionState,
    ) -> StopResult {
        match self {
            Self::BoundedPages => match state.bounded_total {
                Some(total) if state.page_index < total => StopResult::Continue,
                // No bound reported by the first page: nothing to walk
                _ => StopResult::Stop,
            },
            Self::ExplicitFlag => {
                if meta.more_available() {
                    StopResult::Continue
                } else {
                    StopResult::Stop
                }
            }
            Self::NoNewItems => {
                if raw_count == 0 {
                    StopResult::Stop
                } else {
                    StopResult::Continue
                }
            }
        }
    }
}

/// Result of evaluating a stopping policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopResult {
    /// Keep fetching
    Continue,
    /// Source is exhausted
    Stop,
}

impl StopResult {
    /// Check if we should continue
    pub fn should_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Check if we should stop
    pub fn should_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}
