//! Paginated collection
//!
//! The one pattern every paged source shares: fetch pages sequentially,
//! accumulate items, stop on an exhaustion signal.
//!
//! # Overview
//!
//! - [`Collector`] - the policy-parameterized collection loop
//! - [`StoppingPolicy`] - the three exhaustion signals as one tagged variant
//! - [`PageFetcher`] - the boundary a source implements to serve one page
//! - [`Collected`] - accumulated items plus a surfaced error, never one
//!   at the expense of the other
//!
//! Pages are fetched strictly sequentially: downstream sources enforce
//! rate limits, and browser-driven sources share one session.

mod policy;
mod state;

pub use policy::{StopResult, StoppingPolicy};
pub use state::{Collected, CollectionState, CollectStats};

use crate::error::Result;
use crate::types::Page;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A source that can serve one page of a paginated listing.
///
/// `page` is the index to retrieve, starting at the source's declared
/// origin. Implementations fail with a fetch-kind error on transport or
/// HTTP trouble, a parse error when the body cannot be decoded, or a wait
/// timeout when a DOM load never produced new content.
#[async_trait]
pub trait PageFetcher: Send {
    /// Retrieve one page
    async fn fetch_page(&mut self, page: u32) -> Result<Page>;
}

/// Policy-parameterized paginated collector.
///
/// ```rust,ignore
/// let collector = Collector::new(StoppingPolicy::ExplicitFlag)
///     .with_origin(0)
///     .with_cap(1000)
///     .with_page_delay(Duration::from_millis(100));
/// let outcome = collector.collect(&mut source).await;
/// ```
#[derive(Debug, Clone)]
pub struct Collector {
    policy: StoppingPolicy,
    origin: u32,
    cap: Option<usize>,
    page_delay: Duration,
}

impl Collector {
    /// Create a collector with the given stopping policy, origin 0, no
    /// cap, and no inter-page delay
    pub fn new(policy: StoppingPolicy) -> Self {
        Self {
            policy,
            origin: 0,
            cap: None,
            page_delay: Duration::ZERO,
        }
    }

    /// Set the index of the first page (0 or 1, declared per source)
    #[must_use]
    pub fn with_origin(mut self, origin: u32) -> Self {
        self.origin = origin;
        self
    }

    /// Set the maximum number of items to accumulate.
    ///
    /// A page is the smallest retrievable unit: when the cap is reached
    /// mid-page, the rest of that page is still appended and the run stops
    /// before the next fetch.
    #[must_use]
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = Some(cap);
        self
    }

    /// Set the fixed minimum delay between successive fetches.
    ///
    /// A plain sleep to respect source rate limits, applied between pages
    /// only, not before the first fetch, and not adaptively.
    #[must_use]
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// The configured stopping policy
    pub fn policy(&self) -> StoppingPolicy {
        self.policy
    }

    /// Run one collection until exhaustion, cap, or error.
    ///
    /// Errors never discard accumulated items: a failed fetch ends the run
    /// and is returned in [`Collected::error`] next to everything gathered
    /// so far. A wait timeout from a DOM source is not an error at all:
    /// the run ends as exhausted, since the source is indistinguishable
    /// from one with no more content.
    pub async fn collect<F: PageFetcher + ?Sized>(&self, fetcher: &mut F) -> Collected {
        let start = Instant::now();
        let mut state = CollectionState::new(self.origin);
        let mut error = None;

        while !state.exhausted {
            if state.pages_fetched > 0 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            let page = match fetcher.fetch_page(state.page_index).await {
                Ok(page) => page,
                Err(e) if e.is_wait_timeout() => {
                    debug!(
                        "Page {}: wait expired with no new items, source exhausted",
                        state.page_index
                    );
                    state.mark_exhausted();
                    break;
                }
                Err(e) => {
                    warn!("Page {}: fetch failed, aborting run: {e}", state.page_index);
                    error = Some(e);
                    break;
                }
            };

            let raw_count = page.raw_count;
            debug!(
                "Page {}: {} items ({} raw)",
                state.page_index,
                page.len(),
                raw_count
            );

            state.latch_total(page.meta.total_pages);
            let verdict = self.policy.evaluate(&page.meta, raw_count, &state);
            state.append(page.items);
            state.pages_fetched += 1;

            if verdict.should_stop() {
                state.mark_exhausted();
                break;
            }

            if let Some(cap) = self.cap {
                if state.items.len() >= cap {
                    debug!("Cap reached: {} items >= {cap}", state.items.len());
                    break;
                }
            }

            state.advance();
        }

        let stats = CollectStats {
            items_collected: state.items.len(),
            pages_fetched: state.pages_fetched,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        debug!(
            "Run finished: {} items in {} pages ({}ms)",
            stats.items_collected, stats.pages_fetched, stats.duration_ms
        );

        Collected {
            items: state.items,
            exhausted: state.exhausted,
            stats,
            error,
        }
    }
}
