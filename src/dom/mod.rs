//! Browser-driven sources
//!
//! Listings that grow by clicking or scrolling instead of serving numbered
//! pages. Progress is measured by element count with bounded waits; a wait
//! that expires without growth is exhaustion, not failure.

mod browser;
mod wait;

pub use browser::{BrowserSource, LoadAction};
pub use wait::{poll_until, PollConfig};
