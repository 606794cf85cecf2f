//! Decoder trait
//!
//! A decoder turns one raw response body into a [`Page`]: the items plus
//! whatever termination metadata the source reports. Decoders are
//! source-specific and supplied per source; the collector never parses
//! anything itself.

use crate::error::Result;
use crate::types::Page;

/// Turns a raw body into a page of items plus termination metadata
pub trait PageDecoder: Send + Sync {
    /// Decode one response body
    fn decode_page(&self, body: &str) -> Result<Page>;
}
