//! HTTP transport
//!
//! A GET-only client with rate limiting and status classification, plus
//! [`HttpSource`], the API-backed page fetcher. One call, one attempt:
//! a failed page surfaces to the collector, which aborts the run and
//! returns what it has.

mod client;
mod rate_limit;
mod source;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use source::{HttpSource, ItemFilter};

#[cfg(test)]
mod tests;
