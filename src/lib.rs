//! # pagewalk
//!
//! Policy-driven paginated collection from REST APIs and browser-driven
//! listings.
//!
//! Every paged source boils down to the same loop: fetch a page, keep its
//! items, decide whether the source is exhausted, and move on. Sources
//! disagree only about the exhaustion signal: a reported page count, an
//! explicit "more" flag, or the absence of new items. pagewalk makes that
//! loop the one shared piece and keeps everything around it a small,
//! swappable collaborator.
//!
//! ## Features
//!
//! - **One collection loop**: sequential fetches, monotonic accumulation,
//!   a fixed inter-page delay, and an optional item cap that never splits
//!   a page
//! - **Three stopping policies**: page-count bound, explicit flag (with
//!   cursor fallback), no-new-items
//! - **API sources**: reqwest transport with rate limiting and JSON
//!   record/metadata extraction
//! - **Browser sources**: WebDriver sessions that click or scroll for the
//!   next batch, with bounded waits measured by element count
//! - **Flat-file sinks**: CSV with a fixed column order, or one JSON array
//! - **Partial results**: a failed page surfaces its error next to
//!   everything collected before it, never instead of it
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagewalk::collector::{Collector, StoppingPolicy};
//! use pagewalk::decode::JsonPageDecoder;
//! use pagewalk::fetch::{HttpClient, HttpSource};
//!
//! #[tokio::main]
//! async fn main() -> pagewalk::Result<()> {
//!     let decoder = JsonPageDecoder::new()
//!         .with_record_path("items")
//!         .with_total_pages_path("pages");
//!
//!     let mut source = HttpSource::new(
//!         HttpClient::new(),
//!         "https://api.example.com/employers",
//!         Box::new(decoder),
//!     )
//!     .with_param("area", "1217")
//!     .with_per_page("per_page", 100);
//!
//!     let outcome = Collector::new(StoppingPolicy::BoundedPages)
//!         .with_cap(1000)
//!         .collect(&mut source)
//!         .await;
//!
//!     println!("{} items", outcome.items.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// The paginated collection core
pub mod collector;

/// HTTP transport and API sources
pub mod fetch;

/// Response decoders (JSON, HTML)
pub mod decode;

/// Browser-driven sources and bounded waiting
pub mod dom;

/// File sinks (CSV, JSON)
pub mod sink;

/// Source definitions and loading
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use collector::{Collected, Collector, PageFetcher, StoppingPolicy};
pub use error::{Error, Result};
pub use types::{Item, Page, PageMeta};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
