//! Response decoders
//!
//! Source-specific decoding of raw bodies into pages: JSON field
//! extraction for APIs, CSS-selector extraction for HTML listings.

mod html;
mod json;
mod types;

pub use html::{FieldSelector, HtmlPageDecoder, PageCountRule};
pub use json::JsonPageDecoder;
pub use types::PageDecoder;
