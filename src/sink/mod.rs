//! File sinks
//!
//! A sink consumes the final ordered item sequence exactly once and fails
//! loudly. Collection and persistence are independent: the collector never
//! sees a sink error, and a sink never sees a partial page.

mod csv;
mod json;

pub use self::csv::CsvSink;
pub use self::json::JsonSink;

use crate::error::Result;
use crate::types::Item;

/// Consumes a finished item sequence
pub trait Sink {
    /// Persist the items
    fn write(&mut self, items: &[Item]) -> Result<()>;
}
