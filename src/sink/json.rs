//! JSON file sink

use super::Sink;
use crate::error::Result;
use crate::types::Item;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

/// Writes the whole item sequence as one JSON array
#[derive(Debug, Clone)]
pub struct JsonSink {
    path: PathBuf,
    pretty: bool,
}

impl JsonSink {
    /// Create a pretty-printing sink writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
        }
    }

    /// Compact output instead of pretty-printed
    #[must_use]
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }
}

impl Sink for JsonSink {
    fn write(&mut self, items: &[Item]) -> Result<()> {
        let file = BufWriter::new(File::create(&self.path)?);
        if self.pretty {
            serde_json::to_writer_pretty(file, items)?;
        } else {
            serde_json::to_writer(file, items)?;
        }
        info!("Wrote {} items to {}", items.len(), self.path.display());
        Ok(())
    }
}
