//! CSV file sink

use super::Sink;
use crate::error::Result;
use crate::types::Item;
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

/// Writes items as CSV rows with a fixed column order.
///
/// Scalars are rendered plainly, nested values as JSON text, and missing
/// fields as empty cells.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
    columns: Vec<String>,
}

impl CsvSink {
    /// Create a sink writing to `path` with the given column order
    pub fn new(path: impl Into<PathBuf>, columns: Vec<String>) -> Self {
        Self {
            path: path.into(),
            columns,
        }
    }

    fn cell(value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(nested) => serde_json::to_string(nested).unwrap_or_default(),
        }
    }
}

impl Sink for CsvSink {
    fn write(&mut self, items: &[Item]) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(&self.columns)?;

        for item in items {
            let row: Vec<String> = self
                .columns
                .iter()
                .map(|column| Self::cell(item.get(column)))
                .collect();
            writer.write_record(&row)?;
        }

        writer.flush()?;
        info!("Wrote {} rows to {}", items.len(), self.path.display());
        Ok(())
    }
}
