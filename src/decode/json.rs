//! JSON page decoder
//!
//! Record extraction by dot-notation path (with array indexing) or
//! JSONPath for wildcard patterns, plus metadata paths for the three
//! exhaustion signals a JSON API may report.

use super::types::PageDecoder;
use crate::error::{Error, Result};
use crate::types::{Page, PageMeta};
use serde_json::Value;

/// JSON decoder with configurable record and metadata paths.
///
/// ```rust,ignore
/// // {"items": [...], "pages": 12}
/// let decoder = JsonPageDecoder::new()
///     .with_record_path("items")
///     .with_total_pages_path("pages");
///
/// // {"results": [...], "info": {"next": "...?page=2"}}
/// let decoder = JsonPageDecoder::new()
///     .with_record_path("results")
///     .with_next_cursor_path("info.next");
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonPageDecoder {
    record_path: Option<String>,
    total_pages_path: Option<String>,
    has_more_path: Option<String>,
    next_cursor_path: Option<String>,
}

impl JsonPageDecoder {
    /// Create a decoder that treats the whole body as the record array
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path to the record array
    #[must_use]
    pub fn with_record_path(mut self, path: impl Into<String>) -> Self {
        self.record_path = Some(path.into());
        self
    }

    /// Set the path to the source's total page count
    #[must_use]
    pub fn with_total_pages_path(mut self, path: impl Into<String>) -> Self {
        self.total_pages_path = Some(path.into());
        self
    }

    /// Set the path to the source's "more pages" flag
    #[must_use]
    pub fn with_has_more_path(mut self, path: impl Into<String>) -> Self {
        self.has_more_path = Some(path.into());
        self
    }

    /// Set the path to the source's next-page cursor or URL
    #[must_use]
    pub fn with_next_cursor_path(mut self, path: impl Into<String>) -> Self {
        self.next_cursor_path = Some(path.into());
        self
    }

    /// Extract records from a parsed body
    fn extract_records(&self, value: &Value) -> Result<Vec<Value>> {
        match &self.record_path {
            Some(path) => {
                // Wildcard patterns go through jsonpath; plain dot paths
                // (including array indexing) are walked directly
                if path.contains('*') {
                    extract_with_jsonpath(value, path)
                } else {
                    match extract_simple_path(value, path) {
                        Some(Value::Array(arr)) => Ok(arr),
                        Some(Value::Null) | None => Ok(vec![]),
                        Some(v) => Ok(vec![v]),
                    }
                }
            }
            None => match value {
                Value::Array(arr) => Ok(arr.clone()),
                _ => Ok(vec![value.clone()]),
            },
        }
    }

    fn extract_meta(&self, value: &Value) -> PageMeta {
        let total_pages = self
            .total_pages_path
            .as_deref()
            .and_then(|path| extract_simple_path(value, path))
            .and_then(|v| value_as_u32(&v));

        let has_more = self
            .has_more_path
            .as_deref()
            .and_then(|path| extract_simple_path(value, path))
            .and_then(|v| v.as_bool());

        let next_cursor = self
            .next_cursor_path
            .as_deref()
            .and_then(|path| extract_simple_path(value, path))
            .and_then(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s),
                _ => None,
            });

        PageMeta {
            total_pages,
            has_more,
            next_cursor,
        }
    }
}

impl PageDecoder for JsonPageDecoder {
    fn decode_page(&self, body: &str) -> Result<Page> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::parse(format!("body is not valid JSON: {e}")))?;

        let records = self.extract_records(&value)?;
        let meta = self.extract_meta(&value);

        Ok(Page::new(records).with_meta(meta))
    }
}

/// Coerce a JSON value into a page count
fn value_as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as u32),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Extract a value using a simple dot-notation path, e.g. `info.next`
/// or `data[0].items`
pub(crate) fn extract_simple_path(value: &Value, path: &str) -> Option<Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            let index_str = &part[bracket_pos + 1..part.len() - 1];

            if !name.is_empty() {
                current = current.get(name)?;
            }

            let index: i64 = index_str.parse().ok()?;
            let Value::Array(arr) = current else {
                return None;
            };
            let idx = if index < 0 {
                (arr.len() as i64 + index) as usize
            } else {
                index as usize
            };
            current = arr.get(idx)?;
        } else {
            current = current.get(part)?;
        }
    }

    Some(current.clone())
}

/// Extract records using jsonpath-rust (wildcard patterns)
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("invalid JSONPath '{path}': {e}")))?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}
