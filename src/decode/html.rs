//! HTML page decoder
//!
//! CSS-selector extraction for listing pages: one selector picks the item
//! elements, per-field selectors pull text or attributes out of each, and
//! an optional page-count rule discovers the listing's last page by
//! scanning paginator links with a regex.

use super::types::PageDecoder;
use crate::error::{Error, Result};
use crate::types::{JsonObject, Page, PageMeta};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

/// Pattern matching a `page=N` query fragment in paginator hrefs
static PAGE_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"page=(\d+)").expect("static regex"));

/// One extracted field of an item
#[derive(Debug, Clone)]
pub struct FieldSelector {
    /// Field name in the produced item
    pub name: String,
    /// CSS selector relative to the item element
    pub selector: String,
    /// Attribute to read; element text when unset
    pub attr: Option<String>,
}

impl FieldSelector {
    /// Field holding the matched element's text
    pub fn text(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            attr: None,
        }
    }

    /// Field holding an attribute of the matched element
    pub fn attr(
        name: impl Into<String>,
        selector: impl Into<String>,
        attr: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            attr: Some(attr.into()),
        }
    }
}

/// Page-count discovery over paginator links.
///
/// Every element matched by `selector` has its `href` (or text, when no
/// href) scanned with `pattern`; the largest first capture group becomes
/// the listing's total page count.
#[derive(Debug, Clone)]
pub struct PageCountRule {
    /// CSS selector for the paginator links
    pub selector: String,
    /// Regex whose first capture group is a page number; defaults to
    /// a `page=N` query fragment
    pub pattern: Option<String>,
}

impl PageCountRule {
    /// Rule with the default `page=N` pattern
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            pattern: None,
        }
    }

    /// Rule with a custom page-number pattern
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

/// HTML decoder extracting items via CSS selectors
#[derive(Debug, Clone)]
pub struct HtmlPageDecoder {
    item_selector: String,
    fields: Vec<FieldSelector>,
    page_count: Option<PageCountRule>,
}

impl HtmlPageDecoder {
    /// Create a decoder selecting item elements with `item_selector`
    pub fn new(item_selector: impl Into<String>) -> Self {
        Self {
            item_selector: item_selector.into(),
            fields: Vec::new(),
            page_count: None,
        }
    }

    /// Add a field to extract from every item element
    #[must_use]
    pub fn with_field(mut self, field: FieldSelector) -> Self {
        self.fields.push(field);
        self
    }

    /// Add several fields
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<FieldSelector>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Enable page-count discovery
    #[must_use]
    pub fn with_page_count(mut self, rule: PageCountRule) -> Self {
        self.page_count = Some(rule);
        self
    }

    /// The item selector string
    pub fn item_selector(&self) -> &str {
        &self.item_selector
    }

    fn extract_item(&self, element: ElementRef<'_>) -> Result<Value> {
        let mut obj = JsonObject::new();
        for field in &self.fields {
            let selector = parse_selector(&field.selector)?;
            let value = match element.select(&selector).next() {
                Some(el) => match &field.attr {
                    Some(attr) => el
                        .value()
                        .attr(attr)
                        .map(|v| Value::String(v.to_string()))
                        .unwrap_or(Value::Null),
                    None => Value::String(element_text(el)),
                },
                None => Value::Null,
            };
            obj.insert(field.name.clone(), value);
        }
        Ok(Value::Object(obj))
    }

    fn extract_total_pages(&self, doc: &Html) -> Result<Option<u32>> {
        let Some(rule) = &self.page_count else {
            return Ok(None);
        };
        let selector = parse_selector(&rule.selector)?;
        let pattern = match &rule.pattern {
            Some(p) => Regex::new(p)
                .map_err(|e| Error::parse(format!("invalid page-count pattern '{p}': {e}")))?,
            None => PAGE_PARAM_RE.clone(),
        };

        let mut max_page = None;
        for link in doc.select(&selector) {
            let haystack = match link.value().attr("href") {
                Some(href) => href.to_string(),
                None => element_text(link),
            };
            if let Some(caps) = pattern.captures(&haystack) {
                if let Some(page) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
                    max_page = Some(max_page.map_or(page, |m: u32| m.max(page)));
                }
            }
        }
        Ok(max_page)
    }
}

impl PageDecoder for HtmlPageDecoder {
    fn decode_page(&self, body: &str) -> Result<Page> {
        let doc = Html::parse_document(body);
        let item_selector = parse_selector(&self.item_selector)?;

        let mut items = Vec::new();
        for element in doc.select(&item_selector) {
            items.push(self.extract_item(element)?);
        }

        let meta = PageMeta {
            total_pages: self.extract_total_pages(&doc)?,
            ..PageMeta::default()
        };

        Ok(Page::new(items).with_meta(meta))
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| Error::parse(format!("invalid CSS selector '{selector}': {e}")))
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
