//! API-backed page source
//!
//! [`HttpSource`] turns a paged REST endpoint into a [`PageFetcher`]: each
//! call issues one GET with the page index injected as a query parameter
//! and hands the body to the source's decoder. Auth tokens, fixed query
//! parameters, and headers are configuration here; the collector never
//! sees them.

use super::client::{HttpClient, RequestConfig};
use crate::collector::PageFetcher;
use crate::decode::PageDecoder;
use crate::error::Result;
use crate::types::{Item, Page};
use async_trait::async_trait;
use std::collections::HashMap;

/// Caller-side item predicate. Filtered-out items do not count against
/// exhaustion; the raw page count is preserved.
pub type ItemFilter = Box<dyn Fn(&Item) -> bool + Send + Sync>;

/// A paged HTTP API as a page source
pub struct HttpSource {
    client: HttpClient,
    url: String,
    decoder: Box<dyn PageDecoder>,
    page_param: String,
    params: HashMap<String, String>,
    headers: HashMap<String, String>,
    per_page: Option<(String, u32)>,
    filter: Option<ItemFilter>,
}

impl HttpSource {
    /// Create a source for `url`, decoded by `decoder`. The page index is
    /// sent as the `page` query parameter unless overridden.
    pub fn new(client: HttpClient, url: impl Into<String>, decoder: Box<dyn PageDecoder>) -> Self {
        Self {
            client,
            url: url.into(),
            decoder,
            page_param: "page".to_string(),
            params: HashMap::new(),
            headers: HashMap::new(),
            per_page: None,
            filter: None,
        }
    }

    /// Set the query parameter name carrying the page index
    #[must_use]
    pub fn with_page_param(mut self, name: impl Into<String>) -> Self {
        self.page_param = name.into();
        self
    }

    /// Add a fixed query parameter sent with every page request
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add several fixed query parameters
    #[must_use]
    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params.extend(params);
        self
    }

    /// Add a header sent with every page request (API keys live here)
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Ask the source for a fixed page size, e.g. `per_page=100`
    #[must_use]
    pub fn with_per_page(mut self, param: impl Into<String>, size: u32) -> Self {
        self.per_page = Some((param.into(), size));
        self
    }

    /// Keep only items matching the predicate.
    ///
    /// Filtering happens after decoding and does not affect exhaustion:
    /// the page's raw count stays what the source returned.
    #[must_use]
    pub fn with_item_filter(
        mut self,
        filter: impl Fn(&Item) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    fn request_config(&self, page: u32) -> RequestConfig {
        let mut config = RequestConfig::new();
        for (key, value) in &self.params {
            config = config.query(key, value);
        }
        if let Some((param, size)) = &self.per_page {
            config = config.query(param, size.to_string());
        }
        config = config.query(&self.page_param, page.to_string());
        for (key, value) in &self.headers {
            config = config.header(key, value);
        }
        config
    }
}

#[async_trait]
impl PageFetcher for HttpSource {
    async fn fetch_page(&mut self, page: u32) -> Result<Page> {
        let body = self
            .client
            .get_text(&self.url, self.request_config(page))
            .await?;
        let mut decoded = self.decoder.decode_page(&body)?;

        if let Some(filter) = &self.filter {
            let raw_count = decoded.raw_count;
            decoded.items.retain(|item| filter(item));
            decoded.raw_count = raw_count;
        }

        Ok(decoded)
    }
}

impl std::fmt::Debug for HttpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSource")
            .field("url", &self.url)
            .field("page_param", &self.page_param)
            .field("has_filter", &self.filter.is_some())
            .finish_non_exhaustive()
    }
}
