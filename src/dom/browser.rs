//! Browser-driven page source
//!
//! Some listings only grow by driving the page: clicking a "show more"
//! control or scrolling to the bottom. [`BrowserSource`] owns one
//! WebDriver session, measures progress by item-element count, and hands
//! the page source to an [`HtmlPageDecoder`]: the browser loads, the
//! decoder parses.
//!
//! One session, strictly sequential fetches: each "page" is one load
//! batch, and the fetcher returns only the items beyond what earlier
//! batches already produced.

use super::wait::{poll_until, PollConfig};
use crate::collector::PageFetcher;
use crate::decode::{HtmlPageDecoder, PageDecoder};
use crate::error::{Error, Result};
use crate::types::Page;
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use tracing::debug;

/// How the next batch of items is loaded
#[derive(Debug, Clone)]
pub enum LoadAction {
    /// Click a "show more" control. A missing control means the listing
    /// is fully loaded.
    ClickNext {
        /// CSS selector of the control
        selector: String,
    },
    /// Scroll to the bottom of the page (infinite feeds)
    ScrollToBottom,
}

/// A browser-driven listing as a page source
pub struct BrowserSource {
    client: Client,
    decoder: HtmlPageDecoder,
    load: LoadAction,
    poll: PollConfig,
    seen: usize,
    started: bool,
}

impl BrowserSource {
    /// Wrap an already-navigated WebDriver session
    pub fn new(client: Client, decoder: HtmlPageDecoder, load: LoadAction) -> Self {
        Self {
            client,
            decoder,
            load,
            poll: PollConfig::default(),
            seen: 0,
            started: false,
        }
    }

    /// Connect to a WebDriver endpoint and open the listing page
    pub async fn open(
        webdriver_url: &str,
        page_url: &str,
        decoder: HtmlPageDecoder,
        load: LoadAction,
    ) -> Result<Self> {
        let client = ClientBuilder::native()
            .connect(webdriver_url)
            .await
            .map_err(|e| Error::browser_session(e.to_string()))?;
        client.goto(page_url).await?;
        Ok(Self::new(client, decoder, load))
    }

    /// Set the wait interval and timeout for load polling
    #[must_use]
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Close the browser session
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }

    /// Count elements currently matching the item selector
    async fn count_items(&self) -> Result<usize> {
        let elements = self
            .client
            .find_all(Locator::Css(self.decoder.item_selector()))
            .await?;
        Ok(elements.len())
    }

    /// Trigger the load action. Returns false when the trigger is gone,
    /// which reads as "nothing left to load".
    async fn trigger_load(&mut self) -> Result<bool> {
        match &self.load {
            LoadAction::ClickNext { selector } => {
                let found = self.client.find_all(Locator::Css(selector)).await?;
                let Some(button) = found.into_iter().next() else {
                    debug!("Load control '{selector}' not present, listing fully loaded");
                    return Ok(false);
                };
                // Native click first; overlays intercept it on some
                // listings, so fall back to a script click
                let arg = serde_json::to_value(&button)?;
                if button.click().await.is_err() {
                    self.client
                        .execute("arguments[0].click();", vec![arg])
                        .await?;
                }
                Ok(true)
            }
            LoadAction::ScrollToBottom => {
                self.client
                    .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
                    .await?;
                Ok(true)
            }
        }
    }

    /// Wait until the item count grows past what earlier batches produced
    async fn wait_for_growth(&self) -> Result<usize> {
        let seen = self.seen;
        poll_until(self.poll, || async move {
            let count = self.count_items().await?;
            Ok((count > seen).then_some(count))
        })
        .await
    }

    /// Decode the current page source and return the items past `seen`
    async fn decode_new_tail(&mut self) -> Result<Page> {
        let html = self.client.source().await?;
        let decoded = self.decoder.decode_page(&html)?;
        let total = decoded.items.len();
        let fresh: Vec<_> = decoded
            .items
            .into_iter()
            .skip(self.seen)
            .collect();
        self.seen = total;
        Ok(Page::new(fresh).with_meta(decoded.meta))
    }
}

#[async_trait]
impl PageFetcher for BrowserSource {
    async fn fetch_page(&mut self, _page: u32) -> Result<Page> {
        if !self.started {
            self.started = true;
            let page = self.decode_new_tail().await?;
            debug!("Initial load: {} items", page.len());
            return Ok(page);
        }

        if !self.trigger_load().await? {
            return Ok(Page::empty());
        }

        let count = self.wait_for_growth().await?;
        debug!("Item count grew to {count}");
        self.decode_new_tail().await
    }
}

impl std::fmt::Debug for BrowserSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSource")
            .field("load", &self.load)
            .field("poll", &self.poll)
            .field("seen", &self.seen)
            .finish_non_exhaustive()
    }
}
