//! Source definitions
//!
//! A collection run is described by a YAML definition: where to fetch,
//! how to decode, when to stop, and where to write. Credentials never
//! live in definition files: `${VAR}` references in URLs, parameters,
//! and headers are expanded from the process environment at load time.

use crate::collector::StoppingPolicy;
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

static ENV_VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex"));

// ============================================================================
// Definition Types
// ============================================================================

/// One collection run, as described by a definition file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// Name of the collection (used for default output paths)
    pub name: String,
    /// Where and how to fetch pages
    pub source: SourceKind,
    /// When the source counts as exhausted
    #[serde(default)]
    pub policy: StoppingPolicy,
    /// Index of the first page (0 or 1)
    #[serde(default)]
    pub origin: u32,
    /// Maximum items to collect
    #[serde(default)]
    pub cap: Option<usize>,
    /// Fixed delay between page fetches, in milliseconds
    #[serde(default)]
    pub delay_ms: Option<u64>,
    /// Where to write the result
    #[serde(default)]
    pub output: Option<OutputDefinition>,
}

/// The fetch side of a definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceKind {
    /// Paged REST API
    Api {
        /// Endpoint URL
        url: String,
        /// Query parameter carrying the page index
        #[serde(default = "default_page_param")]
        page_param: String,
        /// Fixed query parameters
        #[serde(default)]
        params: HashMap<String, String>,
        /// Request headers (API keys go here, via `${VAR}`)
        #[serde(default)]
        headers: HashMap<String, String>,
        /// Page-size parameter name, e.g. `per_page`
        #[serde(default)]
        per_page_param: Option<String>,
        /// Page-size value
        #[serde(default)]
        per_page: Option<u32>,
        /// Requests per second allowed against this source
        #[serde(default)]
        rate_limit: Option<u32>,
        /// JSON decoding rules
        #[serde(default)]
        decode: JsonDecodeDefinition,
    },

    /// Browser-driven listing
    Browser {
        /// WebDriver endpoint
        #[serde(default = "default_webdriver_url")]
        webdriver_url: String,
        /// Listing page URL
        url: String,
        /// CSS selector for item elements
        item_selector: String,
        /// Fields to extract from each item element
        #[serde(default)]
        fields: Vec<FieldDefinition>,
        /// How the next batch is loaded
        load: LoadDefinition,
        /// Sleep between element-count probes, in milliseconds
        #[serde(default = "default_poll_interval_ms")]
        poll_interval_ms: u64,
        /// Give up waiting for growth after this long, in milliseconds
        #[serde(default = "default_poll_timeout_ms")]
        poll_timeout_ms: u64,
    },
}

/// JSON decoding rules for an API source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonDecodeDefinition {
    /// Path to the record array (whole body when unset)
    #[serde(default)]
    pub records: Option<String>,
    /// Path to the total page count
    #[serde(default)]
    pub total_pages: Option<String>,
    /// Path to the "more pages" flag
    #[serde(default)]
    pub has_more: Option<String>,
    /// Path to the next-page cursor
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// One extracted field of a browser-driven item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field name in the produced item
    pub name: String,
    /// CSS selector relative to the item element
    pub selector: String,
    /// Attribute to read; element text when unset
    #[serde(default)]
    pub attr: Option<String>,
}

/// How a browser source loads the next batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LoadDefinition {
    /// Click a "show more" control
    Click {
        /// CSS selector of the control
        selector: String,
    },
    /// Scroll to the bottom of the page
    Scroll,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// CSV rows with a fixed column order
    #[default]
    Csv,
    /// One pretty-printed JSON array
    Json,
}

/// The output side of a definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDefinition {
    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
    /// Output path; a date-stamped name is derived when unset
    #[serde(default)]
    pub path: Option<String>,
    /// Column order for CSV output
    #[serde(default)]
    pub columns: Vec<String>,
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_poll_timeout_ms() -> u64 {
    10_000
}

// ============================================================================
// Loading
// ============================================================================

/// Load a definition from a YAML file, expanding `${VAR}` references
pub fn load_definition(path: impl AsRef<Path>) -> Result<SourceDefinition> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
    load_definition_from_str(&raw)
}

/// Load a definition from YAML text, expanding `${VAR}` references
pub fn load_definition_from_str(raw: &str) -> Result<SourceDefinition> {
    let mut definition: SourceDefinition = serde_yaml::from_str(raw)?;
    definition.expand_env()?;
    definition.validate()?;
    Ok(definition)
}

impl SourceDefinition {
    /// Expand `${VAR}` references in the URL, parameters, and headers
    pub fn expand_env(&mut self) -> Result<()> {
        match &mut self.source {
            SourceKind::Api {
                url,
                params,
                headers,
                ..
            } => {
                *url = expand_env(url)?;
                for value in params.values_mut() {
                    *value = expand_env(value)?;
                }
                for value in headers.values_mut() {
                    *value = expand_env(value)?;
                }
            }
            SourceKind::Browser {
                webdriver_url, url, ..
            } => {
                *webdriver_url = expand_env(webdriver_url)?;
                *url = expand_env(url)?;
            }
        }
        Ok(())
    }

    /// Check the definition for values that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::invalid("name", "must not be empty"));
        }
        if self.origin > 1 {
            return Err(Error::invalid("origin", "page origin must be 0 or 1"));
        }
        if self.cap == Some(0) {
            return Err(Error::invalid("cap", "cap of 0 would collect nothing"));
        }

        match &self.source {
            SourceKind::Api { url, .. } => {
                url::Url::parse(url)?;
            }
            SourceKind::Browser {
                item_selector,
                poll_interval_ms,
                poll_timeout_ms,
                ..
            } => {
                if item_selector.is_empty() {
                    return Err(Error::invalid("item_selector", "must not be empty"));
                }
                if poll_interval_ms >= poll_timeout_ms {
                    return Err(Error::invalid(
                        "poll_interval_ms",
                        "probe interval must be shorter than the wait timeout",
                    ));
                }
            }
        }

        if let Some(output) = &self.output {
            if output.format == OutputFormat::Csv && output.columns.is_empty() {
                return Err(Error::invalid("output.columns", "csv output needs columns"));
            }
        }

        Ok(())
    }
}

/// Expand `${VAR}` references from the process environment
pub fn expand_env(value: &str) -> Result<String> {
    let mut result = String::with_capacity(value.len());
    let mut last = 0;

    for caps in ENV_VAR_RE.captures_iter(value) {
        let whole = caps.get(0).unwrap();
        let name = &caps[1];
        let resolved = std::env::var(name).map_err(|_| Error::missing_env(name))?;
        result.push_str(&value[last..whole.start()]);
        result.push_str(&resolved);
        last = whole.end();
    }
    result.push_str(&value[last..]);

    Ok(result)
}
