//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::collector::{Collected, Collector, PageFetcher};
use crate::config::{
    load_definition, LoadDefinition, OutputDefinition, OutputFormat, SourceDefinition, SourceKind,
};
use crate::decode::{FieldSelector, HtmlPageDecoder, JsonPageDecoder};
use crate::dom::{BrowserSource, LoadAction, PollConfig};
use crate::error::{Error, Result};
use crate::fetch::{HttpClient, HttpClientConfig, HttpSource, RateLimiterConfig};
use crate::sink::{CsvSink, JsonSink, Sink};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// A built fetcher, kept concrete so browser sessions can be closed
/// after the run
enum BuiltFetcher {
    Api(HttpSource),
    Browser(BrowserSource),
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Validate => self.validate(),
            Commands::Check => self.check().await,
            Commands::Run {
                cap,
                output,
                format,
            } => {
                self.run_collection(*cap, output.clone(), format.map(Into::into))
                    .await
            }
        }
    }

    /// Load the definition named by the -d flag
    fn load_definition(&self) -> Result<SourceDefinition> {
        let path = self
            .cli
            .definition
            .as_ref()
            .ok_or_else(|| Error::config("Definition file not specified (use -d flag)"))?;
        load_definition(path)
    }

    fn validate(&self) -> Result<()> {
        let definition = self.load_definition()?;
        let kind = match &definition.source {
            SourceKind::Api { url, .. } => format!("api ({url})"),
            SourceKind::Browser { url, .. } => format!("browser ({url})"),
        };
        println!("OK: '{}': {kind}, policy {:?}", definition.name, definition.policy);
        Ok(())
    }

    async fn check(&self) -> Result<()> {
        let definition = self.load_definition()?;
        let mut fetcher = build_fetcher(&definition).await?;

        let page = match &mut fetcher {
            BuiltFetcher::Api(source) => source.fetch_page(definition.origin).await,
            BuiltFetcher::Browser(source) => source.fetch_page(definition.origin).await,
        };
        close_fetcher(fetcher).await;
        let page = page?;

        println!(
            "Page {}: {} items ({} raw)",
            definition.origin,
            page.len(),
            page.raw_count
        );
        if let Some(total) = page.meta.total_pages {
            println!("Source reports {total} pages");
        }
        if let Some(has_more) = page.meta.has_more {
            println!("Source reports more = {has_more}");
        }
        if let Some(cursor) = &page.meta.next_cursor {
            println!("Source reports next cursor: {cursor}");
        }
        Ok(())
    }

    async fn run_collection(
        &self,
        cap: Option<usize>,
        output: Option<PathBuf>,
        format: Option<OutputFormat>,
    ) -> Result<()> {
        let definition = self.load_definition()?;
        info!("Starting collection '{}'", definition.name);

        let collector = build_collector(&definition, cap);
        let fetcher = build_fetcher(&definition).await?;

        let outcome = match fetcher {
            BuiltFetcher::Api(mut source) => collector.collect(&mut source).await,
            BuiltFetcher::Browser(mut source) => {
                let outcome = collector.collect(&mut source).await;
                if let Err(e) = source.close().await {
                    warn!("Failed to close browser session: {e}");
                }
                outcome
            }
        };

        info!(
            "Collected {} items in {} pages ({}ms)",
            outcome.stats.items_collected, outcome.stats.pages_fetched, outcome.stats.duration_ms
        );

        // Partial results are flushed before the error is reported
        self.write_output(&definition, &outcome, output, format)?;

        match outcome.error {
            Some(e) => {
                warn!("Run aborted early; wrote partial results");
                Err(e)
            }
            None => Ok(()),
        }
    }

    fn write_output(
        &self,
        definition: &SourceDefinition,
        outcome: &Collected,
        path_override: Option<PathBuf>,
        format_override: Option<OutputFormat>,
    ) -> Result<()> {
        let output = definition.output.clone().unwrap_or(OutputDefinition {
            format: OutputFormat::default(),
            path: None,
            columns: Vec::new(),
        });

        let format = format_override.unwrap_or(output.format);
        let path = path_override
            .or_else(|| output.path.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| default_output_path(&definition.name, format));

        let mut sink: Box<dyn Sink> = match format {
            OutputFormat::Csv => {
                let columns = if output.columns.is_empty() {
                    infer_columns(outcome)
                } else {
                    output.columns
                };
                Box::new(CsvSink::new(path, columns))
            }
            OutputFormat::Json => Box::new(JsonSink::new(path)),
        };

        sink.write(&outcome.items)
    }
}

/// Derive a date-stamped output file name
fn default_output_path(name: &str, format: OutputFormat) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d");
    let extension = match format {
        OutputFormat::Csv => "csv",
        OutputFormat::Json => "json",
    };
    PathBuf::from(format!("{name}_{stamp}.{extension}"))
}

/// Column order for CSV output when the definition names none: the first
/// item's field names
fn infer_columns(outcome: &Collected) -> Vec<String> {
    outcome
        .items
        .first()
        .and_then(|item| item.as_object())
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default()
}

fn build_collector(definition: &SourceDefinition, cap_override: Option<usize>) -> Collector {
    let mut collector =
        Collector::new(definition.policy).with_origin(definition.origin);
    if let Some(cap) = cap_override.or(definition.cap) {
        collector = collector.with_cap(cap);
    }
    if let Some(delay_ms) = definition.delay_ms {
        collector = collector.with_page_delay(Duration::from_millis(delay_ms));
    }
    collector
}

async fn build_fetcher(definition: &SourceDefinition) -> Result<BuiltFetcher> {
    match &definition.source {
        SourceKind::Api {
            url,
            page_param,
            params,
            headers,
            per_page_param,
            per_page,
            rate_limit,
            decode,
        } => {
            let mut client_config = HttpClientConfig::builder();
            if let Some(rps) = rate_limit {
                client_config = client_config.rate_limit(RateLimiterConfig::new(*rps, *rps));
            }
            let client = HttpClient::with_config(client_config.build());

            let mut decoder = JsonPageDecoder::new();
            if let Some(path) = &decode.records {
                decoder = decoder.with_record_path(path);
            }
            if let Some(path) = &decode.total_pages {
                decoder = decoder.with_total_pages_path(path);
            }
            if let Some(path) = &decode.has_more {
                decoder = decoder.with_has_more_path(path);
            }
            if let Some(path) = &decode.next_cursor {
                decoder = decoder.with_next_cursor_path(path);
            }

            let mut source = HttpSource::new(client, url, Box::new(decoder))
                .with_page_param(page_param)
                .with_params(params.clone());
            for (key, value) in headers {
                source = source.with_header(key, value);
            }
            if let (Some(param), Some(size)) = (per_page_param, per_page) {
                source = source.with_per_page(param, *size);
            }

            Ok(BuiltFetcher::Api(source))
        }

        SourceKind::Browser {
            webdriver_url,
            url,
            item_selector,
            fields,
            load,
            poll_interval_ms,
            poll_timeout_ms,
        } => {
            let decoder = HtmlPageDecoder::new(item_selector).with_fields(
                fields
                    .iter()
                    .map(|f| match &f.attr {
                        Some(attr) => FieldSelector::attr(&f.name, &f.selector, attr),
                        None => FieldSelector::text(&f.name, &f.selector),
                    })
                    .collect(),
            );
            let action = match load {
                LoadDefinition::Click { selector } => LoadAction::ClickNext {
                    selector: selector.clone(),
                },
                LoadDefinition::Scroll => LoadAction::ScrollToBottom,
            };

            let source = BrowserSource::open(webdriver_url, url, decoder, action)
                .await?
                .with_poll(PollConfig::new(
                    Duration::from_millis(*poll_interval_ms),
                    Duration::from_millis(*poll_timeout_ms),
                ));

            Ok(BuiltFetcher::Browser(source))
        }
    }
}

async fn close_fetcher(fetcher: BuiltFetcher) {
    if let BuiltFetcher::Browser(source) = fetcher {
        if let Err(e) = source.close().await {
            warn!("Failed to close browser session: {e}");
        }
    }
}
