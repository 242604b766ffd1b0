//! Asynchronous headline crawler.
//!
//! # Responsibility
//! - Fetch pages over HTTP(S) or from `file://` URLs.
//! - Optionally replay load-more activations before extraction.
//! - Collect per-URL headlines into an ordered `CrawlReport`.
//!
//! # Invariants
//! - `run` never fails: any fetch/render error yields an empty headline list.
//! - Report order follows input URL order regardless of completion order.
//! - At most `max_concurrency` fetches are in flight.

mod report;

use crate::scrape::headlines::extract_headlines;
use crate::service::appender::{AppendError, AppenderConfig};
use crate::service::render::render_with_activations;
use futures::stream::{self, StreamExt};
use log::{debug, info, log, warn, Level};
use reqwest::{Client, Proxy, StatusCode, Url};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub use report::CrawlReport;

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Concurrent fetch bound used when none is configured.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;
/// Report file name used by the CLI when none is given.
pub const DEFAULT_REPORT_FILE: &str = "crawled_headlines.json";

/// How fetched HTML is prepared before extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Extract from the markup as served.
    #[default]
    Static,
    /// Replay `activations` load-more clicks first.
    Scripted { activations: u32 },
}

/// Crawler settings.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Log every fetch with its status at `info` instead of `debug`.
    pub verbose: bool,
    /// Proxy URL applied to all HTTP(S) requests.
    pub proxy: Option<String>,
    pub timeout: Duration,
    pub max_concurrency: usize,
    pub mode: FetchMode,
    /// Appender wiring used in `FetchMode::Scripted`.
    pub appender: AppenderConfig,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            mode: FetchMode::Static,
            appender: AppenderConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("unsupported url scheme `{0}`")]
    UnsupportedScheme(String),
    #[error("failed to fetch {url} with status {status}")]
    Status { url: String, status: u16 },
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("scripted render failed: {0}")]
    Script(#[from] AppendError),
    #[error("report encoding failed: {0}")]
    Report(#[from] serde_json::Error),
    #[error("invalid crawler config: {0}")]
    Config(String),
}

/// Headline crawler bound to one HTTP client.
#[derive(Debug, Clone)]
pub struct Crawler {
    client: Client,
    config: CrawlerConfig,
}

impl Crawler {
    /// Builds the HTTP client from `config`.
    ///
    /// # Errors
    /// - `Config` when `max_concurrency` is zero.
    /// - `Http` when the proxy URL is invalid or the client cannot be built.
    pub fn new(config: CrawlerConfig) -> Result<Self, CrawlError> {
        if config.max_concurrency == 0 {
            return Err(CrawlError::Config(
                "max_concurrency must be at least 1".to_string(),
            ));
        }

        let mut builder = Client::builder().timeout(config.timeout);
        if let Some(proxy) = config.proxy.as_deref() {
            builder = builder.proxy(Proxy::all(proxy)?);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Fetches one page body.
    ///
    /// # Errors
    /// - `InvalidUrl` / `UnsupportedScheme` for unusable URLs.
    /// - `Status` when an HTTP response is not `200 OK`.
    /// - `Http` / `Io` for transport failures.
    pub async fn fetch(&self, url: &str) -> Result<String, CrawlError> {
        let parsed = Url::parse(url).map_err(|err| CrawlError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        })?;

        match parsed.scheme() {
            "file" => {
                let path = parsed
                    .to_file_path()
                    .map_err(|()| CrawlError::InvalidUrl {
                        url: url.to_string(),
                        reason: "not a local file path".to_string(),
                    })?;
                let body = tokio::fs::read_to_string(&path).await?;
                self.log_fetch(url, "file");
                Ok(body)
            }
            "http" | "https" => {
                let response = self.client.get(parsed).send().await?;
                let status = response.status();
                self.log_fetch(url, status.as_str());
                if status != StatusCode::OK {
                    return Err(CrawlError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                Ok(response.text().await?)
            }
            other => Err(CrawlError::UnsupportedScheme(other.to_string())),
        }
    }

    /// Fetches, prepares and extracts one URL, surfacing errors.
    ///
    /// In scripted mode a page without the trigger is extracted as served.
    pub async fn try_run(&self, url: &str) -> Result<Vec<String>, CrawlError> {
        let html = self.fetch(url).await?;
        let html = match self.config.mode {
            FetchMode::Static => html,
            FetchMode::Scripted { activations } => {
                match render_with_activations(&html, &self.config.appender, activations) {
                    Ok(page) => page.html,
                    Err(AppendError::ElementNotFound { lookup }) => {
                        debug!(
                            "event=scripted_render module=crawl status=skipped reason=trigger_missing url={} lookup={}",
                            url, lookup
                        );
                        html
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        };
        Ok(extract_headlines(&html))
    }

    /// Like `try_run`, but logs failures and yields no headlines instead.
    pub async fn run(&self, url: &str) -> Vec<String> {
        match self.try_run(url).await {
            Ok(headlines) => headlines,
            Err(err) => {
                warn!(
                    "event=crawl_url module=crawl status=error url={} error={}",
                    url, err
                );
                Vec::new()
            }
        }
    }

    /// Crawls every URL with bounded concurrency.
    pub async fn crawl_all<I, S>(&self, urls: I) -> CrawlReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let urls = urls.into_iter().map(Into::into).collect::<Vec<String>>();
        let results = stream::iter(urls.iter().map(|url| self.run(url)))
            .buffered(self.config.max_concurrency)
            .collect::<Vec<_>>()
            .await;

        let mut report = CrawlReport::new();
        for (url, headlines) in urls.into_iter().zip(results) {
            report.insert(url, headlines);
        }
        info!(
            "event=crawl_all module=crawl status=ok urls={} headlines={}",
            report.len(),
            report.headline_count()
        );
        report
    }

    fn log_fetch(&self, url: &str, status: &str) {
        let level = if self.config.verbose {
            Level::Info
        } else {
            Level::Debug
        };
        log!(
            level,
            "event=fetch module=crawl url={} status={}",
            url,
            status
        );
    }
}

/// Crawls `urls` and writes the report to `output`.
///
/// # Errors
/// - Crawler construction or report write failures. Per-URL failures only
///   produce empty entries.
pub async fn crawl_and_save<I, S>(
    urls: I,
    output: impl AsRef<Path>,
    config: CrawlerConfig,
) -> Result<CrawlReport, CrawlError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let crawler = Crawler::new(config)?;
    let report = crawler.crawl_all(urls).await;
    report.save(output.as_ref()).await?;
    info!(
        "event=report_save module=crawl status=ok path={}",
        output.as_ref().display()
    );
    Ok(report)
}
