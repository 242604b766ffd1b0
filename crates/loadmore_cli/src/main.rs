//! Command-line entry point.
//!
//! # Responsibility
//! - `render`: replay load-more clicks on a local HTML page.
//! - `crawl`: collect tease-card headlines from URLs into a JSON report.
//! - Keep stdout for results; diagnostics go through `log`.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use loadmore_core::{
    crawl_and_save, default_log_level, init_logging, init_stderr_logging,
    render_with_activations, AppenderConfig, ArticleFragment, CrawlerConfig, FetchMode,
    CONTAINER_SELECTOR, DEFAULT_MAX_CONCURRENCY, DEFAULT_REPORT_FILE, DEFAULT_TIMEOUT, TRIGGER_ID,
};
use log::info;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "loadmore", version, about = "Load-more renderer and headline crawler")]
struct Cli {
    /// trace|debug|info|warn|error (defaults by build mode)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logs go to stderr otherwise
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply load-more clicks to an HTML page and print the result
    Render(RenderArgs),
    /// Crawl URLs and save their tease-card headlines as JSON
    Crawl(CrawlArgs),
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// HTML page to load
    #[arg(long)]
    input: PathBuf,

    /// Number of clicks delivered to the trigger
    #[arg(long, default_value_t = 1)]
    clicks: u32,

    /// Write the page here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, default_value = TRIGGER_ID)]
    trigger_id: String,

    #[arg(long, default_value = CONTAINER_SELECTOR)]
    container: String,
}

#[derive(Debug, Args)]
struct CrawlArgs {
    /// http(s):// or file:// URLs
    #[arg(required = true)]
    urls: Vec<String>,

    #[arg(long, default_value = DEFAULT_REPORT_FILE)]
    output: PathBuf,

    /// Replay this many load-more clicks before extracting
    #[arg(long)]
    scripted_clicks: Option<u32>,

    #[arg(long)]
    proxy: Option<String>,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
    concurrency: usize,

    /// Log each fetch with its status
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_cli_logging(&cli)?;

    match cli.command {
        Command::Render(args) => render(args).await,
        Command::Crawl(args) => crawl(args).await,
    }
}

fn init_cli_logging(cli: &Cli) -> Result<()> {
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    match cli.log_dir.as_deref() {
        Some(dir) => init_logging(level, dir),
        None => init_stderr_logging(level),
    }
    .map_err(|err| anyhow!(err))
    .context("failed to initialize logging")
}

async fn render(args: RenderArgs) -> Result<()> {
    let html = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let config = AppenderConfig::new(args.trigger_id, &args.container, ArticleFragment::default())?;

    let page = render_with_activations(&html, &config, args.clicks)?;
    info!(
        "event=render_cli module=cli status=ok clicks={} appended={}",
        page.activations, page.appended
    );

    match args.output {
        Some(path) => tokio::fs::write(&path, page.html)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", page.html),
    }
    Ok(())
}

async fn crawl(args: CrawlArgs) -> Result<()> {
    let config = CrawlerConfig {
        verbose: args.verbose,
        proxy: args.proxy,
        timeout: Duration::from_secs(args.timeout_secs),
        max_concurrency: args.concurrency,
        mode: args
            .scripted_clicks
            .map_or(FetchMode::Static, |activations| FetchMode::Scripted { activations }),
        ..CrawlerConfig::default()
    };

    let report = crawl_and_save(args.urls, &args.output, config).await?;
    info!(
        "event=crawl_cli module=cli status=ok urls={} headlines={}",
        report.len(),
        report.headline_count()
    );
    println!("{}", success_line(&args.output));
    Ok(())
}

fn success_line(output: &Path) -> String {
    format!("Successfully crawled data saved to {}", output.display())
}
