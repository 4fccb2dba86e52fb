//! ThreatCrawler command-line entry point
//!
//! Parses flags or a JSON configuration object, starts the crawl engine,
//! and forwards emitted records to standard output, one JSON object per
//! line (or a single batch envelope with `--batch`). Diagnostics go to
//! standard error so the record stream stays clean.
//!
//! Exit codes: 0 on clean completion, 1 on configuration error, 2 when the
//! shutdown safety valve fires.

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use threat_crawler::config::{self, CrawlConfig};
use threat_crawler::crawler::{CrawlEngine, InactivityWatchdog, DEFAULT_IDLE_TIMEOUT};
use threat_crawler::output::{write_output, write_record, CrawlOutput};
use threat_crawler::{ConfigResult, Result};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Hard ceiling on total crawl time
const GLOBAL_DEADLINE: Duration = Duration::from_secs(300);

/// ThreatCrawler: a bounded concurrent web crawler
///
/// Crawls from a seed URL up to the configured depth and page limits and
/// emits one JSON record per fetched page on standard output.
#[derive(Parser, Debug)]
#[command(name = "threat-crawler")]
#[command(version = "3.0.0")]
#[command(about = "A bounded concurrent web crawler", long_about = None)]
struct Cli {
    /// Starting URL to crawl (required unless --config is given)
    #[arg(long)]
    start_url: Option<String>,

    /// Maximum crawl depth; 0 fetches the seed only
    #[arg(long, default_value_t = 3)]
    max_depth: usize,

    /// Maximum number of pages to crawl
    #[arg(long, default_value_t = 100)]
    max_pages: usize,

    /// Request timeout as a duration literal (e.g. 30s)
    #[arg(long, default_value = config::DEFAULT_TIMEOUT)]
    timeout: String,

    /// User agent string
    #[arg(long, default_value = config::DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Number of concurrent workers
    #[arg(long, default_value_t = 10)]
    workers: usize,

    /// Honor robots.txt (accepted, currently not enforced)
    #[arg(long)]
    respect_robots: bool,

    /// Read a JSON configuration object from a file, or from stdin with "-"
    #[arg(long, value_name = "PATH", conflicts_with = "start_url")]
    config: Option<PathBuf>,

    /// Collect all records into a single result envelope instead of streaming
    #[arg(long)]
    batch: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        target_url = %config.target_url,
        max_depth = config.max_depth,
        max_pages = config.max_pages,
        workers = config.workers,
        "starting crawl"
    );

    if let Err(e) = run(config, cli.batch).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Sets up the tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries only the record stream.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("threat_crawler=info,warn"),
            1 => EnvFilter::new("threat_crawler=debug,info"),
            2 => EnvFilter::new("threat_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Builds the crawl configuration from flags or the JSON config mode
fn build_config(cli: &Cli) -> ConfigResult<CrawlConfig> {
    match &cli.config {
        Some(path) if path.as_os_str() == "-" => config::read_config(std::io::stdin().lock()),
        Some(path) => config::load_config(path),
        None => {
            let config = CrawlConfig {
                target_url: cli.start_url.clone().unwrap_or_default(),
                max_depth: cli.max_depth,
                max_pages: cli.max_pages,
                timeout: cli.timeout.clone(),
                workers: cli.workers,
                user_agent: cli.user_agent.clone(),
                respect_robots: cli.respect_robots,
            };
            config::validate(&config)?;
            Ok(config)
        }
    }
}

/// Runs the crawl and forwards records to stdout
async fn run(config: CrawlConfig, batch: bool) -> Result<()> {
    let cancel = CancellationToken::new();
    install_cancellation_sources(&cancel);

    let watchdog = InactivityWatchdog::new();
    watchdog.spawn(cancel.clone(), DEFAULT_IDLE_TIMEOUT);

    let engine = CrawlEngine::new(config.clone())?;
    let (record_tx, record_rx) = kanal::bounded_async(config.workers);

    let started = Instant::now();
    engine.spawn_stream(cancel.clone(), record_tx);

    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    let mut emitted = 0usize;

    if batch {
        let mut results = Vec::new();
        while let Ok(record) = record_rx.recv().await {
            watchdog.touch().await;
            results.push(record);
        }
        emitted = results.len();
        let output = CrawlOutput::new(config, results, started.elapsed());
        write_output(&mut writer, &output)?;
    } else {
        while let Ok(record) = record_rx.recv().await {
            watchdog.touch().await;
            write_record(&mut writer, &record)?;
            emitted += 1;
        }
    }
    writer.flush()?;

    tracing::info!(
        emitted,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "crawl finished"
    );
    Ok(())
}

/// Installs the global deadline and interrupt-signal cancellation sources
///
/// The inactivity watchdog is the third source, wired up in [`run`].
fn install_cancellation_sources(cancel: &CancellationToken) {
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(GLOBAL_DEADLINE).await;
            tracing::info!("global deadline reached, cancelling crawl");
            cancel.cancel();
        });
    }

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, shutting down");
                cancel.cancel();
            }
        });
    }
}
