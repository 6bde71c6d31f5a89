//! Linkspider main entry point
//!
//! This is the command-line interface for the Linkspider broken-link crawler.

use anyhow::Context;
use clap::Parser;
use linkspider::config::{load_config, validate, Config};
use linkspider::crawler::Coordinator;
use linkspider::output::{generate_markdown_summary, log_statistics, write_report};
use linkspider::SpiderError;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Linkspider: a site-local broken-link crawler
///
/// Linkspider crawls every page under a base address and prints each link
/// that fails to resolve, with the page and line it was found on, followed
/// by a `TIME <ms>` line.
#[derive(Parser, Debug)]
#[command(name = "linkspider")]
#[command(version = "1.0.0")]
#[command(about = "A site-local broken-link crawler", long_about = None)]
struct Cli {
    /// Address to crawl, e.g. http://example.com/ (read from stdin if omitted)
    #[arg(value_name = "BASE_ADDRESS")]
    base_address: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of concurrent requests (0 = derive from the machine)
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Write a markdown summary of the crawl to this file
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);

            match e.downcast_ref::<SpiderError>() {
                Some(SpiderError::InvalidBaseAddress(_)) => ExitCode::from(1),
                _ => ExitCode::from(2),
            }
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries only the report.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkspider=info,warn"),
            1 => EnvFilter::new("linkspider=debug,info"),
            2 => EnvFilter::new("linkspider=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(concurrency) = cli.concurrency {
        config.crawler.max_concurrency = concurrency;
    }
    if let Some(summary) = &cli.summary {
        config.output.summary_path = Some(summary.display().to_string());
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Reads the base address from stdin, prompting on stderr
fn read_base_address() -> io::Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "Base address: ")?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Handles the main crawl operation
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = build_config(&cli)?;

    let base_address = match &cli.base_address {
        Some(address) => address.clone(),
        None => read_base_address().context("Failed to read base address from stdin")?,
    };

    let coordinator = Coordinator::new(&base_address, config.clone())?;
    let base_address = coordinator.base_address().to_string();

    let report = coordinator.run().await;
    log_statistics(&report.stats);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, &report.invalid_links, report.stats.elapsed_ms())
        .context("Failed to write report")?;

    if let Some(path) = &config.output.summary_path {
        generate_markdown_summary(&base_address, &report, Path::new(path))
            .with_context(|| format!("Failed to write summary to {}", path))?;
    }

    Ok(())
}
