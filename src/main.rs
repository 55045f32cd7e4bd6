//! Link-Tally main entry point
//!
//! This is the command-line interface for the Link-Tally same-host crawler.

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use link_tally::config::{load_config, validate, Config};
use link_tally::crawler::Coordinator;
use link_tally::output::{build_report, print_report};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Link-Tally: count internal links across a site
///
/// Link-Tally crawls every page reachable from URL on URL's own host and
/// reports how many times each page is linked from the others.
#[derive(Parser, Debug)]
#[command(name = "link-tally")]
#[command(version)]
#[command(about = "Count internal links across a site", long_about = None)]
struct Cli {
    /// Seed URL; its host bounds the crawl
    #[arg(value_name = "URL")]
    url: String,

    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Crawl budget: pages are counted without limit, but at most N-1 are
    /// fetched (the page that brings the distinct count to N is not)
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error log output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            // Usage errors go to stdout with exit code 1
            println!("{}", e.render());
            return ExitCode::from(1);
        }
    };

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_tally=info,warn"),
            1 => EnvFilter::new("link_tally=debug,info"),
            2 => EnvFilter::new("link_tally=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration, runs the crawl and prints the report
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = build_config(&cli)?;

    println!("starting crawl of {}", cli.url);

    let coordinator = Coordinator::new(config, &cli.url, &cli.url)
        .with_context(|| format!("cannot crawl {}", cli.url))?;

    let shutdown = coordinator.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.trigger();
        }
    });

    let result = coordinator.run().await.context("crawl failed")?;

    print_report(&build_report(&result.pages));

    Ok(())
}

/// Builds the effective configuration from the optional file and CLI flags
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = Some(max_pages);
        validate(&config).context("invalid --max-pages")?;
    }

    Ok(config)
}
