//! Site-Scout main entry point
//!
//! This is the command-line interface for the Site-Scout site crawler.

use anyhow::Context;
use clap::Parser;
use site_scout::config::{load_config_with_hash, validate, Config, RunConfig};
use site_scout::crawler::{crawl_site, HttpAnalyzer, PageAnalyzer};
use site_scout::output::{
    format_page_report, print_site_report, print_statistics, write_markdown_summary,
    CrawlStatistics,
};
use site_scout::url::{ensure_scheme, is_site_root};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Scout: a polite single-site crawler
///
/// Given a site root, Site-Scout crawls same-host pages within depth, page
/// and time budgets while respecting robots.txt. Given any other URL it
/// analyzes just that page.
#[derive(Parser, Debug)]
#[command(name = "site-scout")]
#[command(version)]
#[command(about = "A polite single-site crawler", long_about = None)]
struct Cli {
    /// Site root or page URL (https:// is assumed when no scheme is given)
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum link depth from the seed
    #[arg(long)]
    max_depth: Option<u32>,

    /// Maximum number of pages to visit
    #[arg(long)]
    max_pages: Option<usize>,

    /// Number of concurrent workers
    #[arg(long)]
    concurrency: Option<usize>,

    /// Wall-clock budget for the whole crawl, in seconds
    #[arg(long)]
    time_budget_secs: Option<u64>,

    /// Write a markdown summary of the crawl to this file
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (cfg, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, Some(hash))
        }
        None => (Config::default(), None),
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid settings")?;
    let run = RunConfig::from(&config);

    let target = ensure_scheme(&cli.url);
    if is_site_root(&target) {
        handle_crawl(&target, run, config_hash.as_deref(), cli.summary.as_deref()).await
    } else {
        handle_single_page(&target, &run).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_scout=info,warn"),
            1 => EnvFilter::new("site_scout=debug,info"),
            2 => EnvFilter::new("site_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line overrides on top of the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(depth) = cli.max_depth {
        config.crawler.max_depth = depth;
    }
    if let Some(pages) = cli.max_pages {
        config.crawler.max_pages = pages;
    }
    if let Some(workers) = cli.concurrency {
        config.crawler.concurrency = workers;
    }
    if let Some(secs) = cli.time_budget_secs {
        config.crawler.time_budget_ms = secs.saturating_mul(1000);
    }
}

/// Crawls a whole site and prints the results
async fn handle_crawl(
    seed: &str,
    run: RunConfig,
    config_hash: Option<&str>,
    summary_path: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let report = crawl_site(seed, run)
        .await
        .with_context(|| format!("Crawl of {} failed", seed))?;

    print_site_report(&report);
    print_statistics(&CrawlStatistics::from_report(&report));

    if let Some(path) = summary_path {
        write_markdown_summary(&report, config_hash, path)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        println!("\n✓ Summary exported to: {}", path.display());
    }

    Ok(())
}

/// Analyzes one page without crawling
async fn handle_single_page(url: &str, run: &RunConfig) -> anyhow::Result<()> {
    tracing::info!("Analyzing single page {}", url);

    let analyzer = HttpAnalyzer::new(&run.user_agent)?;
    let page = analyzer
        .analyze(url)
        .await
        .with_context(|| format!("Failed to analyze {}", url))?;

    println!("{}", format_page_report(&page));
    Ok(())
}
