//! Bookcase main entry point
//!
//! This is the command-line interface for the Bookcase star-graph crawler.

use anyhow::Context;
use bookcase::config::{load_config_with_hash, Config};
use bookcase::crawler::{run_crawl, Coordinator, HttpFetcher, Progress};
use bookcase::output::{load_statistics, print_statistics, write_markdown_report};
use bookcase::storage::{open_storage, CatalogStore};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Bookcase: a star-graph book crawler
///
/// Bookcase starts from a root author, follows the books each author has
/// starred to find more authors, and collects every author's own books into a
/// catalog ranked in a markdown report.
#[derive(Parser, Debug)]
#[command(name = "bookcase")]
#[command(version)]
#[command(about = "A star-graph book crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start a fresh crawl, ignoring the stored catalog
    #[arg(long)]
    fresh: bool,

    /// Validate config and show the starting frontier without crawling
    #[arg(long, conflicts_with_all = ["stats", "export_report"])]
    dry_run: bool,

    /// Show statistics from the stored catalog and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_report"])]
    stats: bool,

    /// Render the markdown report from the stored catalog and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_report: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(config, cli.fresh)?;
    } else if cli.stats {
        handle_stats(&config);
    } else if cli.export_report {
        handle_export_report(&config)?;
    } else {
        handle_crawl(config, cli.fresh, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bookcase=info,warn"),
            1 => EnvFilter::new("bookcase=debug,info"),
            2 => EnvFilter::new("bookcase=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the starting frontier
fn handle_dry_run(config: Config, fresh: bool) -> anyhow::Result<()> {
    println!("=== Bookcase Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Root author: {}", config.crawler.root_author);
    println!("  Workers: {}", config.crawler.workers);
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );
    match config.crawler.max_requeues {
        Some(max) => println!("  Max re-queues per author: {}", max),
        None => println!("  Max re-queues per author: unbounded"),
    }

    println!("\nSource:");
    println!("  Base URL: {}", config.source.base_url);
    println!("  Profile URL: {}", config.source.profile_url);

    println!("\nOutput:");
    println!("  Catalog: {}", config.output.catalog_path.display());
    println!("  Authors: {}", config.output.authors_path.display());
    println!("  Error log: {}", config.output.error_log_path.display());
    println!("  Report: {}", config.output.report_path.display());
    println!("  Sort key: {}", config.output.sort_key);

    let fetcher = HttpFetcher::new(&config.source, config.crawler.request_timeout())
        .context("failed to build HTTP client")?;
    let store = open_storage(&config.output.catalog_path, &config.output.authors_path);
    let seed = Coordinator::new(
        config,
        Arc::new(fetcher),
        Arc::new(store),
        Arc::new(Progress::hidden()),
    )
    .fresh(fresh)
    .planned_seed();

    println!("\nStarting Frontier ({}):", seed.len());
    for author in &seed {
        println!("  - {}", author);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling from {} authors", seed.len());

    Ok(())
}

/// Handles the --stats mode: shows statistics from the stored catalog
fn handle_stats(config: &Config) {
    println!("Catalog: {}\n", config.output.catalog_path.display());

    let store = open_storage(&config.output.catalog_path, &config.output.authors_path);
    let stats = load_statistics(&store, config.output.sort_key);

    print_statistics(&stats);
}

/// Handles the --export-report mode: renders the markdown report
fn handle_export_report(config: &Config) -> anyhow::Result<()> {
    println!("=== Exporting Report ===\n");
    println!("Catalog: {}", config.output.catalog_path.display());
    println!("Output: {}", config.output.report_path.display());
    println!();

    let store = open_storage(&config.output.catalog_path, &config.output.authors_path);

    tracing::info!("Loading catalog...");
    let catalog = store.load_catalog_or_empty();

    write_markdown_report(
        &catalog,
        config.output.sort_key,
        &config.source.profile_url,
        &config.output.report_path,
    )?;

    println!(
        "✓ Report exported to: {}",
        config.output.report_path.display()
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool, quiet: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring stored catalog)");
    } else {
        tracing::info!("Starting crawl (resuming from stored catalog)");
    }
    tracing::info!("Root author: {}", config.crawler.root_author);

    let progress = if quiet {
        Progress::hidden()
    } else {
        Progress::new()
    };

    let sort_key = config.output.sort_key;
    let profile_url = config.source.profile_url.clone();
    let report_path = config.output.report_path.clone();

    let report = run_crawl(config, fresh, Arc::new(progress))
        .await
        .context("crawl failed")?;

    if !report.blacklisted.is_empty() {
        tracing::info!("{} authors were rejected by the source", report.blacklisted.len());
    }
    if !report.abandoned.is_empty() {
        tracing::warn!(
            "{} authors were abandoned after repeated failures",
            report.abandoned.len()
        );
    }
    if !report.is_persisted() {
        tracing::error!("Crawl results were not fully saved");
    }

    write_markdown_report(&report.catalog, sort_key, &profile_url, &report_path)?;

    if !report.is_persisted() {
        anyhow::bail!("failed to save crawl results");
    }

    Ok(())
}
