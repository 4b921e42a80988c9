//! access-log-export main entry point
//!
//! This is the command-line interface for the access-log exporter.

use access_log_export::config::{load_config_with_hash, Config};
use access_log_export::crawler::{export, MonthlyWindows};
use access_log_export::output::print_summary;
use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// access-log-export: bulk exporter for paginated access-log APIs
///
/// Walks the access-log history month by month from the configured start date,
/// drains every page of every month under a per-minute request budget, removes
/// duplicate sightings, and writes one CSV file per year or month.
#[derive(Parser, Debug)]
#[command(name = "access-log-export")]
#[command(version)]
#[command(about = "Bulk exporter for paginated access-log APIs", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// API bearer token; overrides `api.token` from the config file
    #[arg(long, env = "ACCESS_LOG_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Validate config and show the window plan without calling the API
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(token) = cli.token.filter(|t| !t.trim().is_empty()) {
        config.api.token = Some(token);
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_export(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("access_log_export=info,warn"),
            1 => EnvFilter::new("access_log_export=debug,info"),
            2 => EnvFilter::new("access_log_export=trace,debug"),
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

/// Handles the --dry-run mode: shows settings and the windows that would be walked
fn handle_dry_run(config: &Config) {
    let now = Utc::now();
    let windows: Vec<_> = MonthlyWindows::new(config.crawl.start_date, now).collect();

    println!("=== access-log-export Dry Run ===\n");

    println!("API:");
    println!("  Endpoint: {}", config.api.base_url);
    println!("  Page size: {}", config.api.page_size);
    println!("  Timeout: {}s", config.api.timeout_secs);
    println!(
        "  Token: {}",
        if config.api.token.is_some() {
            "configured"
        } else {
            "MISSING"
        }
    );

    println!("\nCrawl:");
    println!("  Start date: {}", config.crawl.start_date);
    println!("  Requests per minute: {}", config.crawl.requests_per_minute);
    println!("  Max pages per window: {}", config.crawl.max_pages_per_window);
    println!(
        "  Retries: {} (base delay {}ms)",
        config.crawl.max_retries, config.crawl.retry_base_delay_ms
    );
    println!("  Dedup policy: {:?}", config.crawl.dedup_policy);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  File prefix: {}", config.output.file_prefix);
    println!("  Partition: {:?}", config.output.partition);
    println!("  Columns: {}", config.output.columns.header().join(", "));

    println!("\nWindows ({}):", windows.len());
    for window in &windows {
        println!("  - {} (before={})", window, window.before_epoch(now));
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would issue at least {} API call(s)",
        windows.len()
    );
}

/// Handles the main export operation
async fn handle_export(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Starting export from {} into {}",
        config.crawl.start_date,
        config.output.directory
    );

    match export(config).await {
        Ok(summary) => {
            tracing::info!("Export completed successfully");
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            Err(e.into())
        }
    }
}
