//! Crawler module for walking the access-log API
//!
//! This module contains the core export logic, including:
//! - Monthly window scheduling from the start date up to now
//! - Rate-limited HTTP fetching with bounded retry
//! - Pagination within each window
//! - Deduplication of records seen in more than one window
//! - Overall export coordination

mod coordinator;
mod dedup;
mod fetcher;
mod pagination;
mod rate_limiter;
mod scheduler;

pub use coordinator::Coordinator;
pub use dedup::{DedupIndex, DedupPolicy, IngestOutcome};
pub use fetcher::{
    build_http_client, parse_page, FetchedPage, HttpPageFetcher, PageFetcher, RetryPolicy,
};
pub use pagination::{PaginationWalker, WindowPages};
pub use rate_limiter::RateLimiter;
pub use scheduler::{MonthlyWindows, TimeWindow};

use crate::config::Config;
use crate::output::{CsvExporter, ExportSummary};
use crate::ExportError;
use std::sync::Arc;
use std::time::Duration;

/// Runs a complete export operation
///
/// This is the main entry point for an export. It will:
/// 1. Build the HTTP client and shared rate limiter
/// 2. Walk every monthly window and all of its pages
/// 3. Deduplicate the fetched records
/// 4. Write one CSV file per partition
///
/// # Arguments
///
/// * `config` - The export configuration; `api.token` must be set
///
/// # Returns
///
/// * `Ok(ExportSummary)` - Export completed and every partition was written
/// * `Err(ExportError)` - Export failed; no partition is written after a fetch error
pub async fn export(config: Config) -> Result<ExportSummary, ExportError> {
    let token = config.api.token.clone().ok_or(ExportError::MissingToken)?;

    let client = build_http_client(&config.api)?;
    let rate_limiter = Arc::new(RateLimiter::per_minute(config.crawl.requests_per_minute));
    let retry = RetryPolicy {
        max_retries: config.crawl.max_retries,
        base_delay: Duration::from_millis(config.crawl.retry_base_delay_ms),
    };

    let fetcher = HttpPageFetcher::new(client, &config.api, token, rate_limiter, retry);
    let exporter = CsvExporter::new(
        &config.output.directory,
        config.output.file_prefix.clone(),
        config.output.columns,
    );

    let mut coordinator = Coordinator::new(&config, fetcher, exporter);
    coordinator.run().await
}
