//! Export coordinator - main crawl orchestration logic
//!
//! This module contains the main loop that coordinates an export run:
//! - Scheduling monthly windows from the start date up to now
//! - Draining every window through the pagination walker
//! - Feeding each page's records into the deduplication index
//! - Partitioning the deduplicated set and handing partitions to the exporter
//!
//! Nothing is exported until every window has been walked. A fetch error aborts the
//! run before the exporter is called, so partial results are never written.

use crate::config::{Config, CrawlConfig};
use crate::crawler::dedup::DedupIndex;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::pagination::PaginationWalker;
use crate::crawler::scheduler::MonthlyWindows;
use crate::output::{ExportSummary, Exporter, Partitioner};
use crate::state::{CrawlPhase, CrawlTracker};
use crate::ExportError;
use chrono::{DateTime, Utc};
use std::time::Instant;

/// Main export coordinator structure
pub struct Coordinator<F, E> {
    crawl: CrawlConfig,
    walker: PaginationWalker,
    partitioner: Partitioner,
    fetcher: F,
    exporter: E,
}

impl<F: PageFetcher, E: Exporter> Coordinator<F, E> {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `config` - The export configuration
    /// * `fetcher` - Source of API pages (rate limiting is the fetcher's concern)
    /// * `exporter` - Destination for finished partitions
    pub fn new(config: &Config, fetcher: F, exporter: E) -> Self {
        Self {
            crawl: config.crawl.clone(),
            walker: PaginationWalker::new(config.crawl.max_pages_per_window),
            partitioner: Partitioner::new(config.output.partition),
            fetcher,
            exporter,
        }
    }

    /// Windows this coordinator would walk if run at `now`
    pub fn windows(&self, now: DateTime<Utc>) -> MonthlyWindows {
        MonthlyWindows::new(self.crawl.start_date, now)
    }

    /// Runs a complete export against the current wall-clock time
    pub async fn run(&mut self) -> Result<ExportSummary, ExportError> {
        self.run_until(Utc::now()).await
    }

    /// Runs a complete export covering the range from the start date up to `now`
    pub async fn run_until(&mut self, now: DateTime<Utc>) -> Result<ExportSummary, ExportError> {
        let started = Instant::now();
        let mut summary = ExportSummary::default();

        let index = self.collect(now, &mut summary).await?;
        summary.unique_records = index.len() as u64;
        summary.duplicates_collapsed = index.duplicates();

        let partitions = self.partitioner.partition(index.into_records());
        tracing::info!(
            "Exporting {} unique records in {} partition(s)",
            summary.unique_records,
            partitions.len()
        );

        for partition in &partitions {
            self.exporter.export_partition(partition)?;
            summary
                .partitions
                .push((partition.label.clone(), partition.len()));
        }

        summary.elapsed = started.elapsed();

        if summary.is_truncated() {
            tracing::warn!(
                "Export finished with {} truncated window(s): {}",
                summary.truncated_windows.len(),
                summary.truncated_windows.join(", ")
            );
        }

        tracing::info!(
            "Export completed: {} windows, {} pages, {} unique records in {:?}",
            summary.windows_walked,
            summary.pages_fetched,
            summary.unique_records,
            summary.elapsed
        );

        Ok(summary)
    }

    /// Walks every window and returns the deduplicated records
    ///
    /// Crawl counters are accumulated into `summary` as windows complete.
    pub async fn collect(
        &self,
        now: DateTime<Utc>,
        summary: &mut ExportSummary,
    ) -> Result<DedupIndex, ExportError> {
        let mut tracker = CrawlTracker::new();
        let mut index = DedupIndex::new(self.crawl.dedup_policy);

        for window in self.windows(now) {
            let before = window.before_epoch(now);
            tracing::info!("Fetching logs for window {} (before={})", window, before);

            let pages = self
                .walker
                .walk(&self.fetcher, &window, before, &mut tracker)
                .await?;

            let fetched = pages.records.len();
            let added = index.ingest_all(pages.records);

            tracing::debug!(
                "Window {} done: {} pages, {} records, {} new",
                window,
                pages.pages_fetched,
                fetched,
                added
            );

            summary.windows_walked += 1;
            summary.pages_fetched += u64::from(pages.pages_fetched);
            summary.records_fetched += fetched as u64;
            if pages.truncated {
                summary.truncated_windows.push(window.label());
            }

            tracker.transition(CrawlPhase::AdvanceWindow)?;
        }

        tracker.transition(CrawlPhase::Complete)?;
        Ok(index)
    }

    pub fn exporter(&self) -> &E {
        &self.exporter
    }

    pub fn into_exporter(self) -> E {
        self.exporter
    }
}
