//! Run statistics for a finished export
//!
//! The coordinator fills in an `ExportSummary` as it walks windows and exports
//! partitions; the binary prints it once the run succeeds.

use std::time::Duration;

/// Summary of one successful export run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportSummary {
    /// Number of time windows walked
    pub windows_walked: u32,

    /// Total API pages fetched across all windows
    pub pages_fetched: u64,

    /// Records received from the API, duplicates included
    pub records_fetched: u64,

    /// Records left after deduplication
    pub unique_records: u64,

    /// Records collapsed onto an existing dedup key
    pub duplicates_collapsed: u64,

    /// Windows that hit the page cap before the API ran out of pages
    pub truncated_windows: Vec<String>,

    /// `(label, record count)` for each exported partition, in export order
    pub partitions: Vec<(String, usize)>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl ExportSummary {
    /// True when at least one window was cut short by the page cap
    pub fn is_truncated(&self) -> bool {
        !self.truncated_windows.is_empty()
    }

    /// Records written across all partitions
    pub fn records_exported(&self) -> usize {
        self.partitions.iter().map(|(_, count)| count).sum()
    }
}

/// Prints an export summary to stdout
///
/// # Arguments
///
/// * `summary` - The summary to print
pub fn print_summary(summary: &ExportSummary) {
    println!("=== Export Summary ===\n");

    println!("Crawl:");
    println!("  Windows walked: {}", summary.windows_walked);
    println!("  Pages fetched: {}", summary.pages_fetched);
    println!("  Elapsed: {:.1}s", summary.elapsed.as_secs_f64());

    println!("\nRecords:");
    println!("  Fetched: {}", summary.records_fetched);
    println!("  Unique: {}", summary.unique_records);
    println!("  Duplicates collapsed: {}", summary.duplicates_collapsed);

    println!("\nPartitions ({}):", summary.partitions.len());
    for (label, count) in &summary.partitions {
        println!("  {:<10} {:>8} records", label, count);
    }

    if summary.is_truncated() {
        println!(
            "\n⚠ {} window(s) stopped at the page cap; their remaining pages were not fetched:",
            summary.truncated_windows.len()
        );
        for window in &summary.truncated_windows {
            println!("  - {}", window);
        }
    }
}
