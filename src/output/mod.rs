//! Output module for partitioning and persisting export results
//!
//! This module handles:
//! - Grouping deduplicated records into yearly or monthly partitions
//! - Writing each partition through an `Exporter` (CSV on disk by default)
//! - Reporting run statistics

mod csv;
mod partition;
pub mod stats;
mod traits;

pub use self::csv::{ColumnSchema, CsvExporter};
pub use partition::{Partition, PartitionGranularity, Partitioner};
pub use stats::{print_summary, ExportSummary};
pub use traits::{Exporter, MemoryExporter, OutputError, OutputResult};
