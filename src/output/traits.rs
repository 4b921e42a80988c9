//! Exporter trait and output errors
//!
//! An exporter receives finished partitions one at a time and persists them. The
//! coordinator only calls it after every window has been walked, so an aborted run
//! never reaches an exporter.

use crate::output::partition::Partition;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Persists one partition of deduplicated records
pub trait Exporter {
    fn export_partition(&mut self, partition: &Partition) -> OutputResult<()>;
}

/// Keeps exported partitions in memory; used for previews and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryExporter {
    partitions: Vec<Partition>,
}

impl MemoryExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn into_partitions(self) -> Vec<Partition> {
        self.partitions
    }
}

impl Exporter for MemoryExporter {
    fn export_partition(&mut self, partition: &Partition) -> OutputResult<()> {
        self.partitions.push(partition.clone());
        Ok(())
    }
}

impl<E: Exporter + ?Sized> Exporter for &mut E {
    fn export_partition(&mut self, partition: &Partition) -> OutputResult<()> {
        (**self).export_partition(partition)
    }
}
