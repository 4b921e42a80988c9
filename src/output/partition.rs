//! Grouping of deduplicated records into calendar partitions

use crate::record::LogRecord;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Calendar unit each output artifact covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionGranularity {
    /// One partition per calendar year, labelled `YYYY`
    #[default]
    Year,
    /// One partition per calendar month, labelled `YYYY-MM`
    Month,
}

impl PartitionGranularity {
    /// Label for a UTC timestamp under this granularity
    pub fn label_for(&self, time: DateTime<Utc>) -> String {
        match self {
            Self::Year => time.format("%Y").to_string(),
            Self::Month => time.format("%Y-%m").to_string(),
        }
    }
}

/// Records sharing one partition label, sorted by reference timestamp then subject
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub label: String,
    pub records: Vec<LogRecord>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Buckets records by a label derived from their reference timestamp
#[derive(Debug, Clone, Copy, Default)]
pub struct Partitioner {
    granularity: PartitionGranularity,
}

impl Partitioner {
    pub fn new(granularity: PartitionGranularity) -> Self {
        Self { granularity }
    }

    pub fn granularity(&self) -> PartitionGranularity {
        self.granularity
    }

    /// Label of the partition `record` belongs to
    pub fn label_of(&self, record: &LogRecord) -> String {
        // Converted records always carry an in-range timestamp.
        let time = record.reference_time().unwrap_or(DateTime::UNIX_EPOCH);
        self.granularity.label_for(time)
    }

    /// Groups every record into exactly one partition, ordered by label
    pub fn partition(&self, records: impl IntoIterator<Item = LogRecord>) -> Vec<Partition> {
        let mut buckets: BTreeMap<String, Vec<LogRecord>> = BTreeMap::new();

        for record in records {
            buckets
                .entry(self.label_of(&record))
                .or_default()
                .push(record);
        }

        buckets
            .into_iter()
            .map(|(label, mut records)| {
                records.sort_by(|a, b| {
                    a.reference_timestamp()
                        .cmp(&b.reference_timestamp())
                        .then_with(|| a.subject().cmp(b.subject()))
                });
                Partition { label, records }
            })
            .collect()
    }
}
