//! Deduplication of records seen across overlapping window fetches
//!
//! Every window asks the API for records *before* its upper bound, so consecutive
//! windows return overlapping history. The index keeps one record per `DedupKey`.

use crate::record::{DedupKey, LogRecord};
use serde::Deserialize;
use std::collections::HashMap;

/// Which record survives when two share a dedup key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupPolicy {
    /// A later sighting replaces the stored record
    #[default]
    LatestWins,
    /// The first sighting is kept; later ones are dropped
    FirstWins,
}

/// Result of ingesting one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The key was new
    Inserted,
    /// The key existed and the stored record was overwritten
    Replaced,
    /// The key existed and the new record was dropped
    Skipped,
}

/// Set of retained records, at most one per `DedupKey`
#[derive(Debug, Clone, Default)]
pub struct DedupIndex {
    policy: DedupPolicy,
    records: HashMap<DedupKey, LogRecord>,
    duplicates: u64,
}

impl DedupIndex {
    pub fn new(policy: DedupPolicy) -> Self {
        Self {
            policy,
            records: HashMap::new(),
            duplicates: 0,
        }
    }

    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    pub fn ingest(&mut self, record: LogRecord) -> IngestOutcome {
        let key = record.dedup_key();

        match self.records.get_mut(&key) {
            None => {
                self.records.insert(key, record);
                IngestOutcome::Inserted
            }
            Some(existing) => {
                self.duplicates += 1;
                match self.policy {
                    DedupPolicy::LatestWins => {
                        *existing = record;
                        IngestOutcome::Replaced
                    }
                    DedupPolicy::FirstWins => IngestOutcome::Skipped,
                }
            }
        }
    }

    /// Ingests every record, returning how many were new keys
    pub fn ingest_all(&mut self, records: impl IntoIterator<Item = LogRecord>) -> usize {
        records
            .into_iter()
            .map(|record| self.ingest(record))
            .filter(|outcome| *outcome == IngestOutcome::Inserted)
            .count()
    }

    /// All retained records, in no particular order
    pub fn all(&self) -> impl Iterator<Item = &LogRecord> {
        self.records.values()
    }

    pub fn get(&self, key: &DedupKey) -> Option<&LogRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of ingested records whose key was already present
    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    pub fn into_records(self) -> Vec<LogRecord> {
        self.records.into_values().collect()
    }
}
