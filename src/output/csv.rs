//! CSV exporter: one file per partition
//!
//! Files are written to `<name>.csv.partial` and renamed into place only after the
//! final flush, so a file carrying its final name is always complete.

use crate::output::partition::Partition;
use crate::output::traits::{Exporter, OutputError, OutputResult};
use crate::record::LogRecord;
use chrono::DateTime;
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Timestamp format used in every date column
const DATE_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";

/// Column layout of the written files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnSchema {
    /// `Username, DateLogin, IP, UserAgent, ISP`
    #[default]
    Basic,
    /// Every field the API can populate
    Extended,
}

impl ColumnSchema {
    /// Header row in column order
    pub fn header(&self) -> &'static [&'static str] {
        match self {
            Self::Basic => &["Username", "DateLogin", "IP", "UserAgent", "ISP"],
            Self::Extended => &[
                "UserID",
                "Username",
                "DateFirst",
                "DateLast",
                "Count",
                "IP",
                "UserAgent",
                "ISP",
                "Country",
                "Region",
            ],
        }
    }
}

/// CSV row for the basic schema
#[derive(Debug, Serialize)]
struct BasicRow<'a> {
    #[serde(rename = "Username")]
    username: &'a str,
    #[serde(rename = "DateLogin")]
    date_login: String,
    #[serde(rename = "IP")]
    ip: &'a str,
    #[serde(rename = "UserAgent")]
    user_agent: &'a str,
    #[serde(rename = "ISP")]
    isp: &'a str,
}

impl<'a> From<&'a LogRecord> for BasicRow<'a> {
    fn from(record: &'a LogRecord) -> Self {
        Self {
            username: record.subject(),
            date_login: format_timestamp(Some(record.reference_timestamp())),
            ip: &record.ip,
            user_agent: &record.user_agent,
            isp: &record.isp,
        }
    }
}

/// CSV row for the extended schema
#[derive(Debug, Serialize)]
struct ExtendedRow<'a> {
    #[serde(rename = "UserID")]
    user_id: &'a str,
    #[serde(rename = "Username")]
    username: &'a str,
    #[serde(rename = "DateFirst")]
    date_first: String,
    #[serde(rename = "DateLast")]
    date_last: String,
    #[serde(rename = "Count")]
    count: Option<u64>,
    #[serde(rename = "IP")]
    ip: &'a str,
    #[serde(rename = "UserAgent")]
    user_agent: &'a str,
    #[serde(rename = "ISP")]
    isp: &'a str,
    #[serde(rename = "Country")]
    country: &'a str,
    #[serde(rename = "Region")]
    region: &'a str,
}

impl<'a> From<&'a LogRecord> for ExtendedRow<'a> {
    fn from(record: &'a LogRecord) -> Self {
        Self {
            user_id: record.user_id.as_deref().unwrap_or_default(),
            username: record.username.as_deref().unwrap_or_default(),
            date_first: format_timestamp(record.date_first),
            date_last: format_timestamp(record.date_last),
            count: record.count,
            ip: &record.ip,
            user_agent: &record.user_agent,
            isp: &record.isp,
            country: record.country.as_deref().unwrap_or_default(),
            region: record.region.as_deref().unwrap_or_default(),
        }
    }
}

/// Formats epoch seconds as UTC; missing or out-of-range values become an empty cell
fn format_timestamp(ts: Option<i64>) -> String {
    ts.and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|time| time.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Writes each partition to `<directory>/<prefix>_<label>.csv`
#[derive(Debug, Clone)]
pub struct CsvExporter {
    directory: PathBuf,
    file_prefix: String,
    columns: ColumnSchema,
    written: Vec<PathBuf>,
}

impl CsvExporter {
    pub fn new(
        directory: impl Into<PathBuf>,
        file_prefix: impl Into<String>,
        columns: ColumnSchema,
    ) -> Self {
        Self {
            directory: directory.into(),
            file_prefix: file_prefix.into(),
            columns,
            written: Vec::new(),
        }
    }

    /// Final path of the file for a partition label
    pub fn path_for(&self, label: &str) -> PathBuf {
        self.directory
            .join(format!("{}_{}.csv", self.file_prefix, label))
    }

    /// Files written so far, in export order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_rows(&self, path: &Path, partition: &Partition) -> OutputResult<()> {
        let file = File::create(path)?;
        let buf_writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file);
        let mut writer = Writer::from_writer(buf_writer);

        // Headers are emitted by the first serialize() call.
        for record in &partition.records {
            match self.columns {
                ColumnSchema::Basic => writer.serialize(BasicRow::from(record))?,
                ColumnSchema::Extended => writer.serialize(ExtendedRow::from(record))?,
            }
        }

        if partition.records.is_empty() {
            writer.write_record(self.columns.header())?;
        }

        writer.flush()?;

        let buf_writer = writer
            .into_inner()
            .map_err(|e| OutputError::Write(format!("Failed to get inner writer: {}", e)))?;
        let file = buf_writer
            .into_inner()
            .map_err(|e| OutputError::Write(format!("Failed to get file handle: {}", e)))?;
        file.sync_all()?;

        Ok(())
    }
}

impl Exporter for CsvExporter {
    fn export_partition(&mut self, partition: &Partition) -> OutputResult<()> {
        std::fs::create_dir_all(&self.directory)?;

        let final_path = self.path_for(&partition.label);
        let partial_path = final_path.with_extension("csv.partial");
        debug!("Writing partition {} to {}", partition.label, partial_path.display());

        if let Err(e) = self.write_rows(&partial_path, partition) {
            let _ = std::fs::remove_file(&partial_path);
            return Err(e);
        }

        std::fs::rename(&partial_path, &final_path)?;

        info!(
            "Wrote {} records to {}",
            partition.len(),
            final_path.display()
        );
        self.written.push(final_path);
        Ok(())
    }
}
