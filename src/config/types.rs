use crate::crawler::DedupPolicy;
use crate::output::{ColumnSchema, PartitionGranularity};
use chrono::NaiveDate;
use serde::Deserialize;

/// Main configuration structure for an export run
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Upstream API connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Full URL of the access-log endpoint
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Bearer token; may instead be supplied on the command line or environment
    #[serde(default)]
    pub token: Option<String>,

    /// Number of records requested per page (`count` query parameter)
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// First month boundary of the export (midnight UTC)
    #[serde(rename = "start-date")]
    pub start_date: NaiveDate,

    /// Maximum API calls allowed to begin within one minute
    #[serde(rename = "requests-per-minute", default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Hard cap on pages fetched for a single window
    #[serde(rename = "max-pages-per-window", default = "default_max_pages")]
    pub max_pages_per_window: u32,

    /// Retries for transport errors, 5xx and 429 responses
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay for exponential retry backoff (milliseconds)
    #[serde(rename = "retry-base-delay-ms", default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Which record survives when two share a dedup key
    #[serde(rename = "dedup-policy", default)]
    pub dedup_policy: DedupPolicy,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the partition files are written to
    #[serde(default = "default_directory")]
    pub directory: String,

    /// File name prefix; files are named `<prefix>_<label>.csv`
    #[serde(rename = "file-prefix", default = "default_file_prefix")]
    pub file_prefix: String,

    /// Partition granularity (one file per year or per month)
    #[serde(default)]
    pub partition: PartitionGranularity,

    /// Column schema of the written files
    #[serde(default)]
    pub columns: ColumnSchema,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            file_prefix: default_file_prefix(),
            partition: PartitionGranularity::default(),
            columns: ColumnSchema::default(),
        }
    }
}

fn default_page_size() -> u32 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_requests_per_minute() -> u32 {
    20
}

fn default_max_pages() -> u32 {
    50
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_directory() -> String {
    ".".to_string()
}

fn default_file_prefix() -> String {
    "access_logs".to_string()
}
