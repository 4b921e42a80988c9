//! access-log-export: bulk exporter for paginated access-log APIs
//!
//! This crate walks a historical time range in monthly windows, drains every page of
//! each window through a rate-limited HTTP fetcher, collapses repeated sightings of the
//! same login event, and writes one CSV file per calendar partition.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod state;

use thiserror::Error;

/// Main error type for export operations
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch failed for window {window}, page {page}: {source}")]
    Fetch {
        window: String,
        page: u32,
        #[source]
        source: FetchError,
    },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("No API token configured (set api.token, --token or ACCESS_LOG_TOKEN)")]
    MissingToken,
}

impl ExportError {
    /// Returns the underlying fetch error, if this error came from the upstream API
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match self {
            Self::Fetch { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors produced by a single page request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Network or connection failure before a response was read
    #[error("Transport error: {0}")]
    Transport(String),

    /// Upstream reported failure (`ok: false`) or returned a non-200 status
    #[error("API error{}: {message}", status_suffix(.status))]
    Api {
        status: Option<u16>,
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl FetchError {
    /// Returns true for failures worth retrying: transport errors, 5xx and 429
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api {
                status: Some(code), ..
            } => *code == 429 || (500..600).contains(code),
            Self::Api { status: None, .. } | Self::Parse(_) => false,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use record::{DedupKey, LogRecord};
pub use state::CrawlPhase;
