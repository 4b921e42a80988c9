//! Configuration module for the exporter
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use access_log_export::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("export.toml")).unwrap();
//! println!("Exporting from {}", config.crawl.start_date);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ApiConfig, Config, CrawlConfig, OutputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
