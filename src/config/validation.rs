use crate::config::types::{ApiConfig, Config, CrawlConfig, OutputConfig};
use crate::ConfigError;
use chrono::Utc;
use url::Url;

/// Largest page the upstream API will serve
const MAX_PAGE_SIZE: u32 = 1000;

/// Upper bound on retries so a dead endpoint cannot stall a run for hours
const MAX_RETRIES: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_crawl_config(&config.crawl)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates upstream API settings
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.page_size < 1 || config.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, config.page_size
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if let Some(token) = &config.token {
        if token.trim().is_empty() {
            return Err(ConfigError::Validation(
                "token cannot be blank; omit it to supply one at runtime".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates crawl settings
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    let today = Utc::now().date_naive();
    if config.start_date > today {
        return Err(ConfigError::Validation(format!(
            "start_date {} is in the future",
            config.start_date
        )));
    }

    if config.requests_per_minute < 1 {
        return Err(ConfigError::Validation(format!(
            "requests_per_minute must be >= 1, got {}",
            config.requests_per_minute
        )));
    }

    if config.max_pages_per_window < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages_per_window must be >= 1, got {}",
            config.max_pages_per_window
        )));
    }

    if config.max_retries > MAX_RETRIES {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= {}, got {}",
            MAX_RETRIES, config.max_retries
        )));
    }

    Ok(())
}

/// Validates output settings
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "directory cannot be empty".to_string(),
        ));
    }

    validate_file_prefix(&config.file_prefix)
}

/// File prefixes end up in file names, so keep them to a portable character set
fn validate_file_prefix(prefix: &str) -> Result<(), ConfigError> {
    if prefix.is_empty() {
        return Err(ConfigError::Validation(
            "file_prefix cannot be empty".to_string(),
        ));
    }

    if !prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "file_prefix must contain only alphanumeric characters, '-' and '_', got '{}'",
            prefix
        )));
    }

    Ok(())
}
