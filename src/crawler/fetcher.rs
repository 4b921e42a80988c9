//! HTTP page fetcher implementation
//!
//! This module handles all requests to the upstream access-log API:
//! - Building the HTTP client with timeouts and a stable user agent
//! - Acquiring a rate-limit slot before every attempt
//! - Classifying failures into transport, API and parse errors
//! - Bounded retry with exponential backoff, floored by the server's `Retry-After`

use crate::config::ApiConfig;
use crate::crawler::rate_limiter::RateLimiter;
use crate::record::{LogRecord, RawLogin};
use crate::FetchError;
use chrono::{DateTime, Utc};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Longest single backoff between retries
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// One parsed page of results
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub records: Vec<LogRecord>,
    /// Page number the API reported serving
    pub page: u32,
    /// Total pages the API reported for this query
    pub total_pages: u32,
    /// True when `page < total_pages`
    pub has_more: bool,
}

/// Source of access-log pages
///
/// `before` is the exclusive upper bound in epoch seconds and `page` is 1-based.
pub trait PageFetcher {
    fn fetch_page(
        &self,
        before: i64,
        page: u32,
    ) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// Response envelope of the access-log endpoint
#[derive(Debug, Deserialize)]
struct AccessLogResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    logins: Vec<RawLogin>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default)]
    page: Option<u32>,
    pages: u32,
}

/// Parses one response body into a page of records
///
/// # Errors
///
/// * `FetchError::Parse` - body is not JSON of the expected shape, `paging` is missing
///   from a successful response, or a login lacks an identity or timestamp
/// * `FetchError::Api` - the response carries `ok: false`
pub fn parse_page(body: &str, requested_page: u32) -> Result<FetchedPage, FetchError> {
    let response: AccessLogResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    if !response.ok {
        return Err(FetchError::Api {
            status: None,
            message: response
                .error
                .unwrap_or_else(|| "unknown_error".to_string()),
        });
    }

    let paging = response
        .paging
        .ok_or_else(|| FetchError::Parse("response is missing paging metadata".to_string()))?;

    let records = response
        .logins
        .into_iter()
        .map(LogRecord::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(FetchError::Parse)?;

    let page = paging.page.unwrap_or(requested_page);

    Ok(FetchedPage {
        records,
        page,
        total_pages: paging.pages,
        has_more: page < paging.pages,
    })
}

/// Builds an HTTP client for the upstream API
///
/// # Example
///
/// ```no_run
/// use access_log_export::config::ApiConfig;
/// use access_log_export::crawler::build_http_client;
///
/// let config = ApiConfig {
///     base_url: "https://slack.com/api/team.accessLogs".to_string(),
///     token: None,
///     page_size: 1000,
///     timeout_secs: 30,
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retry settings for retryable fetch failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// No retries: every failure is returned on first sight
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Backoff before retry number `attempt + 1`: `base * 2^attempt`, capped
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

/// Fetches pages from the access-log endpoint over HTTP
pub struct HttpPageFetcher {
    client: Client,
    base_url: String,
    token: String,
    page_size: u32,
    rate_limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl HttpPageFetcher {
    pub fn new(
        client: Client,
        config: &ApiConfig,
        token: impl Into<String>,
        rate_limiter: Arc<RateLimiter>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            token: token.into(),
            page_size: config.page_size,
            rate_limiter,
            retry,
        }
    }

    /// Performs one rate-limited request without retrying
    ///
    /// A failed response's `Retry-After` wait is returned alongside the error.
    async fn fetch_once(
        &self,
        before: i64,
        page: u32,
    ) -> Result<FetchedPage, (FetchError, Option<Duration>)> {
        self.rate_limiter.acquire().await;

        tracing::debug!("GET {} before={} page={}", self.base_url, before, page);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("before", before.to_string()),
                ("count", self.page_size.to_string()),
                ("page", page.to_string()),
            ])
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| (FetchError::Transport(describe_transport_error(&e)), None))?;

        let status = response.status();
        if status != StatusCode::OK {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| parse_retry_after(value, Utc::now()));
            let body = response.text().await.unwrap_or_default();
            let error = FetchError::Api {
                status: Some(status.as_u16()),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    truncate(&body, 200)
                },
            };
            return Err((error, retry_after));
        }

        let body = response
            .text()
            .await
            .map_err(|e| (FetchError::Transport(describe_transport_error(&e)), None))?;

        parse_page(&body, page).map_err(|e| (e, None))
    }
}

impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, before: i64, page: u32) -> Result<FetchedPage, FetchError> {
        let mut attempt = 0;

        loop {
            match self.fetch_once(before, page).await {
                Ok(fetched) => return Ok(fetched),
                Err((e, retry_after)) if e.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self
                        .retry
                        .backoff(attempt)
                        .max(retry_after.unwrap_or_default());
                    attempt += 1;
                    tracing::warn!(
                        "Retryable failure for before={} page={} (attempt {}/{}): {}; retrying in {:?}",
                        before,
                        page,
                        attempt,
                        self.retry.max_retries,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err((e, _)) => return Err(e),
            }
        }
    }
}

/// Parses a `Retry-After` value: delta-seconds or an HTTP-date relative to `now`
///
/// A date in the past yields a zero wait.
fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
