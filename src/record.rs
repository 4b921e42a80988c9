//! Access-log records as returned by the upstream API
//!
//! `RawLogin` mirrors one entry of the `logins` array exactly as it arrives on the wire;
//! every field is optional because the API omits or nulls them freely. `LogRecord` is the
//! validated form the rest of the crate works with: it is guaranteed to carry an identity
//! and at least one timestamp.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One login entry exactly as the API returns it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLogin {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub date_first: Option<i64>,
    #[serde(default)]
    pub date_last: Option<i64>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub isp: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

/// A single access event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub user_id: Option<String>,
    pub username: Option<String>,
    /// First time this login was seen (epoch seconds)
    pub date_first: Option<i64>,
    /// Last time this login was seen (epoch seconds)
    pub date_last: Option<i64>,
    pub count: Option<u64>,
    pub ip: String,
    pub user_agent: String,
    pub isp: String,
    pub country: Option<String>,
    pub region: Option<String>,
}

/// Composite identity used to collapse repeated sightings of one login event
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey {
    pub subject: String,
    pub timestamp: i64,
}

impl LogRecord {
    /// Identity of the user behind this record: the username, or the user ID when the
    /// API did not send a username
    pub fn subject(&self) -> &str {
        non_empty(&self.username)
            .or_else(|| non_empty(&self.user_id))
            .unwrap_or_default()
    }

    /// Timestamp the record is keyed, partitioned and sorted by: `date_last`, falling
    /// back to `date_first`
    pub fn reference_timestamp(&self) -> i64 {
        self.date_last.or(self.date_first).unwrap_or_default()
    }

    /// Reference timestamp as a UTC datetime
    pub fn reference_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.reference_timestamp(), 0)
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            subject: self.subject().to_string(),
            timestamp: self.reference_timestamp(),
        }
    }
}

impl TryFrom<RawLogin> for LogRecord {
    type Error = String;

    fn try_from(raw: RawLogin) -> Result<Self, Self::Error> {
        if non_empty(&raw.username).is_none() && non_empty(&raw.user_id).is_none() {
            return Err("login entry has neither username nor user_id".to_string());
        }

        if raw.date_last.is_none() && raw.date_first.is_none() {
            return Err(format!(
                "login entry for '{}' has neither date_last nor date_first",
                non_empty(&raw.username)
                    .or_else(|| non_empty(&raw.user_id))
                    .unwrap_or_default()
            ));
        }

        for (field, value) in [("date_first", raw.date_first), ("date_last", raw.date_last)] {
            if let Some(ts) = value {
                if DateTime::from_timestamp(ts, 0).is_none() {
                    return Err(format!(
                        "login entry for '{}' has out-of-range {} {}",
                        non_empty(&raw.username)
                            .or_else(|| non_empty(&raw.user_id))
                            .unwrap_or_default(),
                        field,
                        ts
                    ));
                }
            }
        }

        Ok(Self {
            user_id: raw.user_id,
            username: raw.username,
            date_first: raw.date_first,
            date_last: raw.date_last,
            count: raw.count,
            ip: raw.ip.unwrap_or_default(),
            user_agent: raw.user_agent.unwrap_or_default(),
            isp: raw.isp.unwrap_or_default(),
            country: raw.country,
            region: raw.region,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
