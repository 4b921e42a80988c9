//! Monthly time-window scheduling
//!
//! Boundaries are computed by adding whole calendar months to the start date, always
//! counting from the anchor rather than from the previous boundary. A start on the 31st
//! therefore yields Feb 28/29 followed by Mar 31, never drifting to the 28th for good.

use chrono::{DateTime, Months, NaiveDate, Utc};
use std::fmt;

/// A contiguous calendar-month range bounding one batch of API queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Inclusive window start
    pub start: DateTime<Utc>,
    /// Exclusive window end; `None` for the final window, which runs up to "now"
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Upstream `before` parameter for this window
    pub fn before_epoch(&self, now: DateTime<Utc>) -> i64 {
        self.end.unwrap_or(now).timestamp()
    }

    /// True for the final window, which is still open at `now`
    pub fn is_partial(&self) -> bool {
        self.end.is_none()
    }

    /// Year-month label used in logs and error messages, e.g. `2021-03`
    pub fn label(&self) -> String {
        self.start.format("%Y-%m").to_string()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Lazy sequence of monthly windows from a start date up to `now`
///
/// The sequence is finite: it ends with the window that contains `now`, and it is
/// empty when the start date lies after `now`. Cloning restarts from the current
/// position, and `MonthlyWindows::new` with the same inputs always replays the same
/// sequence.
#[derive(Debug, Clone)]
pub struct MonthlyWindows {
    anchor: NaiveDate,
    now: DateTime<Utc>,
    index: u32,
    finished: bool,
}

impl MonthlyWindows {
    pub fn new(start: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            anchor: start,
            now,
            index: 0,
            finished: false,
        }
    }

    /// The `now` this schedule was computed against
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Boundary `index` months after the anchor, at midnight UTC
    fn boundary(&self, index: u32) -> Option<DateTime<Utc>> {
        self.anchor
            .checked_add_months(Months::new(index))
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

impl Iterator for MonthlyWindows {
    type Item = TimeWindow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let start = match self.boundary(self.index) {
            Some(start) if start <= self.now => start,
            _ => {
                self.finished = true;
                return None;
            }
        };

        self.index += 1;

        let end = match self.boundary(self.index) {
            Some(end) if end < self.now => Some(end),
            _ => {
                self.finished = true;
                None
            }
        };

        Some(TimeWindow { start, end })
    }
}
