//! Fixed-window rate limiting for upstream API calls
//!
//! The limiter counts calls against a budget that refills at the start of every period.
//! One instance is shared (behind an `Arc`) by every caller in a run, so the budget is
//! global: window boundaries and concurrent callers all draw from the same counter.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Budget of `max_calls` call starts per `period`
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: u32,
    period: Duration,
    state: Mutex<WindowState>,
}

#[derive(Debug)]
struct WindowState {
    /// Start of the current period; `None` until the first call
    started: Option<Instant>,
    used: u32,
}

impl RateLimiter {
    /// Creates a limiter allowing `max_calls` calls to begin within each `period`
    ///
    /// A zero budget is treated as one call per period.
    pub fn new(max_calls: u32, period: Duration) -> Self {
        Self {
            max_calls: max_calls.max(1),
            period,
            state: Mutex::new(WindowState {
                started: None,
                used: 0,
            }),
        }
    }

    /// Creates a limiter with a one-minute period
    pub fn per_minute(max_calls: u32) -> Self {
        Self::new(max_calls, Duration::from_secs(60))
    }

    pub fn max_calls(&self) -> u32 {
        self.max_calls
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Acquires one call slot, waiting for the next period when the budget is spent
    ///
    /// The internal lock is held while waiting, so concurrent callers queue up behind
    /// the sleeper instead of racing for the refilled budget.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        match state.started {
            Some(started) if now.duration_since(started) < self.period => {}
            _ => {
                state.started = Some(now);
                state.used = 0;
            }
        }

        if state.used < self.max_calls {
            state.used += 1;
            return;
        }

        let next_period = state.started.unwrap_or(now) + self.period;
        tracing::info!(
            "Rate limit of {} calls per {:?} reached, waiting {:?}",
            self.max_calls,
            self.period,
            next_period.saturating_duration_since(now)
        );
        sleep_until(next_period).await;

        state.started = Some(next_period);
        state.used = 1;
    }

    /// Slots still available in the current period without waiting
    pub async fn remaining(&self) -> u32 {
        let state = self.state.lock().await;
        match state.started {
            Some(started) if started.elapsed() < self.period => {
                self.max_calls.saturating_sub(state.used)
            }
            _ => self.max_calls,
        }
    }
}
