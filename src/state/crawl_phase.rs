/// Crawl phase definitions for tracking export progress
///
/// A run moves `Init → FetchingPage ⇄ MorePages → WindowDone → AdvanceWindow` once per
/// window and ends in `Complete`, or in `Aborted` as soon as any fetch fails.
use crate::ExportError;
use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Active Phases =====
    /// Run created, no window started yet
    Init,

    /// A page request for the current window is in flight
    FetchingPage,

    /// The last page reported further pages for the current window
    MorePages,

    /// All pages of the current window have been drained
    WindowDone,

    /// Moving on to the next window boundary
    AdvanceWindow,

    // ===== Terminal Phases =====
    /// Every window was walked
    Complete,

    /// A fetch, parse or API error stopped the run
    Aborted,
}

impl CrawlPhase {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Aborted)
    }

    /// Returns true if the run is still making progress
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if `next` is a legal successor of this phase
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        if next == Aborted {
            return self.is_active();
        }

        matches!(
            (self, next),
            (Init, FetchingPage)
                | (Init, Complete)
                | (FetchingPage, MorePages)
                | (FetchingPage, WindowDone)
                | (MorePages, FetchingPage)
                | (WindowDone, AdvanceWindow)
                | (AdvanceWindow, FetchingPage)
                | (AdvanceWindow, Complete)
        )
    }

    /// Short lowercase name used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::FetchingPage => "fetching_page",
            Self::MorePages => "more_pages",
            Self::WindowDone => "window_done",
            Self::AdvanceWindow => "advance_window",
            Self::Complete => "complete",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the phase of one run and rejects illegal transitions
#[derive(Debug, Clone)]
pub struct CrawlTracker {
    phase: CrawlPhase,
    transitions: u64,
}

impl CrawlTracker {
    pub fn new() -> Self {
        Self {
            phase: CrawlPhase::Init,
            transitions: 0,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Number of transitions taken so far
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Moves to `next`, failing with `InvalidTransition` if the move is not allowed
    pub fn transition(&mut self, next: CrawlPhase) -> Result<(), ExportError> {
        if !self.phase.can_transition_to(next) {
            return Err(ExportError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        self.transitions += 1;
        Ok(())
    }

    /// Marks the run as aborted; a no-op once the run is already terminal
    pub fn abort(&mut self) {
        if self.phase.is_active() {
            tracing::trace!("Crawl phase {} -> {}", self.phase, CrawlPhase::Aborted);
            self.phase = CrawlPhase::Aborted;
            self.transitions += 1;
        }
    }
}

impl Default for CrawlTracker {
    fn default() -> Self {
        Self::new()
    }
}
