//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: The phases of an export run (init, fetching, window done, complete, aborted)
//! - `CrawlTracker`: Holds the current phase and enforces legal transitions

mod crawl_phase;

// Re-export main types
pub use crawl_phase::{CrawlPhase, CrawlTracker};
