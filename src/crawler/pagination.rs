//! Pagination within a single time window
//!
//! The walker requests pages 1, 2, … until the API reports no further pages. The page
//! cap is a hard stop for paging metadata that never converges; reaching it marks the
//! window as truncated rather than failing the run.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::scheduler::TimeWindow;
use crate::record::LogRecord;
use crate::state::{CrawlPhase, CrawlTracker};
use crate::ExportError;
use tracing::{debug, warn};

/// Everything fetched for one window
#[derive(Debug, Clone, Default)]
pub struct WindowPages {
    pub records: Vec<LogRecord>,
    pub pages_fetched: u32,
    /// True when the page cap stopped the walk while the API still reported more pages
    pub truncated: bool,
}

/// Drains all pages of a window, up to `max_pages`
#[derive(Debug, Clone, Copy)]
pub struct PaginationWalker {
    max_pages: u32,
}

impl PaginationWalker {
    pub fn new(max_pages: u32) -> Self {
        Self {
            max_pages: max_pages.max(1),
        }
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Walks every page for `window`, querying with the given `before` bound
    ///
    /// The tracker is moved through `FetchingPage ⇄ MorePages` and left in `WindowDone`
    /// on success. Any fetch error aborts the tracker and is returned with the window
    /// label and page number attached.
    pub async fn walk<F: PageFetcher>(
        &self,
        fetcher: &F,
        window: &TimeWindow,
        before: i64,
        tracker: &mut CrawlTracker,
    ) -> Result<WindowPages, ExportError> {
        let mut pages = WindowPages::default();
        let mut page = 1;

        loop {
            tracker.transition(CrawlPhase::FetchingPage)?;

            let fetched = match fetcher.fetch_page(before, page).await {
                Ok(fetched) => fetched,
                Err(source) => {
                    tracker.abort();
                    return Err(ExportError::Fetch {
                        window: window.label(),
                        page,
                        source,
                    });
                }
            };

            debug!(
                "Window {} page {}/{}: {} records",
                window,
                fetched.page,
                fetched.total_pages,
                fetched.records.len()
            );

            pages.pages_fetched += 1;
            pages.records.extend(fetched.records);

            if !fetched.has_more {
                break;
            }

            if page >= self.max_pages {
                warn!(
                    "Window {} stopped at the page cap of {} while the API reported {} pages; \
                     later pages of this window were not fetched",
                    window, self.max_pages, fetched.total_pages
                );
                pages.truncated = true;
                break;
            }

            tracker.transition(CrawlPhase::MorePages)?;
            page += 1;
        }

        tracker.transition(CrawlPhase::WindowDone)?;
        Ok(pages)
    }
}
