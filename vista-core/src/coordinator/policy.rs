//! Per-domain coordinator tuning.

use std::time::Duration;

/// How a coordinator debounces, gates and pages one data domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchPolicy {
    /// Idle window before a typed query is fetched
    pub debounce: Duration,
    /// Queries shorter than this (in characters) clear results instead of fetching
    pub min_query_len: usize,
    /// Items requested per page; a full page means more may exist
    pub page_size: u32,
    /// Sources that return a single result set never report more pages
    pub paginated: bool,
}

impl SearchPolicy {
    /// Default debounce window for typed input.
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

    pub fn new(min_query_len: usize, page_size: u32, paginated: bool) -> Self {
        Self {
            debounce: Self::DEFAULT_DEBOUNCE,
            min_query_len,
            page_size,
            paginated,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Whether a query of this text is long enough to fetch.
    pub fn accepts(&self, query: &str) -> bool {
        query.chars().count() >= self.min_query_len
    }

    /// Full page heuristic: a page as large as requested suggests another exists.
    ///
    /// When the total is an exact multiple of the page size this costs one
    /// trailing empty fetch.
    pub fn has_more_after(&self, fetched: usize) -> bool {
        self.paginated && self.page_size > 0 && fetched == self.page_size as usize
    }
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self::new(0, 10, true)
    }
}
