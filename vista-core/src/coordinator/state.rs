//! Coordinator state machine.
//!
//! Pure and synchronous: every method is one transition, and the actor
//! decides what to do about timers and in-flight fetches from the return
//! value. Keeping it free of async makes each transition testable on its own.

use serde::Serialize;

use super::policy::SearchPolicy;
use super::source::{ResultPage, SearchRequest};
use crate::errors::SearchError;

/// What the view should show around the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Idle,
    /// First page of a new query or filter is being fetched
    Loading,
    /// A further page is being fetched; existing items stay visible
    LoadingMore,
    /// Last fetch failed; see `SearchSnapshot::error`
    Error,
}

impl Status {
    pub fn is_busy(self) -> bool {
        matches!(self, Status::Loading | Status::LoadingMore)
    }
}

/// Immutable copy of coordinator state, published after every transition.
#[derive(Debug, Clone, Serialize)]
pub struct SearchSnapshot<T> {
    pub query: String,
    pub filter: Option<String>,
    pub status: Status,
    /// Accumulated results across all fetched pages
    pub items: Vec<T>,
    /// Last page successfully fetched
    pub page: u32,
    pub has_more: bool,
    /// Display message for `Status::Error`
    pub error: Option<String>,
    /// Latest issued request generation
    pub generation: u64,
}

impl<T> SearchSnapshot<T> {
    /// No fetch is outstanding.
    pub fn is_settled(&self) -> bool {
        !self.status.is_busy()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FetchKind {
    /// Replaces results with page 1
    Reset,
    /// Appends the next page
    NextPage,
}

/// A fetch the actor must issue.
#[derive(Debug, Clone)]
pub(crate) struct FetchPlan {
    pub generation: u64,
    pub kind: FetchKind,
    pub request: SearchRequest,
}

/// A finished fetch, tagged with the generation it was issued under.
#[derive(Debug)]
pub(crate) struct FetchOutcome<T> {
    pub generation: u64,
    pub kind: FetchKind,
    pub page: u32,
    pub result: Result<ResultPage<T>, SearchError>,
}

/// Effect of a `set_query` call on the debounce timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QueryChange {
    /// Same text and nothing pending
    Unchanged,
    /// Arm or re-arm the debounce timer
    Debounce,
    /// Below the length threshold; results cleared, timer cancelled
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Completion {
    Applied,
    Stale,
}

#[derive(Debug)]
pub(crate) struct SearchState<T> {
    policy: SearchPolicy,
    query: String,
    filter: Option<String>,
    generation: u64,
    items: Vec<T>,
    page: u32,
    has_more: bool,
    status: Status,
    error: Option<String>,
    debounce_pending: bool,
}

impl<T: Clone> SearchState<T> {
    pub fn new(policy: SearchPolicy) -> Self {
        Self {
            policy,
            query: String::new(),
            filter: None,
            generation: 0,
            items: Vec::new(),
            page: 1,
            has_more: true,
            status: Status::Idle,
            error: None,
            debounce_pending: false,
        }
    }

    pub fn policy(&self) -> &SearchPolicy {
        &self.policy
    }

    /// Same text re-arms a pending debounce, and retries after a failed fetch.
    pub fn set_query(&mut self, text: String) -> QueryChange {
        if text == self.query {
            if self.debounce_pending {
                return QueryChange::Debounce;
            }
            if self.status == Status::Error && self.policy.accepts(&self.query) {
                self.status = Status::Idle;
                self.error = None;
                self.debounce_pending = true;
                return QueryChange::Debounce;
            }
            return QueryChange::Unchanged;
        }

        self.query = text;
        // Anything in flight belongs to the old query.
        self.generation += 1;
        self.clear_results();
        self.status = Status::Idle;

        if self.policy.accepts(&self.query) {
            self.debounce_pending = true;
            QueryChange::Debounce
        } else {
            self.debounce_pending = false;
            QueryChange::Cleared
        }
    }

    /// Switches the filter and starts page 1 immediately.
    pub fn trigger_initial_load(&mut self, filter: Option<String>) -> FetchPlan {
        self.filter = filter;
        self.begin_reset()
    }

    /// Starts a page 1 fetch for the current query and filter.
    pub fn begin_reset(&mut self) -> FetchPlan {
        self.debounce_pending = false;
        self.clear_results();
        self.status = Status::Loading;
        self.issue(FetchKind::Reset, 1)
    }

    /// Starts the next page fetch, or returns `None` when paging is not allowed.
    pub fn begin_next_page(&mut self) -> Option<FetchPlan> {
        if self.status != Status::Idle
            || !self.has_more
            || self.debounce_pending
            || self.items.is_empty()
        {
            return None;
        }

        self.status = Status::LoadingMore;
        Some(self.issue(FetchKind::NextPage, self.page + 1))
    }

    pub fn complete(&mut self, outcome: FetchOutcome<T>) -> Completion {
        if outcome.generation != self.generation {
            return Completion::Stale;
        }

        match outcome.result {
            Ok(page) => {
                self.has_more = self.policy.has_more_after(page.len());
                match outcome.kind {
                    FetchKind::Reset => self.items = page.items,
                    FetchKind::NextPage => self.items.extend(page.items),
                }
                self.page = outcome.page;
                self.status = Status::Idle;
                self.error = None;
            }
            Err(error) => {
                self.status = Status::Error;
                self.error = Some(error.user_message());
            }
        }

        Completion::Applied
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> SearchSnapshot<T> {
        SearchSnapshot {
            query: self.query.clone(),
            filter: self.filter.clone(),
            status: self.status,
            items: self.items.clone(),
            page: self.page,
            has_more: self.has_more,
            error: self.error.clone(),
            generation: self.generation,
        }
    }

    fn issue(&mut self, kind: FetchKind, page: u32) -> FetchPlan {
        self.generation += 1;
        FetchPlan {
            generation: self.generation,
            kind,
            request: SearchRequest {
                query: self.query.clone(),
                filter: self.filter.clone(),
                page,
                page_size: self.policy.page_size,
            },
        }
    }

    fn clear_results(&mut self) {
        self.items.clear();
        self.page = 1;
        self.has_more = true;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(min_query_len: usize) -> SearchState<u32> {
        SearchState::new(SearchPolicy::new(min_query_len, 3, true))
    }

    fn ok(plan: &FetchPlan, items: Vec<u32>) -> FetchOutcome<u32> {
        FetchOutcome {
            generation: plan.generation,
            kind: plan.kind,
            page: plan.request.page,
            result: Ok(ResultPage::new(items)),
        }
    }

    fn failed(plan: &FetchPlan) -> FetchOutcome<u32> {
        FetchOutcome {
            generation: plan.generation,
            kind: plan.kind,
            page: plan.request.page,
            result: Err(SearchError::Transport {
                reason: "connection reset".to_string(),
            }),
        }
    }

    #[test]
    fn test_initial_state() {
        let snapshot = state(0).snapshot();
        assert_eq!(snapshot.status, Status::Idle);
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.page, 1);
        assert!(snapshot.has_more);
        assert_eq!(snapshot.generation, 0);
    }

    #[test]
    fn test_short_query_clears_without_debounce() {
        let mut state = state(3);
        let plan = state.trigger_initial_load(None);
        state.complete(ok(&plan, vec![1, 2]));

        assert_eq!(state.set_query("ab".to_string()), QueryChange::Cleared);
        let snapshot = state.snapshot();
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.status, Status::Idle);
    }

    #[test]
    fn test_same_query_only_rearms_pending_debounce() {
        let mut state = state(2);
        assert_eq!(state.set_query("AA".to_string()), QueryChange::Debounce);
        assert_eq!(state.set_query("AA".to_string()), QueryChange::Debounce);

        let plan = state.begin_reset();
        state.complete(ok(&plan, vec![1]));
        assert_eq!(state.set_query("AA".to_string()), QueryChange::Unchanged);
        assert_eq!(state.snapshot().items, vec![1]);
    }

    #[test]
    fn test_same_query_after_error_retries() {
        let mut state = state(2);
        state.set_query("MSFT".to_string());
        let plan = state.begin_reset();
        state.complete(failed(&plan));
        assert_eq!(state.snapshot().status, Status::Error);

        assert_eq!(state.set_query("MSFT".to_string()), QueryChange::Debounce);
        let snapshot = state.snapshot();
        assert_eq!(snapshot.status, Status::Idle);
        assert!(snapshot.error.is_none());

        let retry = state.begin_reset();
        assert_eq!(retry.request.query, "MSFT");
        assert_eq!(retry.request.page, 1);
    }

    #[test]
    fn test_reset_fetch_applies_latest_generation_only() {
        let mut state = state(0);
        let first = state.trigger_initial_load(Some("general".to_string()));
        let second = state.trigger_initial_load(Some("business".to_string()));

        assert_eq!(state.complete(ok(&second, vec![7])), Completion::Applied);
        assert_eq!(state.complete(ok(&first, vec![1, 2, 3])), Completion::Stale);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.items, vec![7]);
        assert_eq!(snapshot.filter.as_deref(), Some("business"));
    }

    #[test]
    fn test_query_change_discards_in_flight_response() {
        let mut state = state(0);
        let plan = state.trigger_initial_load(None);
        state.set_query("tesla".to_string());

        assert_eq!(state.complete(ok(&plan, vec![1, 2, 3])), Completion::Stale);
        let snapshot = state.snapshot();
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.status, Status::Idle);
    }

    #[test]
    fn test_next_page_appends_and_advances_cursor() {
        let mut state = state(0);
        let plan = state.trigger_initial_load(None);
        state.complete(ok(&plan, vec![1, 2, 3]));

        let next = state.begin_next_page().expect("full page allows paging");
        assert_eq!(next.request.page, 2);
        assert_eq!(state.snapshot().status, Status::LoadingMore);
        assert!(state.begin_next_page().is_none());

        state.complete(ok(&next, vec![4]));
        let snapshot = state.snapshot();
        assert_eq!(snapshot.items, vec![1, 2, 3, 4]);
        assert_eq!(snapshot.page, 2);
        assert!(!snapshot.has_more);
        assert!(state.begin_next_page().is_none());
    }

    #[test]
    fn test_failed_page_keeps_results_cursor_and_has_more() {
        let mut state = state(0);
        let plan = state.trigger_initial_load(None);
        state.complete(ok(&plan, vec![1, 2, 3]));

        let next = state.begin_next_page().unwrap();
        state.complete(failed(&next));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.status, Status::Error);
        assert_eq!(snapshot.items, vec![1, 2, 3]);
        assert_eq!(snapshot.page, 1);
        assert!(snapshot.has_more);
        assert!(snapshot.error.is_some());
        // Error is not Idle, so the proximity signal is ignored.
        assert!(state.begin_next_page().is_none());
    }

    #[test]
    fn test_next_page_ignored_while_debounce_pending_or_empty() {
        let mut state = state(0);
        assert!(state.begin_next_page().is_none());

        let plan = state.trigger_initial_load(None);
        state.complete(ok(&plan, vec![1, 2, 3]));
        state.set_query("rust".to_string());
        assert!(state.begin_next_page().is_none());
    }

    #[test]
    fn test_exact_multiple_costs_one_empty_fetch() {
        let mut state = state(0);
        let plan = state.trigger_initial_load(None);
        state.complete(ok(&plan, vec![1, 2, 3]));

        let next = state.begin_next_page().unwrap();
        state.complete(ok(&next, vec![]));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.items.len(), 3);
        assert!(!snapshot.has_more);
        assert_eq!(snapshot.page, 2);
    }
}
