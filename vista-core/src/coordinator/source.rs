//! The search capability a coordinator is built around.

use async_trait::async_trait;

use super::policy::SearchPolicy;
use crate::errors::SearchError;

/// Arguments for one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Query text as typed, untrimmed
    pub query: String,
    /// Category or other filter key, if the view has one
    pub filter: Option<String>,
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
}

impl SearchRequest {
    /// Whether the query carries any non-whitespace text.
    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }
}

/// Items produced by one fetch, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage<T> {
    pub items: Vec<T>,
}

impl<T> ResultPage<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A data domain the coordinator can search.
///
/// Implementations wrap one proxy endpoint. Timeouts and transport details
/// are the implementation's business; the coordinator only sees a page of
/// items or a [`SearchError`].
#[async_trait]
pub trait SearchSource: Send + Sync + std::fmt::Debug {
    /// Item type shown in the view.
    type Item: Clone + Send + Sync + 'static;

    /// Fetch one page of results.
    ///
    /// # Errors
    /// - `SearchError::Configuration` - Provider credentials are unusable
    /// - `SearchError::Transport` - The request could not be completed
    /// - `SearchError::Provider` - The provider rejected the request
    /// - `SearchError::Parse` - The response could not be decoded
    async fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<ResultPage<Self::Item>, SearchError>;

    /// Default coordinator tuning for this domain.
    fn policy(&self) -> SearchPolicy {
        SearchPolicy::default()
    }
}
