use async_trait::async_trait;
use vista_core::{ResultPage, SearchError, SearchPolicy, SearchRequest, SearchSource};

use crate::client::ProxyClient;
use crate::types::{SymbolMatch, SymbolSearchResponse};

/// Ticker lookup for the finance view.
#[derive(Debug, Clone)]
pub struct SymbolSearch {
    client: ProxyClient,
}

impl SymbolSearch {
    /// Shortest query worth sending to the symbol search.
    pub const MIN_QUERY_LEN: usize = 2;

    /// Create a symbol search over the given proxy.
    pub fn new(client: ProxyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchSource for SymbolSearch {
    type Item = SymbolMatch;

    async fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<ResultPage<SymbolMatch>, SearchError> {
        if !request.has_query() {
            return Ok(ResultPage::empty());
        }

        let params = [
            ("function", "SYMBOL_SEARCH".to_string()),
            ("keywords", request.query.trim().to_string()),
        ];
        let response: SymbolSearchResponse = self.client.get_json("/api/finance", &params).await?;

        match response.best_matches {
            Some(matches) => Ok(ResultPage::new(matches)),
            None => {
                // Rate-limited responses carry a note instead of matches.
                tracing::warn!("Symbol search for {:?} returned no bestMatches", request.query);
                Ok(ResultPage::empty())
            }
        }
    }

    fn policy(&self) -> SearchPolicy {
        SearchPolicy::new(Self::MIN_QUERY_LEN, 10, false)
    }
}
