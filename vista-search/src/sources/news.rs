use async_trait::async_trait;
use vista_core::{ResultPage, SearchError, SearchPolicy, SearchRequest, SearchSource};

use crate::client::ProxyClient;
use crate::types::{Article, NewsCategory, NewsResponse};

/// Paged headlines for the news view.
///
/// With a query the feed searches all articles; without one it lists top
/// headlines for the request's filter, read as a [`NewsCategory`].
#[derive(Debug, Clone)]
pub struct NewsFeed {
    client: ProxyClient,
}

impl NewsFeed {
    /// Articles requested per page.
    pub const PAGE_SIZE: u32 = 10;

    /// Create a news feed over the given proxy.
    pub fn new(client: ProxyClient) -> Self {
        Self { client }
    }

    fn params(request: &SearchRequest) -> Result<Vec<(&'static str, String)>, SearchError> {
        let mut params = vec![
            ("page", request.page.to_string()),
            ("pageSize", request.page_size.to_string()),
        ];

        if request.has_query() {
            params.push(("q", request.query.trim().to_string()));
        } else {
            let category = match request.filter.as_deref() {
                Some(filter) => filter
                    .parse::<NewsCategory>()
                    .map_err(|reason| SearchError::Configuration { reason })?,
                None => NewsCategory::default(),
            };
            params.push(("category", category.to_string()));
        }

        Ok(params)
    }
}

#[async_trait]
impl SearchSource for NewsFeed {
    type Item = Article;

    async fn search(&self, request: &SearchRequest) -> Result<ResultPage<Article>, SearchError> {
        let params = Self::params(request)?;
        let response: NewsResponse = self.client.get_json("/api/news", &params).await?;
        Ok(ResultPage::new(response.articles))
    }

    fn policy(&self) -> SearchPolicy {
        SearchPolicy::new(0, Self::PAGE_SIZE, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(query: &str, filter: Option<&str>) -> SearchRequest {
        SearchRequest {
            query: query.to_string(),
            filter: filter.map(str::to_string),
            page: 2,
            page_size: 10,
        }
    }

    #[test]
    fn test_query_takes_precedence_over_category() {
        let params = NewsFeed::params(&request("rust", Some("sports"))).unwrap();
        assert!(params.contains(&("q", "rust".to_string())));
        assert!(!params.iter().any(|(name, _)| *name == "category"));
        assert!(params.contains(&("page", "2".to_string())));
    }

    #[test]
    fn test_blank_query_uses_category() {
        let params = NewsFeed::params(&request("  ", Some("Business"))).unwrap();
        assert!(params.contains(&("category", "business".to_string())));

        let params = NewsFeed::params(&request("", None)).unwrap();
        assert!(params.contains(&("category", "general".to_string())));
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        assert!(NewsFeed::params(&request("", Some("weather"))).is_err());
    }
}
