//! `GET /api/news`

use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;
use serde_json::Value;
use vista_core::Provider;

use super::{Cacheable, forward, non_empty};
use crate::errors::ProxyError;
use crate::server::AppState;
use crate::upstream::{Endpoint, UpstreamRequest};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Full text search when `q` is given, otherwise US top headlines.
pub async fn api_news(
    State(state): State<AppState>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<Value>, ProxyError> {
    state.upstream.check_credentials(Provider::NewsApi)?;
    forward(&state, news_request(&query), inspect_news).await
}

fn news_request(query: &NewsQuery) -> UpstreamRequest {
    let page = non_empty(&query.page).unwrap_or("1");
    let page_size = non_empty(&query.page_size).unwrap_or("10");

    let request = match non_empty(&query.q) {
        Some(q) => UpstreamRequest::new(Endpoint::Everything).param("q", q),
        None => {
            let request = UpstreamRequest::new(Endpoint::TopHeadlines).param("country", "us");
            match non_empty(&query.category) {
                Some(category) if category != "general" => request.param("category", category),
                _ => request,
            }
        }
    };
    request.param("page", page).param("pageSize", page_size)
}

fn inspect_news(body: &Value) -> Result<Cacheable, ProxyError> {
    if body.get("status").and_then(Value::as_str) == Some("error") {
        let reason = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Failed to fetch news data")
            .to_string();
        return Err(ProxyError::Upstream {
            status: 400,
            reason,
        });
    }
    Ok(Cacheable::Yes)
}
