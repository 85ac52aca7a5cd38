//! `GET /api/finance`

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
pub struct FinanceQuery {
    pub function: Option<String>,
    pub symbol: Option<String>,
    pub keywords: Option<String>,
    pub interval: Option<String>,
}

/// Alpha Vantage query pass-through.
pub async fn api_finance(
    State(state): State<AppState>,
    Query(query): Query<FinanceQuery>,
) -> Result<Json<Value>, ProxyError> {
    state.upstream.check_credentials(Provider::AlphaVantage)?;
    let request = finance_request(&query)?;
    forward(&state, request, inspect_finance).await
}

fn finance_request(query: &FinanceQuery) -> Result<UpstreamRequest, ProxyError> {
    let function = non_empty(&query.function).ok_or_else(ProxyError::missing_parameters)?;

    let mut request = UpstreamRequest::new(Endpoint::Finance).param("function", function);
    if let Some(symbol) = non_empty(&query.symbol) {
        request = request.param("symbol", symbol);
    }
    if let Some(keywords) = non_empty(&query.keywords) {
        request = request.param("keywords", keywords);
    }
    if let Some(interval) = non_empty(&query.interval) {
        request = request.param("interval", interval);
    }
    Ok(request)
}

/// Alpha Vantage reports errors and rate limits with a 200 status.
fn inspect_finance(body: &Value) -> Result<Cacheable, ProxyError> {
    if let Some(message) = body.get("Error Message").and_then(Value::as_str) {
        return Err(ProxyError::Upstream {
            status: 400,
            reason: message.to_string(),
        });
    }

    match body
        .get("Note")
        .or_else(|| body.get("Information"))
        .and_then(Value::as_str)
    {
        Some(note) => {
            tracing::warn!("Alpha Vantage note: {}", note);
            Ok(Cacheable::No)
        }
        None => Ok(Cacheable::Yes),
    }
}
