//! Route handlers.
//!
//! Each provider route validates its query, builds an [`UpstreamRequest`]
//! and hands it to [`forward`], which consults the response cache before
//! calling the upstream.

pub mod finance;
pub mod health;
pub mod news;
pub mod weather;

use axum::response::Json;
use serde_json::Value;

pub use finance::api_finance;
pub use health::api_health;
pub use news::api_news;
pub use weather::api_weather;

use crate::errors::ProxyError;
use crate::server::AppState;
use crate::upstream::UpstreamRequest;

/// Whether a provider body that passed inspection may be cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cacheable {
    Yes,
    No,
}

/// Serve a request from cache or upstream, passing the body through.
///
/// `inspect` sees every fresh upstream body and may reject it.
pub(crate) async fn forward<F>(
    state: &AppState,
    request: UpstreamRequest,
    inspect: F,
) -> Result<Json<Value>, ProxyError>
where
    F: FnOnce(&Value) -> Result<Cacheable, ProxyError>,
{
    let key = request.cache_key();
    if let Some(body) = state.cache.get(&key) {
        tracing::debug!("Cache hit for {}", key);
        return Ok(Json(body));
    }

    let body = state.upstream.fetch(&request).await?;
    if inspect(&body)? == Cacheable::Yes {
        state.cache.insert(key, body.clone());
    }
    Ok(Json(body))
}

/// Query value with surrounding whitespace removed; empty counts as absent.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
