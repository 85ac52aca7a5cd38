//! `GET /api/health`

use axum::extract::State;
use axum::response::Json;
use serde_json::{Value, json};
use vista_core::Provider;

use crate::server::AppState;

/// Runtime mode, uptime, upstream kind, cache statistics and which
/// providers have usable credentials.
pub async fn api_health(State(state): State<AppState>) -> Json<Value> {
    let providers: Vec<Value> = Provider::ALL
        .into_iter()
        .map(|provider| {
            json!({
                "provider": provider,
                "name": provider.display_name(),
                "configured": state.config.providers.credentials(provider).is_configured(),
            })
        })
        .collect();

    Json(json!({
        "status": "ok",
        "mode": state.config.runtime_mode.to_string(),
        "upstream": state.upstream.label(),
        "uptime_secs": state.server_started_at.elapsed().as_secs(),
        "started_at": state.started_at_utc.to_rfc3339(),
        "cache": state.cache.statistics(),
        "providers": providers,
    }))
}
