//! Proxy server assembly.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::get;
use chrono::{DateTime, Utc};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use vista_core::{RuntimeMode, VistaConfig, VistaError};

use crate::cache::ResponseCache;
use crate::handlers::{api_finance, api_health, api_news, api_weather};
use crate::upstream::{DemoUpstream, HttpUpstream, Upstream};

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    /// Backend provider calls are forwarded to
    pub upstream: Arc<dyn Upstream>,
    /// Recent successful provider responses
    pub cache: Arc<ResponseCache>,
    /// Configuration the server was started with
    pub config: Arc<VistaConfig>,
    /// Monotonic start time for uptime
    pub server_started_at: Instant,
    /// Wall clock start time
    pub started_at_utc: DateTime<Utc>,
}

impl AppState {
    /// State with an explicit upstream.
    pub fn new(config: VistaConfig, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            upstream,
            cache: Arc::new(ResponseCache::from_config(&config.cache)),
            config: Arc::new(config),
            server_started_at: Instant::now(),
            started_at_utc: Utc::now(),
        }
    }

    /// State with the upstream selected by the configured runtime mode.
    ///
    /// # Errors
    /// - `VistaError::Configuration` - Live HTTP client could not be built
    pub fn from_config(config: VistaConfig) -> Result<Self, VistaError> {
        let upstream: Arc<dyn Upstream> = match config.runtime_mode {
            RuntimeMode::Production => Arc::new(HttpUpstream::new(config.providers.clone())?),
            RuntimeMode::Development => Arc::new(DemoUpstream::new()),
        };
        Ok(Self::new(config, upstream))
    }
}

/// Routes with tracing and permissive CORS applied.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/weather", get(api_weather))
        .route("/api/news", get(api_news))
        .route("/api/finance", get(api_finance))
        .route("/api/health", get(api_health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Bind the configured address and serve until the process exits.
///
/// # Errors
/// - `VistaError::Configuration` - Host/port do not form a socket address
/// - `VistaError::Io` - Address could not be bound
/// - `VistaError::Server` - Server stopped with an error
pub async fn run_server(config: VistaConfig) -> Result<(), VistaError> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| VistaError::Configuration {
            reason: format!(
                "Invalid listen address {}:{}: {e}",
                config.server.host, config.server.port
            ),
        })?;

    if config.runtime_mode.is_production() {
        for provider in config.providers.unconfigured() {
            tracing::warn!(
                "{} is not configured; set {} to enable it",
                provider.key_label(),
                provider.env_var()
            );
        }
    }

    let mode = config.runtime_mode;
    let state = AppState::from_config(config)?;
    let upstream = state.upstream.label();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        "Vista proxy listening on http://{} ({} mode, {} upstream)",
        listener.local_addr()?,
        mode,
        upstream
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| VistaError::Server {
            reason: e.to_string(),
        })?;
    Ok(())
}
