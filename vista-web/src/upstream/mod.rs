//! Provider backends the proxy forwards to.
//!
//! Handlers describe what they want as an [`UpstreamRequest`] without any
//! credential; an [`Upstream`] turns that into a provider call. Production
//! uses [`HttpUpstream`], development uses [`DemoUpstream`].

mod demo;
mod http;

use async_trait::async_trait;
use serde_json::Value;
use vista_core::Provider;

pub use demo::DemoUpstream;
pub use http::HttpUpstream;

use crate::errors::ProxyError;

/// Provider endpoint a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// OpenWeather current conditions
    Weather,
    /// OpenWeather five day forecast
    Forecast,
    /// OpenWeather direct geocoding
    Geocoding,
    /// News API top headlines
    TopHeadlines,
    /// News API full text search
    Everything,
    /// Alpha Vantage query endpoint
    Finance,
}

impl Endpoint {
    /// Provider serving this endpoint.
    pub fn provider(self) -> Provider {
        match self {
            Endpoint::Weather | Endpoint::Forecast | Endpoint::Geocoding => Provider::OpenWeather,
            Endpoint::TopHeadlines | Endpoint::Everything => Provider::NewsApi,
            Endpoint::Finance => Provider::AlphaVantage,
        }
    }

    /// Short name used in logs and cache keys.
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Weather => "weather",
            Endpoint::Forecast => "forecast",
            Endpoint::Geocoding => "geocoding",
            Endpoint::TopHeadlines => "top-headlines",
            Endpoint::Everything => "everything",
            Endpoint::Finance => "finance",
        }
    }
}

/// Credential-free description of one provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    /// Target endpoint
    pub endpoint: Endpoint,
    /// Query parameters in the order they are sent
    pub params: Vec<(&'static str, String)>,
}

impl UpstreamRequest {
    /// Create a request with no parameters.
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            params: Vec::new(),
        }
    }

    /// Append a query parameter.
    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    /// Value of the first parameter named `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Stable key for the response cache; parameter order does not matter.
    pub fn cache_key(&self) -> String {
        let mut params: Vec<String> = self
            .params
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        params.sort();
        format!("{}?{}", self.endpoint.name(), params.join("&"))
    }
}

/// A backend able to answer provider calls.
#[async_trait]
pub trait Upstream: Send + Sync + std::fmt::Debug {
    /// Perform the call and return the provider's JSON body.
    ///
    /// # Errors
    /// - `ProxyError::Configuration` - Provider credentials are unusable; no
    ///   request was sent
    /// - `ProxyError::Upstream` - Provider answered with a non-success status
    /// - `ProxyError::Transport` - Provider unreachable or body not JSON
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, ProxyError>;

    /// Fail fast when `provider` cannot be called at all.
    ///
    /// Routes run this before validating their parameters.
    ///
    /// # Errors
    /// - `ProxyError::Configuration` - Provider credentials are unusable
    fn check_credentials(&self, _provider: Provider) -> Result<(), ProxyError> {
        Ok(())
    }

    /// Short label reported by the health route.
    fn label(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_ignores_param_order() {
        let a = UpstreamRequest::new(Endpoint::Finance)
            .param("function", "GLOBAL_QUOTE")
            .param("symbol", "IBM");
        let b = UpstreamRequest::new(Endpoint::Finance)
            .param("symbol", "IBM")
            .param("function", "GLOBAL_QUOTE");
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), "finance?function=GLOBAL_QUOTE&symbol=IBM");
    }

    #[test]
    fn test_endpoints_map_to_providers() {
        assert_eq!(Endpoint::Geocoding.provider(), Provider::OpenWeather);
        assert_eq!(Endpoint::Everything.provider(), Provider::NewsApi);
        assert_eq!(Endpoint::Finance.provider(), Provider::AlphaVantage);
    }
}
