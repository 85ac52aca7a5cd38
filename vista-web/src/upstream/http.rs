//! Live provider calls over HTTP.

use async_trait::async_trait;
use serde_json::Value;
use url::Url;
use vista_core::config::ProviderConfig;
use vista_core::{Provider, VistaError};

use super::{Endpoint, Upstream, UpstreamRequest};
use crate::errors::ProxyError;

/// Forwards requests to the real providers, injecting API keys.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    providers: ProviderConfig,
}

impl HttpUpstream {
    /// Create an upstream using the configured endpoints, keys and timeout.
    ///
    /// # Errors
    /// - `VistaError::Configuration` - HTTP client could not be built
    pub fn new(providers: ProviderConfig) -> Result<Self, VistaError> {
        let client = reqwest::Client::builder()
            .timeout(providers.request_timeout)
            .user_agent(providers.user_agent)
            .build()
            .map_err(|e| VistaError::Configuration {
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, providers })
    }

    /// Upstream URL for a request, without credentials.
    ///
    /// # Errors
    /// - `ProxyError::Configuration` - A configured base URL is invalid
    pub fn url_for(&self, request: &UpstreamRequest) -> Result<Url, ProxyError> {
        let providers = &self.providers;
        let raw = match request.endpoint {
            Endpoint::Weather => format!("{}/weather", providers.weather_base_url),
            Endpoint::Forecast => format!("{}/forecast", providers.weather_base_url),
            Endpoint::Geocoding => format!("{}/direct", providers.geocoding_base_url),
            Endpoint::TopHeadlines => format!("{}/top-headlines", providers.news_base_url),
            Endpoint::Everything => format!("{}/everything", providers.news_base_url),
            Endpoint::Finance => providers.finance_base_url.clone(),
        };

        let mut url = Url::parse(&raw).map_err(|e| ProxyError::Configuration {
            reason: format!("Invalid upstream URL '{raw}': {e}"),
        })?;
        url.query_pairs_mut()
            .extend_pairs(request.params.iter().map(|(k, v)| (*k, v.as_str())));
        Ok(url)
    }
}

/// Query parameter each provider expects its key in.
fn key_param(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenWeather => "appid",
        Provider::NewsApi => "apiKey",
        Provider::AlphaVantage => "apikey",
    }
}

/// Error message from a provider error body, if it has one.
fn provider_message(body: &Value) -> Option<String> {
    ["message", "Error Message", "error"]
        .iter()
        .find_map(|field| body.get(*field).and_then(Value::as_str))
        .map(str::to_string)
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, ProxyError> {
        let provider = request.endpoint.provider();
        let api_key = self.providers.credentials(provider).require()?;
        let url = self.url_for(request)?;

        tracing::debug!("Forwarding to {}", url);

        let response = self
            .client
            .get(url)
            .query(&[(key_param(provider), api_key)])
            .send()
            .await
            .map_err(|e| {
                // reqwest errors carry the URL, which now includes the key.
                tracing::warn!("{} request failed: {}", provider, e.without_url());
                ProxyError::Transport {
                    reason: format!("Failed to fetch {} data", provider.display_name()),
                }
            })?;

        let status = response.status();
        let body: Option<Value> = response.json().await.ok();

        if !status.is_success() {
            let reason = body
                .as_ref()
                .and_then(provider_message)
                .unwrap_or_else(|| format!("Failed to fetch {} data", provider.display_name()));
            tracing::warn!("{} answered {}: {}", provider, status, reason);
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                reason,
            });
        }

        body.ok_or_else(|| ProxyError::Transport {
            reason: format!("{} returned an unreadable response", provider.display_name()),
        })
    }

    fn check_credentials(&self, provider: Provider) -> Result<(), ProxyError> {
        self.providers.credentials(provider).require()?;
        Ok(())
    }

    fn label(&self) -> &'static str {
        "live"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use vista_core::ProviderCredentials;

    use super::*;

    fn upstream() -> HttpUpstream {
        HttpUpstream::new(ProviderConfig::default()).unwrap()
    }

    #[test]
    fn test_urls_never_contain_keys() {
        let mut providers = ProviderConfig::default();
        providers.openweather =
            ProviderCredentials::new(Provider::OpenWeather, Some("secret".to_string()));
        let upstream = HttpUpstream::new(providers).unwrap();

        let request = UpstreamRequest::new(Endpoint::Geocoding)
            .param("q", "São Paulo")
            .param("limit", "5");
        let url = upstream.url_for(&request).unwrap();
        assert_eq!(url.path(), "/geo/1.0/direct");
        assert!(!url.as_str().contains("secret"));
        assert!(url.query_pairs().any(|(k, v)| k == "q" && v == "São Paulo"));
    }

    #[test]
    fn test_news_urls() {
        let request = UpstreamRequest::new(Endpoint::TopHeadlines).param("country", "us");
        let url = upstream().url_for(&request).unwrap();
        assert_eq!(url.as_str(), "https://newsapi.org/v2/top-headlines?country=us");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let mut providers = ProviderConfig::default();
        // Nothing listens here; a sent request would be a transport error.
        providers.finance_base_url = "http://127.0.0.1:9".to_string();
        let upstream = HttpUpstream::new(providers).unwrap();

        let err = upstream
            .fetch(&UpstreamRequest::new(Endpoint::Finance).param("function", "GLOBAL_QUOTE"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "configuration");
        assert!(err.to_string().contains("ALPHA_VANTAGE_API_KEY"));
    }

    #[test]
    fn test_check_credentials_per_provider() {
        let mut providers = ProviderConfig::default();
        providers.openweather =
            ProviderCredentials::new(Provider::OpenWeather, Some("secret".to_string()));
        let upstream = HttpUpstream::new(providers).unwrap();

        assert!(upstream.check_credentials(Provider::OpenWeather).is_ok());
        let err = upstream.check_credentials(Provider::NewsApi).unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_provider_message_fields() {
        assert_eq!(
            provider_message(&json!({ "cod": 401, "message": "Invalid API key" })).as_deref(),
            Some("Invalid API key")
        );
        assert!(provider_message(&json!({ "cod": 500 })).is_none());
    }
}
