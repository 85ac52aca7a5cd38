//! HTTP client for the Vista proxy.
//!
//! All feeds go through the proxy rather than the providers directly, so the
//! client never sees an API key. Failures are folded into [`SearchError`] by
//! the `kind` field of the proxy's error body.

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;
use vista_core::{SearchError, VistaConfig};

use crate::types::{
    CurrentWeather, PricePoint, QuoteResponse, RawSeries, StockQuote, TimeInterval,
};

/// Error body returned by every proxy route.
#[derive(Debug, Deserialize)]
struct ProxyErrorBody {
    error: String,
    #[serde(default)]
    kind: Option<String>,
}

/// Client bound to one proxy base URL.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ProxyClient {
    /// Create a client for the proxy at `base_url` with a default timeout.
    ///
    /// # Errors
    /// - `SearchError::Configuration` - `base_url` is not an absolute URL
    pub fn new(base_url: &str) -> Result<Self, SearchError> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a client using the proxy URL, timeout and user agent from config.
    ///
    /// # Errors
    /// - `SearchError::Configuration` - Proxy URL is invalid or the HTTP client
    ///   could not be built
    pub fn from_config(config: &VistaConfig) -> Result<Self, SearchError> {
        let client = build_http_client(
            config.providers.request_timeout,
            config.providers.user_agent,
        )?;
        Self::with_client(&config.server.proxy_url, client)
    }

    fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self, SearchError> {
        let mut base_url = Url::parse(base_url).map_err(|e| SearchError::Configuration {
            reason: format!("Invalid proxy URL '{base_url}': {e}"),
        })?;
        // Directory form, so joins keep a path prefix such as `/dash`.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    /// Resolve a route path against the base URL, keeping any base path prefix.
    fn endpoint(&self, path: &str) -> Result<Url, SearchError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| SearchError::Configuration {
                reason: format!("Invalid proxy path '{path}': {e}"),
            })
    }

    /// Issue `GET {base}/{path}` with query parameters and decode the JSON body.
    ///
    /// `path` is resolved below the base URL, so a proxy mounted under a
    /// prefix works with or without a leading slash.
    ///
    /// # Errors
    /// - `SearchError::Configuration` - Proxy reported missing credentials
    /// - `SearchError::Provider` - Provider rejected the request
    /// - `SearchError::Transport` - Request failed or proxy returned an
    ///   unrecognised error
    /// - `SearchError::Parse` - Body did not match `T`
    pub async fn get_json<T>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, SearchError>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;

        tracing::debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| SearchError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| SearchError::Transport {
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        serde_json::from_slice(&body).map_err(|e| SearchError::Parse {
            reason: format!("{path}: {e}"),
        })
    }

    /// Current conditions at a coordinate.
    ///
    /// # Errors
    /// See [`get_json`](Self::get_json).
    pub async fn current_weather(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<CurrentWeather, SearchError> {
        self.get_json("/api/weather", &weather_params("weather", lat, lon))
            .await
    }

    /// Five day forecast at a coordinate, passed through unchanged.
    ///
    /// # Errors
    /// See [`get_json`](Self::get_json).
    pub async fn forecast(&self, lat: f64, lon: f64) -> Result<serde_json::Value, SearchError> {
        self.get_json("/api/weather", &weather_params("forecast", lat, lon))
            .await
    }

    /// Latest quote for a symbol.
    ///
    /// # Errors
    /// - `SearchError::Provider` - Provider has no quote for the symbol
    /// - Otherwise see [`get_json`](Self::get_json)
    pub async fn quote(&self, symbol: &str) -> Result<StockQuote, SearchError> {
        let params = [
            ("function", "GLOBAL_QUOTE".to_string()),
            ("symbol", symbol.to_string()),
        ];
        let response: QuoteResponse = self.get_json("/api/finance", &params).await?;

        response
            .quote
            .filter(|quote| !quote.symbol.is_empty())
            .ok_or_else(|| SearchError::Provider {
                reason: format!("No quote available for {symbol}"),
            })
    }

    /// Price history for a symbol, oldest bar first.
    ///
    /// Bars whose numbers fail to parse are skipped.
    ///
    /// # Errors
    /// - `SearchError::Parse` - Response has no series for the interval
    /// - Otherwise see [`get_json`](Self::get_json)
    pub async fn time_series(
        &self,
        symbol: &str,
        interval: TimeInterval,
    ) -> Result<Vec<PricePoint>, SearchError> {
        let mut params = vec![
            ("function", interval.function_name().to_string()),
            ("symbol", symbol.to_string()),
        ];
        if interval != TimeInterval::Daily {
            params.push(("interval", interval.as_str().to_string()));
        }

        let body: serde_json::Value = self.get_json("/api/finance", &params).await?;
        let key = interval.series_key();
        let series = body.get(&key).cloned().ok_or_else(|| SearchError::Parse {
            reason: format!("missing '{key}' in time series response"),
        })?;
        let series: RawSeries =
            serde_json::from_value(series).map_err(|e| SearchError::Parse {
                reason: format!("{key}: {e}"),
            })?;

        // BTreeMap orders the timestamps ascending.
        Ok(series
            .iter()
            .filter_map(|(timestamp, bar)| PricePoint::from_raw(timestamp.clone(), bar))
            .collect())
    }
}

fn weather_params(endpoint: &str, lat: f64, lon: f64) -> [(&'static str, String); 3] {
    [
        ("endpoint", endpoint.to_string()),
        ("lat", lat.to_string()),
        ("lon", lon.to_string()),
    ]
}

fn build_http_client(
    timeout: Duration,
    user_agent: &str,
) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| SearchError::Configuration {
            reason: format!("Failed to build HTTP client: {e}"),
        })
}

fn error_from_body(status: reqwest::StatusCode, body: &[u8]) -> SearchError {
    let Ok(body) = serde_json::from_slice::<ProxyErrorBody>(body) else {
        return SearchError::Transport {
            reason: format!("proxy returned {status}"),
        };
    };

    match body.kind.as_deref() {
        Some("configuration") => SearchError::Configuration { reason: body.error },
        Some("upstream") => SearchError::Provider { reason: body.error },
        _ if status.is_client_error() => SearchError::Provider { reason: body.error },
        _ => SearchError::Transport { reason: body.error },
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn test_error_kinds_map_to_search_errors() {
        let body = br#"{"error":"News API key is not configured","kind":"configuration"}"#;
        assert!(matches!(
            error_from_body(StatusCode::INTERNAL_SERVER_ERROR, body),
            SearchError::Configuration { .. }
        ));

        let body = br#"{"error":"Invalid API call","kind":"upstream"}"#;
        assert_eq!(
            error_from_body(StatusCode::BAD_REQUEST, body),
            SearchError::Provider {
                reason: "Invalid API call".to_string()
            }
        );

        let body = br#"{"error":"connection reset","kind":"transport"}"#;
        assert!(matches!(
            error_from_body(StatusCode::BAD_GATEWAY, body),
            SearchError::Transport { .. }
        ));
    }

    #[test]
    fn test_unparseable_error_body_is_transport() {
        let err = error_from_body(StatusCode::SERVICE_UNAVAILABLE, b"<html>");
        assert!(matches!(err, SearchError::Transport { .. }));
    }

    #[test]
    fn test_base_path_prefix_is_kept() {
        let client = ProxyClient::new("http://127.0.0.1:3000/dash").unwrap();
        assert_eq!(
            client.endpoint("/api/news").unwrap().as_str(),
            "http://127.0.0.1:3000/dash/api/news"
        );

        let client = ProxyClient::new("http://127.0.0.1:3000").unwrap();
        assert_eq!(
            client.endpoint("api/weather").unwrap().as_str(),
            "http://127.0.0.1:3000/api/weather"
        );
    }

    #[test]
    fn test_rejects_relative_base_url() {
        assert!(matches!(
            ProxyClient::new("localhost/api"),
            Err(SearchError::Configuration { .. })
        ));
        assert!(ProxyClient::new("http://127.0.0.1:3000").is_ok());
    }
}
