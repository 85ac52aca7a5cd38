//! Centralized configuration for Vista.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::time::Duration;

use serde::Serialize;

use crate::errors::VistaError;
use crate::mode::RuntimeMode;

/// Value shipped in `.env` templates that must be replaced before use.
pub const PLACEHOLDER_API_KEY: &str = "your_api_key_here";

/// Central configuration for all Vista components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct VistaConfig {
    pub coordinator: CoordinatorConfig,
    pub providers: ProviderConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub runtime_mode: RuntimeMode,
}

/// Search coordinator timing.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Idle window before a typed query is sent
    pub debounce: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
        }
    }
}

/// Third-party data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    OpenWeather,
    NewsApi,
    AlphaVantage,
}

impl Provider {
    /// All providers, in dashboard tab order.
    pub const ALL: [Provider; 3] = [
        Provider::OpenWeather,
        Provider::NewsApi,
        Provider::AlphaVantage,
    ];

    /// Human readable provider name.
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::OpenWeather => "OpenWeather",
            Provider::NewsApi => "News API",
            Provider::AlphaVantage => "Alpha Vantage",
        }
    }

    /// Label used in credential messages, e.g. "News API key".
    pub fn key_label(self) -> &'static str {
        match self {
            Provider::OpenWeather => "OpenWeather API key",
            Provider::NewsApi => "News API key",
            Provider::AlphaVantage => "Alpha Vantage API key",
        }
    }

    /// Environment variable holding the provider's API key.
    pub fn env_var(self) -> &'static str {
        match self {
            Provider::OpenWeather => "OPENWEATHER_API_KEY",
            Provider::NewsApi => "NEWS_API_KEY",
            Provider::AlphaVantage => "ALPHA_VANTAGE_API_KEY",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// API key for one provider.
#[derive(Clone)]
pub struct ProviderCredentials {
    pub provider: Provider,
    api_key: Option<String>,
}

impl ProviderCredentials {
    /// Creates credentials, treating blank keys as missing.
    pub fn new(provider: Provider, api_key: Option<String>) -> Self {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Self { provider, api_key }
    }

    /// Returns the key if it is present and not the template placeholder.
    ///
    /// # Errors
    /// - `VistaError::Configuration` - Key is missing or still the placeholder
    pub fn require(&self) -> Result<&str, VistaError> {
        match self.api_key.as_deref() {
            None => Err(VistaError::Configuration {
                reason: format!(
                    "{} is not configured. Please set {}",
                    self.provider.key_label(),
                    self.provider.env_var()
                ),
            }),
            Some(PLACEHOLDER_API_KEY) => Err(VistaError::Configuration {
                reason: format!(
                    "Please replace the placeholder {} in {}",
                    self.provider.key_label(),
                    self.provider.env_var()
                ),
            }),
            Some(key) => Ok(key),
        }
    }

    /// Whether [`require`](Self::require) would succeed.
    pub fn is_configured(&self) -> bool {
        self.require().is_ok()
    }
}

// Keys never show up in logs.
impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("provider", &self.provider)
            .field("configured", &self.is_configured())
            .finish()
    }
}

/// Upstream provider endpoints and credentials.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub openweather: ProviderCredentials,
    pub news: ProviderCredentials,
    pub alpha_vantage: ProviderCredentials,
    /// OpenWeather current weather / forecast API
    pub weather_base_url: String,
    /// OpenWeather geocoding API
    pub geocoding_base_url: String,
    pub news_base_url: String,
    pub finance_base_url: String,
    /// Timeout applied to every outbound HTTP request
    pub request_timeout: Duration,
    /// User agent for HTTP requests
    pub user_agent: &'static str,
}

impl ProviderConfig {
    /// Credentials for the given provider.
    pub fn credentials(&self, provider: Provider) -> &ProviderCredentials {
        match provider {
            Provider::OpenWeather => &self.openweather,
            Provider::NewsApi => &self.news,
            Provider::AlphaVantage => &self.alpha_vantage,
        }
    }

    /// Providers whose credentials are missing or placeholders.
    pub fn unconfigured(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|provider| !self.credentials(*provider).is_configured())
            .collect()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            openweather: ProviderCredentials::new(Provider::OpenWeather, None),
            news: ProviderCredentials::new(Provider::NewsApi, None),
            alpha_vantage: ProviderCredentials::new(Provider::AlphaVantage, None),
            weather_base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            geocoding_base_url: "https://api.openweathermap.org/geo/1.0".to_string(),
            news_base_url: "https://newsapi.org/v2".to_string(),
            finance_base_url: "https://www.alphavantage.co/query".to_string(),
            request_timeout: Duration::from_secs(10),
            user_agent: "vista/0.1.0",
        }
    }
}

/// Proxy server binding and the URL clients use to reach it.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base URL feature sources send requests to
    pub proxy_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            proxy_url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

/// Upstream response cache sizing.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a cached upstream response stays valid
    pub ttl: Duration,
    /// Maximum number of cached responses
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_entries: 256,
        }
    }
}

impl VistaConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        for provider in Provider::ALL {
            let credentials = ProviderCredentials::new(provider, lookup(provider.env_var()));
            match provider {
                Provider::OpenWeather => config.providers.openweather = credentials,
                Provider::NewsApi => config.providers.news = credentials,
                Provider::AlphaVantage => config.providers.alpha_vantage = credentials,
            }
        }

        if let Some(millis) = parse_var::<u64, _>(&lookup, "VISTA_DEBOUNCE_MS") {
            config.coordinator.debounce = Duration::from_millis(millis);
        }

        if let Some(seconds) = parse_var::<u64, _>(&lookup, "VISTA_REQUEST_TIMEOUT_SECS") {
            config.providers.request_timeout = Duration::from_secs(seconds);
        }

        if let Some(host) = lookup("VISTA_HOST") {
            config.server.host = host;
        }

        if let Some(port) = parse_var::<u16, _>(&lookup, "VISTA_PORT") {
            config.server.port = port;
        }

        config.server.proxy_url = match lookup("VISTA_PROXY_URL") {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", config.server.host, config.server.port),
        };

        if let Some(seconds) = parse_var::<u64, _>(&lookup, "VISTA_CACHE_TTL_SECS") {
            config.cache.ttl = Duration::from_secs(seconds);
        }

        if let Some(entries) = parse_var::<usize, _>(&lookup, "VISTA_CACHE_ENTRIES") {
            config.cache.max_entries = entries;
        }

        if let Some(mode) = parse_var::<RuntimeMode, _>(&lookup, "VISTA_MODE") {
            config.runtime_mode = mode;
        }

        config
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: {:?}", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> VistaConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        VistaConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = VistaConfig::default();
        assert_eq!(config.coordinator.debounce, Duration::from_millis(500));
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.providers.unconfigured().len(), 3);
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let config = config_from(&[]);
        let err = config.providers.news.require().unwrap_err();
        assert!(err.to_string().contains("NEWS_API_KEY"));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_placeholder_key_is_rejected() {
        let config = config_from(&[("ALPHA_VANTAGE_API_KEY", "your_api_key_here")]);
        let err = config.providers.alpha_vantage.require().unwrap_err();
        assert!(err.to_string().contains("placeholder"));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = config_from(&[("OPENWEATHER_API_KEY", "   ")]);
        assert!(!config.providers.openweather.is_configured());
    }

    #[test]
    fn test_env_overrides() {
        let config = config_from(&[
            ("OPENWEATHER_API_KEY", "abc123"),
            ("VISTA_DEBOUNCE_MS", "250"),
            ("VISTA_PORT", "8080"),
            ("VISTA_CACHE_TTL_SECS", "5"),
            ("VISTA_MODE", "production"),
        ]);
        assert_eq!(config.providers.openweather.require().unwrap(), "abc123");
        assert_eq!(config.coordinator.debounce, Duration::from_millis(250));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.proxy_url, "http://127.0.0.1:8080");
        assert_eq!(config.cache.ttl, Duration::from_secs(5));
        assert_eq!(config.runtime_mode, RuntimeMode::Production);
        assert_eq!(
            config.providers.unconfigured(),
            vec![Provider::NewsApi, Provider::AlphaVantage]
        );
    }

    #[test]
    fn test_invalid_numbers_are_ignored() {
        let config = config_from(&[("VISTA_PORT", "not-a-port"), ("VISTA_DEBOUNCE_MS", "-1")]);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.coordinator.debounce, Duration::from_millis(500));
    }

    #[test]
    fn test_debug_does_not_leak_keys() {
        let credentials = ProviderCredentials::new(Provider::NewsApi, Some("secret".to_string()));
        assert!(!format!("{credentials:?}").contains("secret"));
    }
}
