//! Data types for the weather, news and finance feeds.
//!
//! Field names follow the provider payloads the proxy passes through, so
//! these deserialize straight from the proxy response bodies.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A place returned by the geocoding endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// Place name
    pub name: String,
    /// ISO 3166 country code
    pub country: String,
    /// State or region, when the provider knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lon: f64,
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.state {
            Some(state) => write!(f, "{}, {}, {}", self.name, state, self.country),
            None => write!(f, "{}, {}", self.name, self.country),
        }
    }
}

/// One entry of an Alpha Vantage `SYMBOL_SEARCH` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolMatch {
    /// Ticker symbol
    #[serde(rename = "1. symbol")]
    pub symbol: String,
    /// Company or fund name
    #[serde(rename = "2. name")]
    pub name: String,
    /// Instrument type, e.g. "Equity"
    #[serde(rename = "3. type")]
    pub kind: String,
    /// Listing region
    #[serde(rename = "4. region")]
    pub region: String,
    /// Local market open time
    #[serde(rename = "5. marketOpen")]
    pub market_open: String,
    /// Local market close time
    #[serde(rename = "6. marketClose")]
    pub market_close: String,
    /// Exchange timezone
    #[serde(rename = "7. timezone")]
    pub timezone: String,
    /// Trading currency
    #[serde(rename = "8. currency")]
    pub currency: String,
    /// Provider relevance score, "0.0000" to "1.0000"
    #[serde(rename = "9. matchScore")]
    pub match_score: String,
}

impl std::fmt::Display for SymbolMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.symbol, self.name)
    }
}

/// Body of a symbol search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SymbolSearchResponse {
    #[serde(rename = "bestMatches", default)]
    pub best_matches: Option<Vec<SymbolMatch>>,
}

/// Publisher of a news article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleSource {
    /// Provider identifier, absent for smaller outlets
    #[serde(default)]
    pub id: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: String,
}

/// A news article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Publisher
    #[serde(default)]
    pub source: ArticleSource,
    /// Byline
    #[serde(default)]
    pub author: Option<String>,
    /// Headline
    #[serde(default)]
    pub title: String,
    /// Summary
    #[serde(default)]
    pub description: Option<String>,
    /// Link to the full article
    pub url: String,
    /// Lead image
    #[serde(default)]
    pub url_to_image: Option<String>,
    /// Publication time
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Truncated body text
    #[serde(default)]
    pub content: Option<String>,
}

impl Article {
    /// Publication date formatted for display, e.g. "March 4, 2024 at 09:30".
    pub fn published_label(&self) -> Option<String> {
        self.published_at
            .map(|at| at.format("%B %-d, %Y at %H:%M").to_string())
    }
}

/// Body of a news response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewsResponse {
    #[serde(default)]
    pub articles: Vec<Article>,
}

/// Top headline categories offered by the news feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    /// Everything; sent without a category parameter
    #[default]
    General,
    /// Business
    Business,
    /// Technology
    Technology,
    /// Entertainment
    Entertainment,
    /// Sports
    Sports,
    /// Science
    Science,
    /// Health
    Health,
}

impl NewsCategory {
    /// All categories in display order.
    pub const ALL: [NewsCategory; 7] = [
        NewsCategory::General,
        NewsCategory::Business,
        NewsCategory::Technology,
        NewsCategory::Entertainment,
        NewsCategory::Sports,
        NewsCategory::Science,
        NewsCategory::Health,
    ];

    /// Query parameter value.
    pub fn as_str(self) -> &'static str {
        match self {
            NewsCategory::General => "general",
            NewsCategory::Business => "business",
            NewsCategory::Technology => "technology",
            NewsCategory::Entertainment => "entertainment",
            NewsCategory::Sports => "sports",
            NewsCategory::Science => "science",
            NewsCategory::Health => "health",
        }
    }
}

impl std::fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NewsCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        NewsCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == lowered)
            .ok_or_else(|| format!("Unknown news category: '{s}'"))
    }
}

/// Chart resolution for price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeInterval {
    /// One minute bars
    #[serde(rename = "1min")]
    OneMinute,
    /// Five minute bars
    #[serde(rename = "5min")]
    FiveMinutes,
    /// Fifteen minute bars
    #[serde(rename = "15min")]
    FifteenMinutes,
    /// Thirty minute bars
    #[serde(rename = "30min")]
    ThirtyMinutes,
    /// Hourly bars
    #[serde(rename = "60min")]
    SixtyMinutes,
    /// Daily bars
    #[default]
    #[serde(rename = "daily")]
    Daily,
}

impl TimeInterval {
    /// Parameter value, also used in the response's series key.
    pub fn as_str(self) -> &'static str {
        match self {
            TimeInterval::OneMinute => "1min",
            TimeInterval::FiveMinutes => "5min",
            TimeInterval::FifteenMinutes => "15min",
            TimeInterval::ThirtyMinutes => "30min",
            TimeInterval::SixtyMinutes => "60min",
            TimeInterval::Daily => "daily",
        }
    }

    /// Alpha Vantage function serving this interval.
    pub fn function_name(self) -> &'static str {
        match self {
            TimeInterval::Daily => "TIME_SERIES_DAILY",
            _ => "TIME_SERIES_INTRADAY",
        }
    }

    /// Key of the series object in the response body.
    pub fn series_key(self) -> String {
        match self {
            TimeInterval::Daily => "Time Series (Daily)".to_string(),
            other => format!("Time Series ({})", other.as_str()),
        }
    }
}

impl std::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1min" => Ok(TimeInterval::OneMinute),
            "5min" => Ok(TimeInterval::FiveMinutes),
            "15min" => Ok(TimeInterval::FifteenMinutes),
            "30min" => Ok(TimeInterval::ThirtyMinutes),
            "60min" => Ok(TimeInterval::SixtyMinutes),
            "daily" => Ok(TimeInterval::Daily),
            _ => Err(format!(
                "Invalid interval: '{s}'. Valid options are: 1min, 5min, 15min, 30min, 60min, daily"
            )),
        }
    }
}

/// Latest quote for a symbol (`GLOBAL_QUOTE`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockQuote {
    /// Ticker symbol
    #[serde(rename = "01. symbol")]
    pub symbol: String,
    /// Session open
    #[serde(rename = "02. open")]
    pub open: String,
    /// Session high
    #[serde(rename = "03. high")]
    pub high: String,
    /// Session low
    #[serde(rename = "04. low")]
    pub low: String,
    /// Last price
    #[serde(rename = "05. price")]
    pub price: String,
    /// Session volume
    #[serde(rename = "06. volume")]
    pub volume: String,
    /// Date of the last trade
    #[serde(rename = "07. latest trading day")]
    pub latest_trading_day: String,
    /// Previous session close
    #[serde(rename = "08. previous close")]
    pub previous_close: String,
    /// Absolute change since previous close
    #[serde(rename = "09. change")]
    pub change: String,
    /// Relative change, e.g. "1.2345%"
    #[serde(rename = "10. change percent")]
    pub change_percent: String,
}

/// Body of a quote response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct QuoteResponse {
    #[serde(rename = "Global Quote", default)]
    pub quote: Option<StockQuote>,
}

/// Raw OHLCV entry as the provider sends it.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawBar {
    #[serde(rename = "1. open")]
    pub open: String,
    #[serde(rename = "2. high")]
    pub high: String,
    #[serde(rename = "3. low")]
    pub low: String,
    #[serde(rename = "4. close")]
    pub close: String,
    #[serde(rename = "5. volume")]
    pub volume: String,
}

/// Raw time series keyed by timestamp.
pub(crate) type RawSeries = BTreeMap<String, RawBar>;

/// One bar of price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Provider timestamp, "YYYY-MM-DD" or "YYYY-MM-DD HH:MM:SS"
    pub timestamp: String,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Traded volume
    pub volume: u64,
}

impl PricePoint {
    pub(crate) fn from_raw(timestamp: String, bar: &RawBar) -> Option<Self> {
        Some(Self {
            timestamp,
            open: bar.open.trim().parse().ok()?,
            high: bar.high.trim().parse().ok()?,
            low: bar.low.trim().parse().ok()?,
            close: bar.close.trim().parse().ok()?,
            volume: bar.volume.trim().parse().ok()?,
        })
    }
}

/// Current conditions for a location (`/weather`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Location name resolved by the provider
    #[serde(default)]
    pub name: String,
    /// Temperature and humidity
    pub main: WeatherMain,
    /// Condition summaries, most significant first
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    /// Wind readings
    #[serde(default)]
    pub wind: Wind,
}

impl CurrentWeather {
    /// Primary condition, if the provider sent any.
    pub fn condition(&self) -> Option<&WeatherCondition> {
        self.weather.first()
    }
}

/// Temperature block of a weather response, metric units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherMain {
    /// Temperature in °C
    pub temp: f64,
    /// Perceived temperature in °C
    #[serde(default)]
    pub feels_like: f64,
    /// Relative humidity in percent
    #[serde(default)]
    pub humidity: u8,
}

/// Condition summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    /// Short description, e.g. "light rain"
    pub description: String,
    /// Icon code, e.g. "10d"
    pub icon: String,
}

impl WeatherCondition {
    /// URL of the provider's icon image for this condition.
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }
}

/// Wind block of a weather response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// Speed in m/s
    #[serde(default)]
    pub speed: f64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_symbol_match_from_provider_keys() {
        let value = json!({
            "1. symbol": "AAPL",
            "2. name": "Apple Inc",
            "3. type": "Equity",
            "4. region": "United States",
            "8. currency": "USD",
            "9. matchScore": "1.0000"
        });
        let symbol: SymbolMatch = serde_json::from_value(value).unwrap();
        assert_eq!(symbol.symbol, "AAPL");
        assert_eq!(symbol.kind, "Equity");
        assert!(symbol.timezone.is_empty());
        assert_eq!(symbol.to_string(), "AAPL - Apple Inc");
    }

    #[test]
    fn test_article_tolerates_nulls() {
        let value = json!({
            "source": { "id": null, "name": "Example Times" },
            "author": null,
            "title": "Markets rally",
            "description": null,
            "url": "https://example.com/markets",
            "urlToImage": null,
            "publishedAt": "2024-03-04T09:30:00Z",
            "content": null
        });
        let article: Article = serde_json::from_value(value).unwrap();
        assert_eq!(article.source.name, "Example Times");
        assert_eq!(
            article.published_label().as_deref(),
            Some("March 4, 2024 at 09:30")
        );
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Business".parse::<NewsCategory>(), Ok(NewsCategory::Business));
        assert!("weather".parse::<NewsCategory>().is_err());
    }

    #[test]
    fn test_interval_function_and_series_key() {
        assert_eq!(TimeInterval::Daily.function_name(), "TIME_SERIES_DAILY");
        assert_eq!(TimeInterval::Daily.series_key(), "Time Series (Daily)");
        let five: TimeInterval = "5min".parse().unwrap();
        assert_eq!(five.function_name(), "TIME_SERIES_INTRADAY");
        assert_eq!(five.series_key(), "Time Series (5min)");
    }

    #[test]
    fn test_price_point_rejects_garbage() {
        let bar = RawBar {
            open: "1.0".to_string(),
            high: "2.0".to_string(),
            low: "0.5".to_string(),
            close: "n/a".to_string(),
            volume: "100".to_string(),
        };
        assert!(PricePoint::from_raw("2024-01-02".to_string(), &bar).is_none());
    }

    #[test]
    fn test_city_display() {
        let city = City {
            name: "Portland".to_string(),
            country: "US".to_string(),
            state: Some("Oregon".to_string()),
            lat: 45.5,
            lon: -122.6,
        };
        assert_eq!(city.to_string(), "Portland, Oregon, US");
    }
}
