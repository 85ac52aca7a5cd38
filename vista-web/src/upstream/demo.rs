//! Canned provider responses for offline development.
//!
//! Payloads have the same shape as the real providers' so the client side
//! cannot tell the difference. Output is a pure function of the request.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, TimeZone, Utc};
use serde_json::{Map, Value, json};

use super::{Endpoint, Upstream, UpstreamRequest};
use crate::errors::ProxyError;

/// (name, state, country, lat, lon)
const CITIES: &[(&str, Option<&str>, &str, f64, f64)] = &[
    ("Lisbon", None, "PT", 38.7077, -9.1366),
    ("London", Some("England"), "GB", 51.5073, -0.1276),
    ("London", Some("Ontario"), "CA", 42.9832, -81.2434),
    ("Los Angeles", Some("California"), "US", 34.0536, -118.2427),
    ("Paris", Some("Ile-de-France"), "FR", 48.8588, 2.3200),
    ("Paris", Some("Texas"), "US", 33.6609, -95.5555),
    ("Portland", Some("Oregon"), "US", 45.5202, -122.6742),
    ("Portland", Some("Maine"), "US", 43.6591, -70.2568),
    ("Porto", None, "PT", 41.1496, -8.6110),
    ("Tokyo", None, "JP", 35.6828, 139.7595),
    ("Toronto", Some("Ontario"), "CA", 43.6535, -79.3839),
    ("Sydney", Some("New South Wales"), "AU", -33.8698, 151.2083),
];

/// (symbol, name, type, region, currency)
const SYMBOLS: &[(&str, &str, &str, &str, &str)] = &[
    ("AAPL", "Apple Inc", "Equity", "United States", "USD"),
    ("AAL", "American Airlines Group Inc", "Equity", "United States", "USD"),
    ("AMZN", "Amazon.com Inc", "Equity", "United States", "USD"),
    ("AMD", "Advanced Micro Devices Inc", "Equity", "United States", "USD"),
    ("GOOGL", "Alphabet Inc - Class A", "Equity", "United States", "USD"),
    ("IBM", "International Business Machines Corp", "Equity", "United States", "USD"),
    ("MSFT", "Microsoft Corporation", "Equity", "United States", "USD"),
    ("NVDA", "NVIDIA Corporation", "Equity", "United States", "USD"),
    ("TSLA", "Tesla Inc", "Equity", "United States", "USD"),
    ("TSCO.LON", "Tesco PLC", "Equity", "United Kingdom", "GBX"),
    ("VOO", "Vanguard S&P 500 ETF", "ETF", "United States", "USD"),
];

/// Articles available per category or search term.
const ARTICLES_PER_FEED: usize = 35;

/// Serves deterministic demo data for every endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoUpstream;

impl DemoUpstream {
    /// Create the demo upstream.
    pub fn new() -> Self {
        Self
    }

    fn geocoding(request: &UpstreamRequest) -> Value {
        let query = request.get("q").unwrap_or_default().trim().to_lowercase();
        let limit = parse_or(request.get("limit"), 5);
        let matches: Vec<Value> = CITIES
            .iter()
            .filter(|(name, ..)| !query.is_empty() && name.to_lowercase().starts_with(&query))
            .take(limit)
            .map(|(name, state, country, lat, lon)| {
                let mut city = json!({ "name": name, "country": country, "lat": lat, "lon": lon });
                if let Some(state) = state {
                    city["state"] = json!(state);
                }
                city
            })
            .collect();
        Value::Array(matches)
    }

    fn weather(request: &UpstreamRequest) -> Value {
        let (name, seed) = location(request);
        json!({
            "name": name,
            "coord": { "lat": request.get("lat"), "lon": request.get("lon") },
            "main": {
                "temp": 12.0 + (seed % 150) as f64 / 10.0,
                "feels_like": 11.0 + (seed % 150) as f64 / 10.0,
                "humidity": 40 + seed % 50,
            },
            "weather": [condition(seed)],
            "wind": { "speed": (seed % 90) as f64 / 10.0 },
        })
    }

    fn forecast(request: &UpstreamRequest) -> Value {
        let (name, seed) = location(request);
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
        let list: Vec<Value> = (0..40u64)
            .map(|step| {
                let at = start.map(|s| s + ChronoDuration::hours(3 * step as i64));
                json!({
                    "dt": at.map(|t| t.timestamp()),
                    "dt_txt": at.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
                    "main": { "temp": 10.0 + ((seed + step * 7) % 120) as f64 / 10.0 },
                    "weather": [condition(seed + step)],
                })
            })
            .collect();
        json!({ "cnt": list.len(), "city": { "name": name }, "list": list })
    }

    fn news(request: &UpstreamRequest) -> Value {
        let topic = request
            .get("q")
            .or_else(|| request.get("category"))
            .unwrap_or("general")
            .to_string();
        let page = parse_or(request.get("page"), 1).max(1);
        let page_size = parse_or(request.get("pageSize"), 10);
        let start = (page - 1).saturating_mul(page_size);
        let end = ARTICLES_PER_FEED.min(start.saturating_add(page_size));

        let published = NaiveDate::from_ymd_opt(2024, 3, 4)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .map(|t| t.and_utc());
        let articles: Vec<Value> = (start..end)
            .map(|n| {
                let at = published.map(|t| t - ChronoDuration::minutes(17 * n as i64));
                json!({
                    "source": { "id": null, "name": "Vista Wire" },
                    "author": "Demo Desk",
                    "title": format!("{} story {}", title_case(&topic), n + 1),
                    "description": format!("Demo coverage of {topic}, item {}.", n + 1),
                    "url": format!("https://example.com/{}/{}", topic.replace(' ', "-"), n + 1),
                    "urlToImage": null,
                    "publishedAt": at.map(|t| t.to_rfc3339()),
                    "content": null,
                })
            })
            .collect();

        json!({ "status": "ok", "totalResults": ARTICLES_PER_FEED, "articles": articles })
    }

    fn finance(request: &UpstreamRequest) -> Value {
        match request.get("function") {
            Some("SYMBOL_SEARCH") => Self::symbol_search(request.get("keywords").unwrap_or("")),
            Some("GLOBAL_QUOTE") => Self::quote(request.get("symbol").unwrap_or("")),
            Some("TIME_SERIES_DAILY") => {
                Self::time_series(request.get("symbol").unwrap_or(""), None)
            }
            Some("TIME_SERIES_INTRADAY") => {
                Self::time_series(request.get("symbol").unwrap_or(""), request.get("interval"))
            }
            _ => json!({
                "Error Message": "Invalid API call. Please retry or visit the documentation for TIME_SERIES_DAILY."
            }),
        }
    }

    fn symbol_search(keywords: &str) -> Value {
        let keywords = keywords.trim().to_uppercase();
        let matches: Vec<Value> = SYMBOLS
            .iter()
            .filter(|(symbol, name, ..)| {
                !keywords.is_empty()
                    && (symbol.starts_with(&keywords) || name.to_uppercase().contains(&keywords))
            })
            .map(|(symbol, name, kind, region, currency)| {
                let score = if symbol.starts_with(&keywords) { "1.0000" } else { "0.5000" };
                json!({
                    "1. symbol": symbol,
                    "2. name": name,
                    "3. type": kind,
                    "4. region": region,
                    "5. marketOpen": "09:30",
                    "6. marketClose": "16:00",
                    "7. timezone": "UTC-04",
                    "8. currency": currency,
                    "9. matchScore": score,
                })
            })
            .collect();
        json!({ "bestMatches": matches })
    }

    fn quote(symbol: &str) -> Value {
        let symbol = symbol.trim().to_uppercase();
        if !SYMBOLS.iter().any(|(known, ..)| *known == symbol) {
            return json!({ "Global Quote": {} });
        }
        let base = price_seed(&symbol);
        let change = (base % 7.0) - 3.0;
        json!({
            "Global Quote": {
                "01. symbol": symbol,
                "02. open": format!("{:.4}", base - 1.0),
                "03. high": format!("{:.4}", base + 2.0),
                "04. low": format!("{:.4}", base - 2.5),
                "05. price": format!("{:.4}", base),
                "06. volume": "1234567",
                "07. latest trading day": "2024-03-04",
                "08. previous close": format!("{:.4}", base - change),
                "09. change": format!("{:.4}", change),
                "10. change percent": format!("{:.4}%", change / (base - change) * 100.0),
            }
        })
    }

    fn time_series(symbol: &str, interval: Option<&str>) -> Value {
        let base = price_seed(&symbol.trim().to_uppercase());
        let (key, step_minutes) = match interval {
            None => ("Time Series (Daily)".to_string(), 24 * 60),
            Some(interval) => {
                let minutes = interval.trim_end_matches("min").parse::<i64>().unwrap_or(5);
                (format!("Time Series ({interval})"), minutes)
            }
        };

        let mut series = Map::new();
        let Some(end) = NaiveDate::from_ymd_opt(2024, 3, 4).and_then(|d| d.and_hms_opt(16, 0, 0))
        else {
            return json!({});
        };
        for step in 0..30i64 {
            let at = end - ChronoDuration::minutes(step_minutes * step);
            let timestamp = if interval.is_none() {
                at.format("%Y-%m-%d").to_string()
            } else {
                at.format("%Y-%m-%d %H:%M:%S").to_string()
            };
            let close = base + ((step * 13) % 9) as f64 - 4.0;
            series.insert(
                timestamp,
                json!({
                    "1. open": format!("{:.4}", close - 0.5),
                    "2. high": format!("{:.4}", close + 1.25),
                    "3. low": format!("{:.4}", close - 1.5),
                    "4. close": format!("{:.4}", close),
                    "5. volume": format!("{}", 100_000 + step * 2_500),
                }),
            );
        }

        let mut body = Map::new();
        body.insert("Meta Data".to_string(), json!({ "2. Symbol": symbol }));
        body.insert(key, Value::Object(series));
        Value::Object(body)
    }
}

#[async_trait]
impl Upstream for DemoUpstream {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, ProxyError> {
        tracing::debug!("Serving demo {}", request.cache_key());
        Ok(match request.endpoint {
            Endpoint::Geocoding => Self::geocoding(request),
            Endpoint::Weather => Self::weather(request),
            Endpoint::Forecast => Self::forecast(request),
            Endpoint::TopHeadlines | Endpoint::Everything => Self::news(request),
            Endpoint::Finance => Self::finance(request),
        })
    }

    fn label(&self) -> &'static str {
        "demo"
    }
}

fn parse_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(default)
}

/// Display name and a stable seed for a weather request.
fn location(request: &UpstreamRequest) -> (String, u64) {
    let name = match (request.get("q"), request.get("lat"), request.get("lon")) {
        (Some(city), _, _) => city.to_string(),
        (None, Some(lat), Some(lon)) => CITIES
            .iter()
            .find(|(_, _, _, clat, clon)| {
                lat.parse::<f64>().is_ok_and(|v| (v - clat).abs() < 0.5)
                    && lon.parse::<f64>().is_ok_and(|v| (v - clon).abs() < 0.5)
            })
            .map(|(name, ..)| name.to_string())
            .unwrap_or_else(|| format!("{lat}, {lon}")),
        _ => "Unknown".to_string(),
    };
    let seed = name.bytes().fold(7u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
    (name, seed)
}

fn condition(seed: u64) -> Value {
    const CONDITIONS: [(&str, &str); 4] = [
        ("clear sky", "01d"),
        ("few clouds", "02d"),
        ("light rain", "10d"),
        ("overcast clouds", "04d"),
    ];
    let (description, icon) = CONDITIONS[(seed % CONDITIONS.len() as u64) as usize];
    json!({ "main": description, "description": description, "icon": icon })
}

fn price_seed(symbol: &str) -> f64 {
    let seed = symbol.bytes().fold(0u64, |acc, b| acc * 7 + b as u64);
    50.0 + (seed % 400) as f64 + 0.25
}

fn title_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_geocoding_prefix_and_limit() {
        let request = UpstreamRequest::new(Endpoint::Geocoding)
            .param("q", "por")
            .param("limit", "5");
        let body = DemoUpstream.fetch(&request).await.unwrap();
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Portland", "Portland", "Porto"]);
    }

    #[tokio::test]
    async fn test_news_pages_end_with_partial_page() {
        let page = |n: &str| {
            UpstreamRequest::new(Endpoint::TopHeadlines)
                .param("country", "us")
                .param("page", n)
                .param("pageSize", "10")
        };
        let first = DemoUpstream.fetch(&page("1")).await.unwrap();
        let last = DemoUpstream.fetch(&page("4")).await.unwrap();
        let beyond = DemoUpstream.fetch(&page("5")).await.unwrap();

        assert_eq!(first["articles"].as_array().unwrap().len(), 10);
        assert_eq!(last["articles"].as_array().unwrap().len(), 5);
        assert!(beyond["articles"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_symbol_search_matches_symbol_prefix() {
        let request = UpstreamRequest::new(Endpoint::Finance)
            .param("function", "SYMBOL_SEARCH")
            .param("keywords", "AA");
        let body = DemoUpstream.fetch(&request).await.unwrap();
        let matches = body["bestMatches"].as_array().unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0]["1. symbol"], "AAPL");
    }

    #[tokio::test]
    async fn test_unknown_function_is_provider_error_body() {
        let request = UpstreamRequest::new(Endpoint::Finance).param("function", "NOPE");
        let body = DemoUpstream.fetch(&request).await.unwrap();
        assert!(body.get("Error Message").is_some());
    }

    #[tokio::test]
    async fn test_output_is_deterministic() {
        let request = UpstreamRequest::new(Endpoint::Weather).param("q", "Lisbon");
        assert_eq!(
            DemoUpstream.fetch(&request).await.unwrap(),
            DemoUpstream.fetch(&request).await.unwrap()
        );
    }
}
