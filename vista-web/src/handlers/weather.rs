//! `GET /api/weather`

use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;
use serde_json::Value;
use vista_core::Provider;

use super::{Cacheable, forward, non_empty};
use crate::errors::ProxyError;
use crate::server::AppState;
use crate::upstream::{Endpoint, UpstreamRequest};

/// Places returned per geocoding lookup.
const GEOCODING_LIMIT: &str = "5";

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub endpoint: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub city: Option<String>,
}

/// Current weather, forecast or geocoding, selected by `endpoint`.
///
/// Weather and forecast accept `lat`+`lon` (preferred) or `city`;
/// geocoding requires `city`.
pub async fn api_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<Value>, ProxyError> {
    state.upstream.check_credentials(Provider::OpenWeather)?;
    let request = weather_request(&query)?;
    forward(&state, request, |_| Ok(Cacheable::Yes)).await
}

fn weather_request(query: &WeatherQuery) -> Result<UpstreamRequest, ProxyError> {
    let endpoint = match query.endpoint.as_deref() {
        Some("weather") => Endpoint::Weather,
        Some("forecast") => Endpoint::Forecast,
        Some("geocoding") => Endpoint::Geocoding,
        _ => {
            return Err(ProxyError::InvalidRequest {
                reason: "Invalid endpoint".to_string(),
            });
        }
    };

    let lat = non_empty(&query.lat);
    let lon = non_empty(&query.lon);
    let city = non_empty(&query.city);

    let request = UpstreamRequest::new(endpoint);
    match (endpoint, lat, lon, city) {
        (Endpoint::Geocoding, _, _, Some(city)) => Ok(request
            .param("q", city)
            .param("limit", GEOCODING_LIMIT)),
        (Endpoint::Geocoding, ..) => Err(ProxyError::missing_parameters()),
        (_, Some(lat), Some(lon), _) => Ok(request
            .param("lat", lat)
            .param("lon", lon)
            .param("units", "metric")),
        (_, _, _, Some(city)) => Ok(request.param("q", city).param("units", "metric")),
        _ => Err(ProxyError::missing_parameters()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(endpoint: &str, lat: Option<&str>, lon: Option<&str>, city: Option<&str>) -> WeatherQuery {
        WeatherQuery {
            endpoint: Some(endpoint.to_string()),
            lat: lat.map(str::to_string),
            lon: lon.map(str::to_string),
            city: city.map(str::to_string),
        }
    }

    #[test]
    fn test_coordinates_win_over_city() {
        let request =
            weather_request(&query("weather", Some("38.7"), Some("-9.1"), Some("Lisbon"))).unwrap();
        assert_eq!(request.get("lat"), Some("38.7"));
        assert_eq!(request.get("q"), None);
        assert_eq!(request.get("units"), Some("metric"));
    }

    #[test]
    fn test_forecast_by_city() {
        let request = weather_request(&query("forecast", None, Some("1.0"), Some("Porto"))).unwrap();
        assert_eq!(request.endpoint, Endpoint::Forecast);
        assert_eq!(request.get("q"), Some("Porto"));
    }

    #[test]
    fn test_geocoding_needs_city() {
        let err = weather_request(&query("geocoding", Some("1"), Some("2"), None)).unwrap_err();
        assert_eq!(err.to_string(), "Missing required parameters");

        let request = weather_request(&query("geocoding", None, None, Some(" Lis "))).unwrap();
        assert_eq!(request.get("q"), Some("Lis"));
        assert_eq!(request.get("limit"), Some("5"));
    }

    #[test]
    fn test_unknown_endpoint() {
        let err = weather_request(&query("onecall", None, None, Some("Paris"))).unwrap_err();
        assert_eq!(err.to_string(), "Invalid endpoint");
    }
}
