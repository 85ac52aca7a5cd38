use async_trait::async_trait;
use vista_core::{ResultPage, SearchError, SearchPolicy, SearchRequest, SearchSource};

use crate::client::ProxyClient;
use crate::types::City;

/// City lookup for the weather view.
///
/// The geocoder returns at most five places and has no paging, so the
/// coordinator treats every result set as complete.
#[derive(Debug, Clone)]
pub struct CitySearch {
    client: ProxyClient,
}

impl CitySearch {
    /// Places shown per lookup.
    pub const LIMIT: u32 = 5;

    /// Shortest query worth sending to the geocoder.
    pub const MIN_QUERY_LEN: usize = 3;

    /// Create a city search over the given proxy.
    pub fn new(client: ProxyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchSource for CitySearch {
    type Item = City;

    async fn search(&self, request: &SearchRequest) -> Result<ResultPage<City>, SearchError> {
        if !request.has_query() {
            return Ok(ResultPage::empty());
        }

        let params = [
            ("endpoint", "geocoding".to_string()),
            ("city", request.query.trim().to_string()),
        ];
        let mut cities: Vec<City> = self.client.get_json("/api/weather", &params).await?;
        cities.truncate(Self::LIMIT as usize);

        tracing::debug!("Geocoder matched {} places for {:?}", cities.len(), request.query);
        Ok(ResultPage::new(cities))
    }

    fn policy(&self) -> SearchPolicy {
        SearchPolicy::new(Self::MIN_QUERY_LEN, Self::LIMIT, false)
    }
}
