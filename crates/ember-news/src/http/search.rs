//! Client for the places search service.

use async_trait::async_trait;
use ember_core::{AppConfig, Coordinate};
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{build_client, check_status, endpoint_url, normalise_base_url};
use crate::error::ProviderError;
use crate::provider::SearchProvider;
use crate::types::{PoiCategory, RawResult};

const NEARBY_PATH: &str = "v1/places/nearby";
const TEXT_SEARCH_PATH: &str = "v1/places/search";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<PlaceDto>,
}

#[derive(Debug, Deserialize)]
struct PlaceDto {
    name: Option<String>,
    title: Option<String>,
    locality: Option<String>,
    url: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    category: Option<String>,
}

impl PlaceDto {
    /// `None` when the place has no usable position.
    fn into_raw(self) -> Option<RawResult> {
        let coordinate = Coordinate::new(self.latitude?, self.longitude?);
        if !coordinate.is_valid() {
            return None;
        }
        Some(RawResult {
            name: self.name,
            title: self.title,
            locality: self.locality,
            url: self.url,
            coordinate,
            category: self.category,
        })
    }
}

/// [`SearchProvider`] backed by the places REST API.
///
/// - Category mode: `GET {base}/v1/places/nearby?lat=&lon=&radius=&categories=a,b`
/// - Text mode: `GET {base}/v1/places/search?lat=&lon=&radius=&q=`
///
/// Use [`HttpSearchClient::new`] with a mock server URL in tests.
pub struct HttpSearchClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpSearchClient {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ProviderError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            base_url: normalise_base_url(base_url)?,
            api_key: api_key.map(str::to_owned),
        })
    }

    /// # Errors
    ///
    /// See [`HttpSearchClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::new(
            &config.search_base_url,
            config.search_api_key.as_deref(),
            config.http_timeout_secs,
            &config.user_agent,
        )
    }

    fn nearby_url(
        &self,
        anchor: Coordinate,
        radius_meters: f64,
        categories: &[PoiCategory],
    ) -> Result<Url, ProviderError> {
        let lat = anchor.latitude.to_string();
        let lon = anchor.longitude.to_string();
        let radius = format!("{radius_meters:.0}");
        let categories = categories
            .iter()
            .map(PoiCategory::as_str)
            .collect::<Vec<_>>()
            .join(",");
        endpoint_url(
            &self.base_url,
            NEARBY_PATH,
            &[
                ("lat", &lat),
                ("lon", &lon),
                ("radius", &radius),
                ("categories", &categories),
            ],
            self.api_key.as_deref(),
        )
    }

    fn text_url(
        &self,
        anchor: Coordinate,
        radius_meters: f64,
        query: &str,
    ) -> Result<Url, ProviderError> {
        let lat = anchor.latitude.to_string();
        let lon = anchor.longitude.to_string();
        let radius = format!("{radius_meters:.0}");
        endpoint_url(
            &self.base_url,
            TEXT_SEARCH_PATH,
            &[("lat", &lat), ("lon", &lon), ("radius", &radius), ("q", query)],
            self.api_key.as_deref(),
        )
    }

    async fn fetch_places(&self, url: Url, context: &str) -> Result<Vec<RawResult>, ProviderError> {
        let response = self.client.get(url).send().await?;
        let response = check_status(response, "search").await?;
        let body = response.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                context: context.to_owned(),
                source: e,
            })?;

        let total = parsed.results.len();
        let places: Vec<RawResult> = parsed
            .results
            .into_iter()
            .filter_map(PlaceDto::into_raw)
            .collect();
        if places.len() < total {
            tracing::debug!(
                skipped = total - places.len(),
                context,
                "skipped places without a valid position"
            );
        }
        Ok(places)
    }
}

#[async_trait]
impl SearchProvider for HttpSearchClient {
    async fn search_by_category(
        &self,
        anchor: Coordinate,
        radius_meters: f64,
        categories: &[PoiCategory],
    ) -> Result<Vec<RawResult>, ProviderError> {
        let url = self.nearby_url(anchor, radius_meters, categories)?;
        self.fetch_places(url, "nearby search").await
    }

    async fn search_by_text(
        &self,
        anchor: Coordinate,
        radius_meters: f64,
        query: &str,
    ) -> Result<Vec<RawResult>, ProviderError> {
        let url = self.text_url(anchor, radius_meters, query)?;
        self.fetch_places(url, "text search").await
    }

    fn name(&self) -> &'static str {
        "places-http"
    }
}
