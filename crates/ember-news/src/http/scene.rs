//! Client for the street-level scene imagery service.

use async_trait::async_trait;
use ember_core::AppConfig;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use super::{build_client, check_status, endpoint_url, normalise_base_url};
use crate::error::ProviderError;
use crate::provider::EnrichmentProvider;
use crate::types::{Asset, RawResult};

const SCENES_PATH: &str = "v1/scenes";

#[derive(Debug, Deserialize)]
struct SceneResponse {
    scene: Option<SceneDto>,
}

#[derive(Debug, Deserialize)]
struct SceneDto {
    image_url: String,
    heading: Option<f64>,
}

/// [`EnrichmentProvider`] backed by `GET {base}/v1/scenes?lat=&lon=[&name=]`.
///
/// A 404, a 204 or a `null` scene all mean "no imagery here".
pub struct HttpSceneClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpSceneClient {
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

    /// `Ok(None)` when no imagery service is configured. Shares the search
    /// service's API key.
    ///
    /// # Errors
    ///
    /// See [`HttpSceneClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Option<Self>, ProviderError> {
        config
            .enrichment_base_url
            .as_deref()
            .map(|base_url| {
                Self::new(
                    base_url,
                    config.search_api_key.as_deref(),
                    config.http_timeout_secs,
                    &config.user_agent,
                )
            })
            .transpose()
    }

    fn scene_url(&self, place: &RawResult) -> Result<Url, ProviderError> {
        let lat = place.coordinate.latitude.to_string();
        let lon = place.coordinate.longitude.to_string();
        let mut params = vec![("lat", lat.as_str()), ("lon", lon.as_str())];
        if let Some(name) = place.name.as_deref().filter(|n| !n.trim().is_empty()) {
            params.push(("name", name));
        }
        endpoint_url(
            &self.base_url,
            SCENES_PATH,
            &params,
            self.api_key.as_deref(),
        )
    }
}

#[async_trait]
impl EnrichmentProvider for HttpSceneClient {
    async fn fetch_asset(&self, result: &RawResult) -> Result<Option<Asset>, ProviderError> {
        let url = self.scene_url(result)?;
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => return Ok(None),
            _ => {}
        }
        let response = check_status(response, "scene").await?;
        let body = response.text().await?;
        let parsed: SceneResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                context: format!("scene lookup at {}", result.coordinate),
                source: e,
            })?;

        Ok(parsed.scene.map(|scene| Asset {
            image_url: scene.image_url,
            heading_degrees: scene.heading,
        }))
    }

    fn name(&self) -> &'static str {
        "scenes-http"
    }
}
