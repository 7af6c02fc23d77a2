//! Seams to the remote services the pipeline consumes.

use async_trait::async_trait;
use ember_core::Coordinate;

use crate::error::ProviderError;
use crate::types::{Asset, PoiCategory, RawResult};

/// Location search service with a category mode and a free-text mode.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Places of the given categories within `radius_meters` of `anchor`.
    async fn search_by_category(
        &self,
        anchor: Coordinate,
        radius_meters: f64,
        categories: &[PoiCategory],
    ) -> Result<Vec<RawResult>, ProviderError>;

    /// Places matching `query` within `radius_meters` of `anchor`.
    async fn search_by_text(
        &self,
        anchor: Coordinate,
        radius_meters: f64,
        query: &str,
    ) -> Result<Vec<RawResult>, ProviderError>;

    fn name(&self) -> &'static str;
}

/// Imagery lookup for a single search result.
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    /// `Ok(None)` when the provider has nothing for this place.
    async fn fetch_asset(&self, result: &RawResult) -> Result<Option<Asset>, ProviderError>;

    fn name(&self) -> &'static str;
}

/// Enrichment provider used when no imagery service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnrichment;

#[async_trait]
impl EnrichmentProvider for NoEnrichment {
    async fn fetch_asset(&self, _result: &RawResult) -> Result<Option<Asset>, ProviderError> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
