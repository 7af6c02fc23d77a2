//! Proximity news refresh pipeline for the map view.
//!
//! Queries a location search service for story-worthy places around the map
//! anchor, falls back to a free-text search when that comes back empty,
//! publishes at most a handful of items, then enriches them one by one with
//! street-level imagery. Refreshes are gated by a time/distance heuristic and
//! a newer refresh always cancels the one in flight.

pub mod clock;
pub mod coordinator;
pub mod enrichment;
pub mod error;
pub mod http;
pub mod provider;
pub mod staleness;
pub mod store;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::{CycleOutcome, FetchCoordinator, RefreshHandle, SearchSettings};
pub use enrichment::EnrichmentCache;
pub use error::ProviderError;
pub use http::{HttpSceneClient, HttpSearchClient};
pub use provider::{EnrichmentProvider, NoEnrichment, SearchProvider};
pub use staleness::{StalenessGate, StalenessRecord};
pub use store::NewsStore;
pub use types::{Asset, FetchPhase, NewsSnapshot, PoiCategory, RawResult, ResultItem};
