//! Search results, imagery and the published snapshot.

use ember_core::Coordinate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enrichment::EnrichmentCache;
use crate::staleness::StalenessRecord;

/// Display name used when the provider returns an unnamed place.
pub const DEFAULT_ITEM_NAME: &str = "Local Story";

/// Separator the provider uses between parts of a place title.
const TITLE_SEPARATOR: char = '\u{B7}';

/// Point-of-interest categories understood by the search provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoiCategory {
    Library,
    Museum,
    Stadium,
    University,
    School,
    Park,
    Theater,
}

impl PoiCategory {
    /// Places likely to generate local stories; the primary query's filter.
    pub const STORY_SOURCES: [PoiCategory; 7] = [
        PoiCategory::Library,
        PoiCategory::Museum,
        PoiCategory::Stadium,
        PoiCategory::University,
        PoiCategory::School,
        PoiCategory::Park,
        PoiCategory::Theater,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PoiCategory::Library => "library",
            PoiCategory::Museum => "museum",
            PoiCategory::Stadium => "stadium",
            PoiCategory::University => "university",
            PoiCategory::School => "school",
            PoiCategory::Park => "park",
            PoiCategory::Theater => "theater",
        }
    }
}

impl std::fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A place as returned by the search provider, before mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    pub name: Option<String>,
    /// Full display title, parts separated by `·`.
    pub title: Option<String>,
    pub locality: Option<String>,
    pub url: Option<String>,
    pub coordinate: Coordinate,
    /// Provider category string, if any.
    pub category: Option<String>,
}

impl RawResult {
    /// Minimal result with only a name and position.
    #[must_use]
    pub fn named(name: &str, coordinate: Coordinate) -> Self {
        Self {
            name: Some(name.to_owned()),
            title: None,
            locality: None,
            url: None,
            coordinate,
            category: None,
        }
    }
}

/// One published story location.
///
/// `id` is fresh for every fetch cycle, even for the same physical place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub id: Uuid,
    pub name: String,
    pub subtitle: Option<String>,
    pub link_url: Option<String>,
    pub coordinate: Coordinate,
    /// Meters from the anchor the query ran around.
    pub distance_from_anchor_m: Option<f64>,
    pub category: Option<String>,
}

impl ResultItem {
    /// Map a provider result, computing its distance from `anchor` when known.
    #[must_use]
    pub fn from_raw(raw: &RawResult, anchor: Option<Coordinate>) -> Self {
        let name = raw
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_ITEM_NAME)
            .to_owned();

        Self {
            id: Uuid::new_v4(),
            name,
            subtitle: derive_subtitle(raw),
            link_url: raw.url.clone(),
            coordinate: raw.coordinate,
            distance_from_anchor_m: anchor
                .map(|origin| ember_core::geo::distance_meters(origin, raw.coordinate)),
            category: raw.category.clone(),
        }
    }

    /// Human-readable distance: `"1.2 km"` from a kilometer up, else `"850 m"`.
    #[must_use]
    pub fn distance_text(&self) -> Option<String> {
        let meters = self.distance_from_anchor_m?;
        if meters >= 1_000.0 {
            Some(format!("{:.1} km", meters / 1_000.0))
        } else {
            Some(format!("{meters:.0} m"))
        }
    }
}

/// First `·` segment of the title, else the locality, else the category.
fn derive_subtitle(raw: &RawResult) -> Option<String> {
    let category = || raw.category.clone().filter(|c| !c.is_empty());

    if let Some(title) = raw.title.as_deref() {
        let first = title.split(TITLE_SEPARATOR).next().map(str::trim);
        return match first {
            Some(piece) if !piece.is_empty() => Some(piece.to_owned()),
            _ => category(),
        };
    }
    if let Some(locality) = raw.locality.as_deref() {
        return Some(locality.to_owned());
    }
    category()
}

/// Secondary imagery for a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub image_url: String,
    pub heading_degrees: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchPhase {
    /// No fetch has run yet.
    #[default]
    Idle,
    /// Primary/fallback queries in flight.
    Fetching,
    /// Items published; imagery still arriving.
    Enriching,
    Completed,
    /// Stopped before completing; items are whatever was last published.
    Cancelled,
    Failed,
}

/// Read-only view of everything the UI observes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewsSnapshot {
    pub items: Vec<ResultItem>,
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub phase: FetchPhase,
    /// Anchor and time of the last successful fetch.
    pub last_fetch: Option<StalenessRecord>,
    pub assets: EnrichmentCache,
}

impl NewsSnapshot {
    #[must_use]
    pub fn asset_for(&self, id: Uuid) -> Option<&Asset> {
        self.assets.get(id)
    }

    /// Items paired with their asset, in published order.
    #[must_use]
    pub fn items_with_assets(&self) -> Vec<(&ResultItem, Option<&Asset>)> {
        self.items
            .iter()
            .map(|item| (item, self.assets.get(item.id)))
            .collect()
    }

    /// Count of published items that have imagery.
    #[must_use]
    pub fn enriched_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| self.assets.has(item.id))
            .count()
    }
}
