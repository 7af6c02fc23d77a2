//! Single-flight fetch cycles: query, fall back, publish, enrich.
//!
//! Each cycle runs as its own Tokio task holding a [`CancellationToken`].
//! Starting a cycle cancels the previous one first ("latest request wins").
//! Every write a cycle makes to the published snapshot re-checks the token
//! while holding the snapshot lock, so a superseded cycle can never
//! overwrite newer state.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use ember_core::{AppConfig, Coordinate};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::clock::Clock;
use crate::error::{ProviderError, NO_STORIES_MESSAGE};
use crate::provider::{EnrichmentProvider, SearchProvider};
use crate::staleness::StalenessRecord;
use crate::types::{FetchPhase, NewsSnapshot, PoiCategory, RawResult, ResultItem};

pub const DEFAULT_SEARCH_RADIUS_METERS: f64 = 9_000.0;
pub const DEFAULT_FALLBACK_QUERY: &str = "news";
pub const DEFAULT_MAX_ITEMS: usize = 8;
/// The fallback query searches a wider area than the primary one.
pub const FALLBACK_RADIUS_FACTOR: f64 = 1.5;

/// What a fetch cycle asks the search provider for.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub radius_meters: f64,
    pub categories: Vec<PoiCategory>,
    pub fallback_query: String,
    pub max_items: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_SEARCH_RADIUS_METERS,
            categories: PoiCategory::STORY_SOURCES.to_vec(),
            fallback_query: DEFAULT_FALLBACK_QUERY.to_owned(),
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

impl SearchSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            radius_meters: config.search_radius_meters,
            fallback_query: config.fallback_query.clone(),
            max_items: config.max_items,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn fallback_radius_meters(&self) -> f64 {
        self.radius_meters * FALLBACK_RADIUS_FACTOR
    }
}

/// How a fetch cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Items were published and enrichment ran to the end.
    Completed { items: usize, enriched: usize },
    /// Superseded by a newer refresh; published state untouched.
    Cancelled,
    /// The query failed; `message` is what `last_error` now shows.
    Failed { message: String },
}

/// Handle to a started fetch cycle.
#[derive(Debug)]
pub struct RefreshHandle {
    cycle: u64,
    task: JoinHandle<CycleOutcome>,
}

impl RefreshHandle {
    /// Monotonic cycle number, starting at 1.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Wait for the cycle to finish, including enrichment.
    pub async fn outcome(self) -> CycleOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(err) if err.is_cancelled() => CycleOutcome::Cancelled,
            Err(err) => {
                tracing::error!(cycle = self.cycle, error = %err, "refresh task panicked");
                CycleOutcome::Failed {
                    message: format!("refresh task failed: {err}"),
                }
            }
        }
    }
}

pub(crate) type SharedSnapshot = Arc<watch::Sender<NewsSnapshot>>;

/// Owns the in-flight fetch cycle and the providers it talks to.
pub struct FetchCoordinator {
    search: Arc<dyn SearchProvider>,
    enrichment: Arc<dyn EnrichmentProvider>,
    settings: Arc<SearchSettings>,
    in_flight: Mutex<Option<CancellationToken>>,
    cycles: AtomicU64,
}

impl FetchCoordinator {
    #[must_use]
    pub fn new(
        search: Arc<dyn SearchProvider>,
        enrichment: Arc<dyn EnrichmentProvider>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            search,
            enrichment,
            settings: Arc::new(settings),
            in_flight: Mutex::new(None),
            cycles: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Cancel whatever is in flight, mark the snapshot as fetching, and
    /// spawn a new cycle around `anchor`.
    ///
    /// Must be called from within a Tokio runtime.
    pub(crate) fn start(
        &self,
        anchor: Coordinate,
        state: SharedSnapshot,
        clock: Arc<dyn Clock>,
    ) -> RefreshHandle {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let token = CancellationToken::new();
        if let Some(previous) = in_flight.replace(token.clone()) {
            previous.cancel();
        }
        let id = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;

        state.send_modify(|snapshot| {
            snapshot.is_loading = true;
            snapshot.last_error = None;
            snapshot.phase = FetchPhase::Fetching;
        });

        let cycle = Cycle {
            id,
            anchor,
            token,
            state,
            clock,
            search: Arc::clone(&self.search),
            enrichment: Arc::clone(&self.enrichment),
            settings: Arc::clone(&self.settings),
        };
        let span = tracing::info_span!("news_cycle", cycle = id, anchor = %anchor);
        let task = tokio::spawn(cycle.run().instrument(span));

        RefreshHandle { cycle: id, task }
    }

    /// Cancel the in-flight cycle, if any.
    pub(crate) fn cancel_in_flight(&self) {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = in_flight.take() {
            token.cancel();
        }
    }
}

impl Drop for FetchCoordinator {
    fn drop(&mut self) {
        self.cancel_in_flight();
    }
}

/// One fetch cycle's context, consumed by `run`.
struct Cycle {
    id: u64,
    anchor: Coordinate,
    token: CancellationToken,
    state: SharedSnapshot,
    clock: Arc<dyn Clock>,
    search: Arc<dyn SearchProvider>,
    enrichment: Arc<dyn EnrichmentProvider>,
    settings: Arc<SearchSettings>,
}

impl Cycle {
    async fn run(self) -> CycleOutcome {
        let results = match self.query().await {
            Ok(results) => results,
            Err(err) => return self.fail(&err),
        };

        let mapped: Vec<(ResultItem, RawResult)> = results
            .into_iter()
            .take(self.settings.max_items)
            .map(|raw| (ResultItem::from_raw(&raw, Some(self.anchor)), raw))
            .collect();
        let items: Vec<ResultItem> = mapped.iter().map(|(item, _)| item.clone()).collect();
        let item_count = items.len();

        let record = StalenessRecord {
            anchor: self.anchor,
            fetched_at: self.clock.now(),
        };
        let published = self.publish(|snapshot| {
            snapshot.items = items;
            snapshot.assets.clear();
            snapshot.is_loading = false;
            snapshot.last_fetch = Some(record);
            if item_count == 0 {
                snapshot.last_error = Some(NO_STORIES_MESSAGE.to_owned());
                snapshot.phase = FetchPhase::Completed;
            } else {
                snapshot.last_error = None;
                snapshot.phase = FetchPhase::Enriching;
            }
        });
        if !published {
            tracing::debug!("superseded before publish");
            return CycleOutcome::Cancelled;
        }
        tracing::info!(items = item_count, "published news items");

        let Some(enriched) = self.enrich(&mapped).await else {
            tracing::debug!("superseded during enrichment");
            return CycleOutcome::Cancelled;
        };

        if item_count > 0
            && !self.publish(|snapshot| snapshot.phase = FetchPhase::Completed)
        {
            return CycleOutcome::Cancelled;
        }
        tracing::debug!(items = item_count, enriched, "cycle complete");

        CycleOutcome::Completed {
            items: item_count,
            enriched,
        }
    }

    /// Primary category search, then the free-text fallback if it came back empty.
    async fn query(&self) -> Result<Vec<RawResult>, ProviderError> {
        let radius = self.settings.radius_meters;
        let primary = self
            .guarded(
                self.search
                    .search_by_category(self.anchor, radius, &self.settings.categories),
            )
            .await?;
        tracing::debug!(
            provider = self.search.name(),
            radius,
            count = primary.len(),
            "primary query returned"
        );
        if !primary.is_empty() {
            return Ok(primary);
        }

        let fallback_radius = self.settings.fallback_radius_meters();
        let fallback = self
            .guarded(self.search.search_by_text(
                self.anchor,
                fallback_radius,
                &self.settings.fallback_query,
            ))
            .await?;
        tracing::debug!(
            provider = self.search.name(),
            radius = fallback_radius,
            query = %self.settings.fallback_query,
            count = fallback.len(),
            "fallback query returned"
        );
        Ok(fallback)
    }

    /// Request imagery for each item in order, one at a time.
    ///
    /// Returns the number of assets stored, or `None` once cancelled.
    async fn enrich(&self, mapped: &[(ResultItem, RawResult)]) -> Option<usize> {
        let mut enriched = 0usize;
        for (item, raw) in mapped {
            if self.token.is_cancelled() {
                return None;
            }
            if self.state.borrow().assets.has(item.id) {
                continue;
            }

            match self.guarded(self.enrichment.fetch_asset(raw)).await {
                Ok(Some(asset)) => {
                    if !self.publish(|snapshot| snapshot.assets.set(item.id, asset)) {
                        return None;
                    }
                    enriched += 1;
                }
                Ok(None) => {
                    tracing::trace!(item = %item.name, "no imagery for item");
                }
                Err(_) if self.token.is_cancelled() => return None,
                Err(err) => {
                    tracing::debug!(
                        provider = self.enrichment.name(),
                        item = %item.name,
                        error = %err,
                        "imagery lookup failed; skipping item"
                    );
                }
            }
        }
        Some(enriched)
    }

    /// Record a query failure. Cancellation is silent.
    fn fail(&self, err: &ProviderError) -> CycleOutcome {
        if self.token.is_cancelled() {
            tracing::debug!("superseded during query");
            return CycleOutcome::Cancelled;
        }

        if err.is_cancellation() {
            // Provider gave up on its own while this cycle is still current.
            tracing::debug!("provider cancelled the query");
            self.publish(|snapshot| {
                snapshot.is_loading = false;
                snapshot.phase = FetchPhase::Cancelled;
            });
            return CycleOutcome::Cancelled;
        }
        let message = err.user_message().unwrap_or_else(|| err.to_string());

        tracing::warn!(provider = self.search.name(), error = %err, "news query failed");
        let published = self.publish(|snapshot| {
            snapshot.items.clear();
            snapshot.assets.clear();
            snapshot.is_loading = false;
            snapshot.last_error = Some(message.clone());
            snapshot.phase = FetchPhase::Failed;
        });
        if published {
            CycleOutcome::Failed { message }
        } else {
            CycleOutcome::Cancelled
        }
    }

    /// Race `fut` against this cycle's cancellation.
    async fn guarded<T, F>(&self, fut: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(ProviderError::Cancelled),
            result = fut => {
                if self.token.is_cancelled() {
                    Err(ProviderError::Cancelled)
                } else {
                    result
                }
            }
        }
    }

    /// Apply `change` to the published snapshot unless this cycle was cancelled.
    ///
    /// The token is checked under the snapshot lock. Returns whether the
    /// change was applied.
    fn publish(&self, change: impl FnOnce(&mut NewsSnapshot)) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|snapshot| {
            if self.token.is_cancelled() {
                return false;
            }
            change(snapshot);
            applied = true;
            true
        });
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_story_search() {
        let settings = SearchSettings::default();
        assert!((settings.radius_meters - 9_000.0).abs() < f64::EPSILON);
        assert!((settings.fallback_radius_meters() - 13_500.0).abs() < f64::EPSILON);
        assert_eq!(settings.fallback_query, "news");
        assert_eq!(settings.max_items, 8);
        assert_eq!(settings.categories, PoiCategory::STORY_SOURCES.to_vec());
    }
}
