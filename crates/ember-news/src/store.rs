//! Observable news state for one map view.

use std::sync::Arc;

use ember_core::{AppConfig, Coordinate};
use tokio::sync::watch;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::coordinator::{FetchCoordinator, RefreshHandle, SearchSettings};
use crate::provider::{EnrichmentProvider, SearchProvider};
use crate::staleness::StalenessGate;
use crate::types::{Asset, NewsSnapshot, ResultItem};

/// Publishes the current result list, loading flag, error text and imagery,
/// and starts fetch cycles as the map moves.
///
/// Readers get consistent snapshots through [`NewsStore::snapshot`] or a
/// [`watch::Receiver`] from [`NewsStore::subscribe`]. Only the in-flight
/// cycle ever writes. Dropping the store cancels that cycle.
pub struct NewsStore {
    state: Arc<watch::Sender<NewsSnapshot>>,
    coordinator: FetchCoordinator,
    gate: StalenessGate,
    clock: Arc<dyn Clock>,
}

impl NewsStore {
    /// Store with default search settings, default staleness thresholds and
    /// the system clock.
    #[must_use]
    pub fn new(
        search: Arc<dyn SearchProvider>,
        enrichment: Arc<dyn EnrichmentProvider>,
    ) -> Self {
        Self::with_parts(
            search,
            enrichment,
            SearchSettings::default(),
            StalenessGate::default(),
            Arc::new(SystemClock),
        )
    }

    #[must_use]
    pub fn with_parts(
        search: Arc<dyn SearchProvider>,
        enrichment: Arc<dyn EnrichmentProvider>,
        settings: SearchSettings,
        gate: StalenessGate,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (state, _) = watch::channel(NewsSnapshot::default());
        Self {
            state: Arc::new(state),
            coordinator: FetchCoordinator::new(search, enrichment, settings),
            gate,
            clock,
        }
    }

    #[must_use]
    pub fn from_app_config(
        config: &AppConfig,
        search: Arc<dyn SearchProvider>,
        enrichment: Arc<dyn EnrichmentProvider>,
    ) -> Self {
        Self::with_parts(
            search,
            enrichment,
            SearchSettings::from_app_config(config),
            StalenessGate::from_app_config(config),
            Arc::new(SystemClock),
        )
    }

    /// Request a refresh around `anchor`.
    ///
    /// Unless `force` is set, the staleness gate may suppress the request,
    /// in which case nothing changes and `None` is returned. Otherwise any
    /// in-flight cycle is cancelled and a new one starts.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn refresh(&self, anchor: Coordinate, force: bool) -> Option<RefreshHandle> {
        if !force {
            let last_fetch = self.state.borrow().last_fetch;
            let now = self.clock.now();
            if !self.gate.should_fetch(last_fetch.as_ref(), anchor, now) {
                tracing::debug!(anchor = %anchor, "refresh suppressed by staleness gate");
                return None;
            }
        }

        let handle = self
            .coordinator
            .start(anchor, Arc::clone(&self.state), Arc::clone(&self.clock));
        tracing::debug!(cycle = handle.cycle(), anchor = %anchor, force, "refresh started");
        Some(handle)
    }

    #[must_use]
    pub fn snapshot(&self) -> NewsSnapshot {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn items(&self) -> Vec<ResultItem> {
        self.state.borrow().items.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    #[must_use]
    pub fn asset_for(&self, id: Uuid) -> Option<Asset> {
        self.state.borrow().asset_for(id).cloned()
    }

    /// Receiver that is notified on every published change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NewsSnapshot> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn settings(&self) -> &SearchSettings {
        self.coordinator.settings()
    }

    #[must_use]
    pub fn gate(&self) -> &StalenessGate {
        &self.gate
    }
}
