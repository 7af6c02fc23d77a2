//! `refresh` and `watch` command handlers.

use std::sync::Arc;
use std::time::Duration;

use ember_core::{AppConfig, Coordinate};
use ember_news::{
    EnrichmentProvider, HttpSceneClient, HttpSearchClient, NewsSnapshot, NewsStore, NoEnrichment,
    SearchProvider,
};

/// Build a store wired to the configured HTTP services.
///
/// Imagery lookups are disabled when `EMBER_ENRICHMENT_BASE_URL` is unset.
pub(crate) fn build_store(config: &AppConfig) -> anyhow::Result<NewsStore> {
    let search = HttpSearchClient::from_app_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build search client: {e}"))?;
    let enrichment: Arc<dyn EnrichmentProvider> = match HttpSceneClient::from_app_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build scene client: {e}"))?
    {
        Some(client) => Arc::new(client),
        None => {
            tracing::info!("no enrichment service configured; imagery disabled");
            Arc::new(NoEnrichment)
        }
    };

    Ok(NewsStore::from_app_config(
        config,
        Arc::new(search) as Arc<dyn SearchProvider>,
        enrichment,
    ))
}

/// Run one refresh cycle to completion and print the result.
pub(crate) async fn run_refresh(
    config: &AppConfig,
    anchor: Coordinate,
    force: bool,
    json: bool,
) -> anyhow::Result<()> {
    let store = build_store(config)?;
    tracing::info!(
        radius_meters = store.settings().radius_meters,
        max_items = store.settings().max_items,
        "searching for stories"
    );
    let Some(handle) = store.refresh(anchor, force) else {
        println!("results around {anchor} are still fresh; nothing to do");
        return Ok(());
    };

    let outcome = handle.outcome().await;
    tracing::debug!(?outcome, "refresh finished");

    let snapshot = store.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render_snapshot(anchor, &snapshot));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub(crate) struct WatchPlan {
    pub(crate) start: Coordinate,
    pub(crate) step_meters: f64,
    pub(crate) interval: Duration,
    pub(crate) ticks: u32,
}

/// Move the anchor north every tick and request a (gated) refresh each time.
///
/// Prints which ticks started a cycle, how each cycle ended, then the final
/// published state.
pub(crate) async fn run_watch(config: &AppConfig, plan: &WatchPlan) -> anyhow::Result<()> {
    let store = build_store(config)?;
    println!(
        "gate: refetch after {}s or {:.0} m of movement",
        store.gate().max_age.num_seconds(),
        store.gate().max_distance_meters
    );
    let mut ticker = tokio::time::interval(plan.interval);
    let mut anchor = plan.start;
    let mut handles = Vec::new();

    for tick in 1..=plan.ticks {
        ticker.tick().await;
        match store.refresh(anchor, false) {
            Some(handle) => {
                println!("tick {tick}: refreshing around {anchor} (cycle {})", handle.cycle());
                handles.push(handle);
            }
            None => println!("tick {tick}: {anchor} still fresh, skipped"),
        }
        anchor = anchor.offset_north(plan.step_meters);
    }

    for handle in handles {
        let cycle = handle.cycle();
        let outcome = handle.outcome().await;
        println!("cycle {cycle}: {outcome:?}");
    }

    let snapshot = store.snapshot();
    let last_anchor = snapshot
        .last_fetch
        .map_or(plan.start, |record| record.anchor);
    print!("{}", render_snapshot(last_anchor, &snapshot));
    Ok(())
}

/// Plain-text listing of a snapshot.
pub(crate) fn render_snapshot(anchor: Coordinate, snapshot: &NewsSnapshot) -> String {
    let mut out = String::new();

    if let Some(error) = &snapshot.last_error {
        out.push_str(&format!("! {error}\n"));
    }
    out.push_str(&format!(
        "{} stories near {anchor} ({} with imagery)\n",
        snapshot.items.len(),
        snapshot.enriched_count()
    ));
    if let Some(record) = &snapshot.last_fetch {
        let local = record.fetched_at.with_timezone(&chrono::Local);
        out.push_str(&format!("fetched at {}\n", local.format("%H:%M:%S")));
    }

    for (n, (item, asset)) in snapshot.items_with_assets().into_iter().enumerate() {
        let mut line = format!("{:>2}. {}", n + 1, item.name);
        if let Some(subtitle) = &item.subtitle {
            line.push_str(&format!(" | {subtitle}"));
        }
        if let Some(distance) = item.distance_text() {
            line.push_str(&format!(" | {distance}"));
        }
        if let Some(asset) = asset {
            line.push_str(&format!(" | {}", asset.image_url));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}
