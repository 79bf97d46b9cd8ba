use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::config::EngineConfig;
use crate::core::state::AppState;
use crate::engine::{http::HttpEngine, TorrentEngine};

pub fn build_engine(config: &EngineConfig) -> Result<Arc<dyn TorrentEngine>> {
    let engine = HttpEngine::new(config.endpoint.clone(), config.api_key.clone(), config.timeout())
        .context("Failed to create torrent engine client")?;

    Ok(Arc::new(engine))
}

/// Check that the engine answers before the first pass runs.
///
/// An unreachable engine is not fatal: every pass retries from scratch.
pub async fn probe_engine(state: &AppState) -> bool {
    match state.engine.list_torrent_ids().await {
        Ok(ids) => {
            info!(
                engine = state.engine.engine_type(),
                torrents = ids.len(),
                "Torrent engine reachable"
            );
            true
        }
        Err(e) => {
            warn!(
                engine = state.engine.engine_type(),
                error = %e,
                "Torrent engine unreachable, passes will retry on schedule"
            );
            false
        }
    }
}

/// Start periodic passes at the stored policy's interval, after the configured initial delay
pub fn start_schedule(state: &AppState) -> Result<()> {
    let policy = state.policy_store.policy();
    let every = policy
        .interval_period()
        .context(format!("Stored interval {} is not schedulable", policy.interval))?;
    let delay = state.config.scheduler.initial_delay();

    state.trigger.schedule_after(delay, every);

    info!(
        initial_delay_seconds = delay.as_secs(),
        interval_days = policy.interval,
        max_seeds = policy.max_seeds,
        "Removal schedule armed"
    );

    Ok(())
}
