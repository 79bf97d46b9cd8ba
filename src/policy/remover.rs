use crate::engine::TorrentEngine;
use crate::metrics::collector::Metrics;
use crate::models::policy::PolicyConfig;
use crate::models::torrent::TorrentView;
use crate::policy::selection::{decide, Decision, DecisionOutcome};
use crate::scheduler::ScheduledJob;
use crate::stores::ignore_store::IgnoreStore;
use crate::stores::policy_store::PolicyStore;
use crate::utils::time::current_timestamp;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Outcome of one removal pass
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    /// None when the engine could not list its torrents
    pub decision: Option<Decision>,
    pub removed: Vec<String>,
    pub failed: Vec<String>,
    pub dry_run: bool,
}

impl PassReport {
    fn empty(dry_run: bool) -> Self {
        Self {
            decision: None,
            removed: Vec::new(),
            failed: Vec::new(),
            dry_run,
        }
    }
}

/// Runs removal passes against a torrent engine.
///
/// Passes are serialised: a pass started while another is running waits for it.
pub struct Remover {
    engine: Arc<dyn TorrentEngine>,
    policy_store: Arc<PolicyStore>,
    ignore_store: Arc<IgnoreStore>,
    metrics: Arc<Metrics>,
    pass_lock: Mutex<()>,
}

impl Remover {
    pub fn new(
        engine: Arc<dyn TorrentEngine>,
        policy_store: Arc<PolicyStore>,
        ignore_store: Arc<IgnoreStore>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            engine,
            policy_store,
            ignore_store,
            metrics,
            pass_lock: Mutex::new(()),
        }
    }

    /// Run one pass with the current policy
    pub async fn run_pass(&self) -> PassReport {
        self.run_pass_at(current_timestamp()).await
    }

    /// Run one pass as if the wall clock read `now`
    pub async fn run_pass_at(&self, now: i64) -> PassReport {
        let _guard = self.pass_lock.lock().await;
        let config = self.policy_store.policy();

        debug!(
            engine = self.engine.engine_type(),
            max_seeds = config.max_seeds,
            "Starting removal pass"
        );

        if config.is_unlimited() {
            self.metrics.record_pass(DecisionOutcome::Unlimited, 0);
            return PassReport {
                decision: Some(decide(&config, &[], |_| false, now)),
                ..PassReport::empty(config.dry_run)
            };
        }

        let ids = match self.engine.list_torrent_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                error!(error = %e, "Failed to list torrents, skipping removal pass");
                self.metrics.record_failed_pass();
                return PassReport::empty(config.dry_run);
            }
        };

        debug!(torrents = ids.len(), "Torrents listed");

        let snapshot = if ids.len() as i64 <= config.max_seeds {
            ids.into_iter().map(|id| (id, None)).collect()
        } else {
            self.snapshot(ids).await
        };

        let decision = decide(&config, &snapshot, |id| self.ignore_store.is_ignored(id), now);

        info!(
            outcome = ?decision.outcome,
            total = decision.total,
            eligible = decision.eligible,
            exempt = decision.exempt,
            dropped = decision.dropped,
            budget = decision.budget,
            approved = decision.removals.len(),
            spared = decision.spared.len(),
            dry_run = config.dry_run,
            "Removal decision"
        );

        let mut report = PassReport {
            decision: None,
            ..PassReport::empty(config.dry_run)
        };

        self.execute(&config, &decision, &mut report).await;

        self.metrics.record_pass(decision.outcome, decision.spared.len());
        report.decision = Some(decision);
        report
    }

    async fn snapshot(&self, ids: Vec<String>) -> Vec<(String, Option<TorrentView>)> {
        let mut snapshot = Vec::with_capacity(ids.len());

        for id in ids {
            let view = match self.engine.get_torrent(&id).await {
                Ok(view) => view,
                Err(e) => {
                    warn!(torrent_id = %id, error = %e, "Failed to read torrent state, skipping");
                    None
                }
            };
            snapshot.push((id, view));
        }

        snapshot
    }

    async fn execute(&self, config: &PolicyConfig, decision: &Decision, report: &mut PassReport) {
        let mut changed = false;

        for removal in &decision.removals {
            if config.dry_run {
                info!(
                    torrent_id = %removal.id,
                    name = %removal.name,
                    primary = removal.primary,
                    secondary = removal.secondary,
                    "Dry run, would remove torrent"
                );
                continue;
            }

            info!(
                torrent_id = %removal.id,
                name = %removal.name,
                primary = removal.primary,
                secondary = removal.secondary,
                remove_data = config.remove_data,
                "Removing torrent"
            );

            match self.engine.remove_torrent(&removal.id, config.remove_data).await {
                Ok(()) => {
                    self.metrics.increment_removed();
                    report.removed.push(removal.id.clone());
                    if self.ignore_store.remove(&removal.id) {
                        changed = true;
                    }
                }
                Err(e) => {
                    warn!(torrent_id = %removal.id, error = %e, "Problem removing torrent");
                    self.metrics.increment_removal_failures();
                    report.failed.push(removal.id.clone());
                }
            }
        }

        if changed {
            if let Err(e) = self.ignore_store.save() {
                error!(error = %e, "Failed to save ignore state after removals");
            }
        }
    }
}

#[async_trait]
impl ScheduledJob for Remover {
    async fn run(&self) {
        let report = self.run_pass().await;
        if !report.removed.is_empty() || !report.failed.is_empty() {
            info!(
                removed = report.removed.len(),
                failed = report.failed.len(),
                "Scheduled removal pass completed"
            );
        }
    }
}
