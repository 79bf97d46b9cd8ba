// Application state (AppState)

use crate::core::config::Config;
use crate::engine::TorrentEngine;
use crate::metrics::collector::Metrics;
use crate::policy::remover::Remover;
use crate::policy::service::PolicyService;
use crate::scheduler::{IntervalTrigger, Trigger};
use crate::stores::{ignore_store::IgnoreStore, policy_store::PolicyStore};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Shared application state
///
/// Everything request handlers and the scheduler touch. All fields are
/// wrapped in Arc so the state can be cloned across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Retention policy document
    pub policy_store: Arc<PolicyStore>,

    /// Per-torrent ignore flags
    pub ignore_store: Arc<IgnoreStore>,

    /// Torrent engine the passes act on
    pub engine: Arc<dyn TorrentEngine>,

    pub remover: Arc<Remover>,

    /// Periodic trigger for removal passes
    pub trigger: Arc<dyn Trigger>,

    pub service: Arc<PolicyService>,

    pub metrics: Arc<Metrics>,

    pub config: Arc<Config>,
}

impl AppState {
    /// Open the persisted documents and wire the services around `engine`.
    /// The schedule is not started.
    pub fn new(config: Config, engine: Arc<dyn TorrentEngine>) -> Result<Self> {
        let config = Arc::new(config);

        let policy_store = Arc::new(
            PolicyStore::open(config.storage.policy_path()).context("Failed to open policy document")?,
        );

        let ignore_store = Arc::new(
            IgnoreStore::open(config.storage.ignore_path()).context("Failed to open ignore document")?,
        );

        let metrics = Arc::new(Metrics::new());

        let remover = Arc::new(Remover::new(
            Arc::clone(&engine),
            Arc::clone(&policy_store),
            Arc::clone(&ignore_store),
            Arc::clone(&metrics),
        ));

        let trigger: Arc<dyn Trigger> = Arc::new(IntervalTrigger::new(remover.clone()));

        let service = Arc::new(PolicyService::new(
            Arc::clone(&policy_store),
            Arc::clone(&ignore_store),
            Arc::clone(&remover),
            Arc::clone(&trigger),
        ));

        Ok(Self {
            policy_store,
            ignore_store,
            engine,
            remover,
            trigger,
            service,
            metrics,
            config,
        })
    }

    pub fn admin_key(&self) -> Option<&str> {
        self.config.admin.api_key.as_deref()
    }
}
