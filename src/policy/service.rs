use crate::core::error::{AdminError, UpdateError};
use crate::models::policy::{PolicyConfig, PolicyDocument};
use crate::policy::ranking::remove_rules;
use crate::policy::remover::{PassReport, Remover};
use crate::scheduler::Trigger;
use crate::stores::ignore_store::IgnoreStore;
use crate::stores::policy_store::PolicyStore;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// The operations callers use to steer the retention policy
pub struct PolicyService {
    policy_store: Arc<PolicyStore>,
    ignore_store: Arc<IgnoreStore>,
    remover: Arc<Remover>,
    trigger: Arc<dyn Trigger>,
    /// Held across merge and reschedule so the schedule always follows the stored interval
    update_lock: Mutex<()>,
}

impl PolicyService {
    pub fn new(
        policy_store: Arc<PolicyStore>,
        ignore_store: Arc<IgnoreStore>,
        remover: Arc<Remover>,
        trigger: Arc<dyn Trigger>,
    ) -> Self {
        Self {
            policy_store,
            ignore_store,
            remover,
            trigger,
            update_lock: Mutex::new(()),
        }
    }

    /// Merge `partial` into the policy, persist it and restart the schedule
    pub fn set_config(&self, partial: &PolicyDocument) -> Result<PolicyConfig, UpdateError> {
        let _guard = self.update_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let config = self.policy_store.merge(partial)?;

        match config.interval_period() {
            Some(every) => self.trigger.schedule(every),
            // Rejected during validation, kept for completeness
            None => warn!(interval = config.interval, "Interval is not schedulable, leaving schedule untouched"),
        }

        info!(
            max_seeds = config.max_seeds,
            interval_days = config.interval,
            dry_run = config.dry_run,
            "Policy configuration updated"
        );

        Ok(config)
    }

    pub fn get_config(&self) -> PolicyDocument {
        self.policy_store.document()
    }

    pub fn get_remove_rules(&self) -> BTreeMap<&'static str, &'static str> {
        remove_rules()
    }

    pub fn get_ignore(&self, ids: &[String]) -> Vec<bool> {
        self.ignore_store.get_many(ids)
    }

    pub fn set_ignore(&self, ids: &[String], ignore: bool) -> Result<(), AdminError> {
        debug!(torrent_ids = ?ids, ignore = ignore, "Setting ignore flag");

        self.ignore_store
            .set_many(ids, ignore)
            .map_err(|e| AdminError::PersistError(format!("{:#}", e)))
    }

    /// Run a pass right away, outside the schedule
    pub async fn run_now(&self) -> PassReport {
        self.remover.run_pass().await
    }
}
