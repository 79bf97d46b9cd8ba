use crate::core::error::UpdateError;
use crate::models::policy::{PolicyConfig, PolicyDocument};
use crate::stores::document::JsonDocument;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::{debug, info};

struct PolicyState {
    /// Everything the caller ever stored, including keys the policy ignores
    raw: PolicyDocument,
    config: PolicyConfig,
}

/// Persisted policy document and its parsed form
pub struct PolicyStore {
    document: JsonDocument,
    state: RwLock<PolicyState>,
}

impl PolicyStore {
    /// Open the policy document, creating it with defaults if missing.
    ///
    /// Known keys are normalised to their canonical form and written back,
    /// so the file on disk is always complete and readable.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let document = JsonDocument::new(path);

        let mut raw = document
            .load()
            .context("Failed to load policy document")?
            .unwrap_or_default();

        let config = PolicyConfig::from_stored_document(&raw)
            .context(format!("Invalid policy document: {}", document.path().display()))?;

        raw.extend(config.to_document());
        document.save(&raw).context("Failed to save policy document")?;

        info!(
            path = %document.path().display(),
            max_seeds = config.max_seeds,
            filter = %config.filter,
            filter2 = %config.filter2,
            sel_func = %config.sel_func,
            interval_days = config.interval,
            dry_run = config.dry_run,
            "Policy loaded"
        );

        Ok(Self {
            document,
            state: RwLock::new(PolicyState { raw, config }),
        })
    }

    /// Snapshot of the parsed policy
    pub fn policy(&self) -> PolicyConfig {
        self.read_state(|state| state.config.clone())
    }

    /// Snapshot of the full stored document
    pub fn document(&self) -> PolicyDocument {
        self.read_state(|state| state.raw.clone())
    }

    /// Merge `partial` into the document, validate, persist, and return the new policy.
    ///
    /// Nothing changes in memory or on disk when validation or the save fails.
    pub fn merge(&self, partial: &PolicyDocument) -> Result<PolicyConfig, UpdateError> {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut raw = state.raw.clone();
        for (key, value) in partial {
            raw.insert(key.clone(), value.clone());
        }

        let config = PolicyConfig::from_document(&raw)?;
        raw.extend(config.to_document());

        self.document.save(&raw).map_err(UpdateError::Persist)?;

        debug!(keys = ?partial.keys().collect::<Vec<_>>(), "Policy updated");

        state.raw = raw;
        state.config = config.clone();
        Ok(config)
    }

    fn read_state<T>(&self, f: impl FnOnce(&PolicyState) -> T) -> T {
        let state = self
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&state)
    }
}
