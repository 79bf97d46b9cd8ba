use crate::policy::selection::DecisionOutcome;
use crate::stores::ignore_store::IgnoreStore;
use crate::utils::time::current_timestamp;
use serde::Serialize;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

pub struct Metrics {
    pub passes_total: AtomicU64,
    /// Passes that reached the candidate stage
    pub passes_with_candidates: AtomicU64,
    /// Passes aborted because the engine could not list torrents
    pub passes_failed: AtomicU64,
    pub torrents_removed: AtomicU64,
    pub removal_failures: AtomicU64,
    /// Candidates kept because they failed the threshold test
    pub candidates_spared: AtomicU64,
    pub last_pass_at: AtomicI64,
    pub start_time: i64,
}

#[derive(Debug, Clone, Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    pub passes_total: u64,
    pub passes_with_candidates: u64,
    pub passes_failed: u64,
    pub torrents_removed: u64,
    pub removal_failures: u64,
    pub candidates_spared: u64,
    pub ignored_entries: usize,
    /// Unix timestamp of the last completed pass, 0 if none ran yet
    pub last_pass_at: i64,
    pub uptime_seconds: i64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            passes_total: AtomicU64::new(0),
            passes_with_candidates: AtomicU64::new(0),
            passes_failed: AtomicU64::new(0),
            torrents_removed: AtomicU64::new(0),
            removal_failures: AtomicU64::new(0),
            candidates_spared: AtomicU64::new(0),
            last_pass_at: AtomicI64::new(0),
            start_time: current_timestamp(),
        }
    }

    pub fn record_pass(&self, outcome: DecisionOutcome, spared: usize) {
        self.passes_total.fetch_add(1, Ordering::Relaxed);
        if outcome == DecisionOutcome::Candidates {
            self.passes_with_candidates.fetch_add(1, Ordering::Relaxed);
        }
        self.candidates_spared.fetch_add(spared as u64, Ordering::Relaxed);
        self.last_pass_at.store(current_timestamp(), Ordering::Relaxed);
    }

    pub fn record_failed_pass(&self) {
        self.passes_total.fetch_add(1, Ordering::Relaxed);
        self.passes_failed.fetch_add(1, Ordering::Relaxed);
        self.last_pass_at.store(current_timestamp(), Ordering::Relaxed);
    }

    pub fn increment_removed(&self) {
        self.torrents_removed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_removal_failures(&self) {
        self.removal_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self, ignore_store: &IgnoreStore) -> MetricsSnapshot {
        MetricsSnapshot {
            passes_total: self.passes_total.load(Ordering::Relaxed),
            passes_with_candidates: self.passes_with_candidates.load(Ordering::Relaxed),
            passes_failed: self.passes_failed.load(Ordering::Relaxed),
            torrents_removed: self.torrents_removed.load(Ordering::Relaxed),
            removal_failures: self.removal_failures.load(Ordering::Relaxed),
            candidates_spared: self.candidates_spared.load(Ordering::Relaxed),
            ignored_entries: ignore_store.len(),
            last_pass_at: self.last_pass_at.load(Ordering::Relaxed),
            uptime_seconds: current_timestamp() - self.start_time,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
