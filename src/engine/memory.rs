use crate::core::error::EngineError;
use crate::engine::TorrentEngine;
use crate::models::torrent::TorrentView;
use async_trait::async_trait;
use dashmap::DashSet;
use std::sync::{Mutex, MutexGuard};

/// In-process torrent engine.
///
/// Holds torrents in insertion order and records every successful removal.
/// Individual lookups or removals can be made to fail.
#[derive(Default)]
pub struct MemoryEngine {
    torrents: Mutex<Vec<TorrentView>>,
    removed: Mutex<Vec<(String, bool)>>,
    failing_removals: DashSet<String>,
    failing_lookups: DashSet<String>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_torrents(torrents: impl IntoIterator<Item = TorrentView>) -> Self {
        let engine = Self::new();
        for torrent in torrents {
            engine.add(torrent);
        }
        engine
    }

    /// Add a torrent, replacing any torrent with the same id in place
    pub fn add(&self, torrent: TorrentView) {
        let mut torrents = lock(&self.torrents);
        match torrents.iter_mut().find(|t| t.id == torrent.id) {
            Some(existing) => *existing = torrent,
            None => torrents.push(torrent),
        }
    }

    pub fn fail_removal_of(&self, id: &str) {
        self.failing_removals.insert(id.to_string());
    }

    pub fn fail_lookup_of(&self, id: &str) {
        self.failing_lookups.insert(id.to_string());
    }

    /// Successful removals so far, as (id, remove_data)
    pub fn removed(&self) -> Vec<(String, bool)> {
        lock(&self.removed).clone()
    }

    pub fn removed_ids(&self) -> Vec<String> {
        lock(&self.removed).iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.torrents).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.torrents).is_empty()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl TorrentEngine for MemoryEngine {
    async fn list_torrent_ids(&self) -> Result<Vec<String>, EngineError> {
        Ok(lock(&self.torrents).iter().map(|t| t.id.clone()).collect())
    }

    async fn get_torrent(&self, id: &str) -> Result<Option<TorrentView>, EngineError> {
        if self.failing_lookups.contains(id) {
            return Err(EngineError::Rejected(format!("lookup of {} failed", id)));
        }
        Ok(lock(&self.torrents).iter().find(|t| t.id == id).cloned())
    }

    async fn remove_torrent(&self, id: &str, remove_data: bool) -> Result<(), EngineError> {
        if self.failing_removals.contains(id) {
            return Err(EngineError::Rejected(format!("removal of {} failed", id)));
        }

        let mut torrents = lock(&self.torrents);
        let position = torrents
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        torrents.remove(position);
        drop(torrents);

        lock(&self.removed).push((id.to_string(), remove_data));
        Ok(())
    }

    fn engine_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let engine = MemoryEngine::with_torrents([
            TorrentView::new("b", true, 0.0, 0, 0),
            TorrentView::new("a", true, 0.0, 0, 0),
            TorrentView::new("c", true, 0.0, 0, 0),
        ]);

        assert_eq!(engine.list_torrent_ids().await.unwrap(), vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_add_replaces_in_place() {
        let engine = MemoryEngine::with_torrents([
            TorrentView::new("a", true, 0.0, 0, 0),
            TorrentView::new("b", true, 0.0, 0, 0),
        ]);
        engine.add(TorrentView::new("a", true, 9.0, 0, 0));

        assert_eq!(engine.len(), 2);
        assert_eq!(engine.list_torrent_ids().await.unwrap(), vec!["a", "b"]);
        assert_eq!(engine.get_torrent("a").await.unwrap().unwrap().ratio, 9.0);
    }

    #[tokio::test]
    async fn test_remove_records_and_drops() {
        let engine = MemoryEngine::with_torrents([TorrentView::new("a", true, 0.0, 0, 0)]);

        engine.remove_torrent("a", true).await.unwrap();

        assert!(engine.is_empty());
        assert!(engine.get_torrent("a").await.unwrap().is_none());
        assert_eq!(engine.removed(), vec![("a".to_string(), true)]);
    }

    #[tokio::test]
    async fn test_remove_missing_is_not_found() {
        let engine = MemoryEngine::new();
        assert!(matches!(
            engine.remove_torrent("nope", false).await,
            Err(EngineError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let engine = MemoryEngine::with_torrents([TorrentView::new("a", true, 0.0, 0, 0)]);
        engine.fail_lookup_of("a");
        engine.fail_removal_of("a");

        assert!(engine.get_torrent("a").await.is_err());
        assert!(engine.remove_torrent("a", false).await.is_err());
        assert_eq!(engine.len(), 1);
        assert!(engine.removed().is_empty());
    }
}
