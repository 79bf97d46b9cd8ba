pub mod http;
pub mod memory;

use crate::core::error::EngineError;
use crate::models::torrent::TorrentView;
use async_trait::async_trait;

/// The torrent engine that owns the torrents a pass decides about.
///
/// The retention service never touches torrent data itself; it reads views
/// and asks the engine to remove.
#[async_trait]
pub trait TorrentEngine: Send + Sync {
    /// Identifiers of every torrent the engine knows, in engine order
    async fn list_torrent_ids(&self) -> Result<Vec<String>, EngineError>;

    /// Current view of a torrent, or None if the engine no longer has it
    async fn get_torrent(&self, id: &str) -> Result<Option<TorrentView>, EngineError>;

    /// Remove a torrent, optionally deleting its downloaded data
    async fn remove_torrent(&self, id: &str, remove_data: bool) -> Result<(), EngineError>;

    /// Engine name for logging
    fn engine_type(&self) -> &'static str;
}
