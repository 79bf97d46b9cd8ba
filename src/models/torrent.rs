use serde::{Deserialize, Serialize};

/// A tracker announce URL attached to a torrent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackerEntry {
    pub url: String,
}

/// Read-only view of a torrent as reported by the torrent engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TorrentView {
    /// Engine-side identifier (usually the hex info hash)
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Whether the download completed. `None` when the engine could not report it.
    #[serde(default)]
    pub is_finished: Option<bool>,
    /// Uploaded bytes / downloaded bytes
    #[serde(default)]
    pub ratio: f64,
    /// Unix timestamp (seconds) at which the torrent was added
    #[serde(default)]
    pub time_added: i64,
    /// Cumulative seeding duration in seconds
    #[serde(default)]
    pub seeding_time: u64,
    #[serde(default)]
    pub trackers: Vec<TrackerEntry>,
}

impl TorrentView {
    pub fn new(id: impl Into<String>, is_finished: bool, ratio: f64, time_added: i64, seeding_time: u64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            is_finished: Some(is_finished),
            ratio,
            time_added,
            seeding_time,
            trackers: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_tracker(mut self, url: impl Into<String>) -> Self {
        self.trackers.push(TrackerEntry { url: url.into() });
        self
    }

    pub fn with_unknown_state(mut self) -> Self {
        self.is_finished = None;
        self
    }

    /// True when any tracker URL contains one of the exempt entries.
    ///
    /// Entries are lowercased before matching, the URL is not.
    pub fn matches_tracker(&self, exempt: &[String]) -> bool {
        self.trackers.iter().any(|tracker| {
            exempt
                .iter()
                .any(|entry| tracker.url.contains(&entry.to_lowercase()))
        })
    }
}
