use crate::core::error::PolicyError;
use crate::models::torrent::TorrentView;
use crate::utils::time::{elapsed_days, seconds_to_days};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Ranking criterion used to order removal candidates.
///
/// Every criterion maps a torrent to a score. Torrents are sorted by ascending
/// score and the lowest `budget` of them are kept, so high scores go first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankCriterion {
    #[serde(alias = "func_ratio")]
    Ratio,
    #[serde(alias = "func_added")]
    DateAdded,
    #[serde(alias = "func_seed_time")]
    SeedTime,
}

impl RankCriterion {
    pub const ALL: [RankCriterion; 3] = [
        RankCriterion::Ratio,
        RankCriterion::DateAdded,
        RankCriterion::SeedTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RankCriterion::Ratio => "ratio",
            RankCriterion::DateAdded => "date_added",
            RankCriterion::SeedTime => "seed_time",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RankCriterion::Ratio => "Ratio",
            RankCriterion::DateAdded => "Date Added",
            RankCriterion::SeedTime => "Seed Time",
        }
    }

    /// Score a torrent. `now` is a unix timestamp in seconds.
    pub fn score(&self, torrent: &TorrentView, now: i64) -> f64 {
        match self {
            RankCriterion::Ratio => torrent.ratio,
            RankCriterion::DateAdded => elapsed_days(torrent.time_added, now),
            RankCriterion::SeedTime => seconds_to_days(torrent.seeding_time),
        }
    }

    /// Lenient lookup used for documents already on disk: unknown names become `Ratio`.
    pub fn resolve_or_ratio(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(criterion = %name, "Unknown ranking criterion, falling back to ratio");
            RankCriterion::Ratio
        })
    }
}

impl Default for RankCriterion {
    fn default() -> Self {
        RankCriterion::Ratio
    }
}

impl FromStr for RankCriterion {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ratio" | "func_ratio" => Ok(RankCriterion::Ratio),
            "date_added" | "func_added" => Ok(RankCriterion::DateAdded),
            "seed_time" | "func_seed_time" => Ok(RankCriterion::SeedTime),
            other => Err(PolicyError::UnknownRankCriterion(other.to_string())),
        }
    }
}

impl fmt::Display for RankCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Criterion id to human label, for settings UIs
pub fn remove_rules() -> BTreeMap<&'static str, &'static str> {
    RankCriterion::ALL
        .iter()
        .map(|criterion| (criterion.as_str(), criterion.label()))
        .collect()
}
