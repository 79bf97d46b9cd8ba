//! Pure selection step of a removal pass.
//!
//! Given a policy, a snapshot of the engine's torrents, the ignore flags and
//! the current time, [`decide`] works out which torrents should go. It has no
//! side effects; the executor in `remover` carries out the result.

use crate::models::policy::PolicyConfig;
use crate::models::torrent::TorrentView;
use serde::Serialize;
use std::cmp::Ordering;

/// A finished, non-exempt torrent with its two ranking scores
#[derive(Debug, Clone)]
pub struct RankedTorrent<'a> {
    pub id: &'a str,
    pub torrent: &'a TorrentView,
    pub primary: f64,
    pub secondary: f64,
}

impl RankedTorrent<'_> {
    fn cmp_scores(&self, other: &Self) -> Ordering {
        self.primary
            .total_cmp(&other.primary)
            .then_with(|| self.secondary.total_cmp(&other.secondary))
    }
}

/// Why a pass stopped where it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOutcome {
    /// `max_seeds` is negative
    Unlimited,
    /// The engine holds no more torrents than `max_seeds`
    UnderLimit,
    /// After dropping unfinished and exempt torrents, the rest fit the budget
    UnderBudget,
    /// Some torrents ranked past the budget and were tested against the thresholds
    Candidates,
}

/// A candidate that passed the threshold test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Removal {
    pub id: String,
    pub name: String,
    pub primary: f64,
    pub secondary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub outcome: DecisionOutcome,
    pub total: usize,
    pub eligible: usize,
    pub exempt: usize,
    /// Unfinished torrents and torrents whose state could not be read
    pub dropped: usize,
    /// Number of eligible torrents allowed to stay
    pub budget: usize,
    pub retained: Vec<String>,
    /// Candidates approved for removal, in ranking order
    pub removals: Vec<Removal>,
    /// Candidates that ranked past the budget but failed the threshold test
    pub spared: Vec<String>,
}

impl Decision {
    fn stop(outcome: DecisionOutcome, total: usize) -> Self {
        Self {
            outcome,
            total,
            eligible: 0,
            exempt: 0,
            dropped: 0,
            budget: 0,
            retained: Vec::new(),
            removals: Vec::new(),
            spared: Vec::new(),
        }
    }
}

/// Decide which torrents to remove.
///
/// `torrents` lists every identifier known to the engine in engine order,
/// paired with its view (`None` when the engine could not provide one).
/// `is_ignored` reports the manual ignore flag for an identifier.
pub fn decide<F>(
    config: &PolicyConfig,
    torrents: &[(String, Option<TorrentView>)],
    is_ignored: F,
    now: i64,
) -> Decision
where
    F: Fn(&str) -> bool,
{
    let total = torrents.len();

    if config.is_unlimited() {
        return Decision::stop(DecisionOutcome::Unlimited, total);
    }
    let max_seeds = config.max_seeds as usize;

    if total <= max_seeds {
        return Decision::stop(DecisionOutcome::UnderLimit, total);
    }

    let mut eligible = Vec::with_capacity(total);
    let mut exempt = 0usize;
    let mut dropped = 0usize;

    for (id, view) in torrents {
        let torrent = match view {
            Some(torrent) if torrent.is_finished == Some(true) => torrent,
            _ => {
                dropped += 1;
                continue;
            }
        };

        if is_ignored(id) || torrent.matches_tracker(&config.trackers) {
            tracing::debug!(torrent_id = %id, "Torrent is exempt from removal");
            exempt += 1;
            continue;
        }

        eligible.push(RankedTorrent {
            id,
            torrent,
            primary: config.filter.score(torrent, now),
            secondary: config.filter2.score(torrent, now),
        });
    }

    let budget = if config.count_exempt {
        max_seeds.saturating_sub(exempt)
    } else {
        max_seeds
    };

    let mut decision = Decision {
        outcome: DecisionOutcome::UnderBudget,
        total,
        eligible: eligible.len(),
        exempt,
        dropped,
        budget,
        retained: Vec::new(),
        removals: Vec::new(),
        spared: Vec::new(),
    };

    if eligible.len() <= budget {
        decision.retained = eligible.iter().map(|ranked| ranked.id.to_string()).collect();
        return decision;
    }

    // Stable, so equal keys keep engine order
    eligible.sort_by(RankedTorrent::cmp_scores);

    let candidates = eligible.split_off(budget);
    decision.outcome = DecisionOutcome::Candidates;
    decision.retained = eligible.iter().map(|ranked| ranked.id.to_string()).collect();

    for candidate in candidates {
        let approved = config
            .sel_func
            .combine(candidate.primary >= config.min, candidate.secondary >= config.min2);

        if approved {
            decision.removals.push(Removal {
                id: candidate.id.to_string(),
                name: candidate.torrent.name.clone(),
                primary: candidate.primary,
                secondary: candidate.secondary,
            });
        } else {
            tracing::debug!(
                torrent_id = %candidate.id,
                primary = candidate.primary,
                secondary = candidate.secondary,
                "Candidate below removal thresholds, keeping"
            );
            decision.spared.push(candidate.id.to_string());
        }
    }

    decision
}
