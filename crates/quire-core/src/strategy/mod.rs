//! Ranking strategies ordering session candidates.
//!
//! Strategies are pure: everything they depend on arrives in a
//! [`RankContext`], and they return a new ranked list instead of touching the
//! candidates. Ties are always broken by item id so identical input gives
//! identical output.

mod anki;
mod jd1;

pub use anki::{bucket_of, Bucket};
pub use jd1::{jd1_score, ScoreBreakdown};

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

use crate::types::SessionItem;

/// Point-in-time inputs for ranking.
#[derive(Debug, Clone)]
pub struct RankContext {
    /// Ranking time.
    pub now: DateTime<Utc>,
    /// Note of the most recently graded item.
    pub last_note_id: Option<String>,
    /// Notes linked from `last_note_id`.
    pub linked_notes: HashSet<String>,
    /// Session seed.
    pub seed: u64,
}

impl RankContext {
    /// Context with no previous note.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            last_note_id: None,
            linked_notes: HashSet::new(),
            seed: 0,
        }
    }

    /// Set the previous note and its outgoing links.
    pub fn with_last_note(
        mut self,
        note_id: impl Into<String>,
        links: impl IntoIterator<Item = String>,
    ) -> Self {
        self.last_note_id = Some(note_id.into());
        self.linked_notes = links.into_iter().collect();
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A candidate with the score the strategy gave it.
#[derive(Debug, Clone)]
pub struct RankedItem<'a> {
    pub item: &'a SessionItem,
    /// Strategy-specific: JD1 points, or the Anki bucket index.
    pub score: f64,
}

/// Strategy identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum StrategyKind {
    /// Priority and urgency scoring.
    #[default]
    #[serde(rename = "JD1")]
    #[strum(serialize = "JD1")]
    Jd1,
    /// Anki-style bucket ordering.
    #[serde(rename = "Anki")]
    #[strum(serialize = "Anki")]
    Anki,
}

/// A ranking strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    #[default]
    Jd1,
    Anki,
}

impl Strategy {
    /// Build the strategy for a kind.
    pub fn new(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Jd1 => Strategy::Jd1,
            StrategyKind::Anki => Strategy::Anki,
        }
    }

    /// Build a strategy by id, falling back to JD1 for unknown ids.
    pub fn from_id(id: &str) -> Self {
        let kind = id.parse::<StrategyKind>().unwrap_or_else(|_| {
            warn!("Unknown strategy '{}', falling back to JD1", id);
            StrategyKind::Jd1
        });
        Self::new(kind)
    }

    /// Kind of this strategy.
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Jd1 => StrategyKind::Jd1,
            Strategy::Anki => StrategyKind::Anki,
        }
    }

    /// Order candidates best first. No candidate is added or removed.
    pub fn rank<'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a SessionItem>,
        context: &RankContext,
    ) -> Vec<RankedItem<'a>> {
        match self {
            Strategy::Jd1 => jd1::rank(candidates, context),
            Strategy::Anki => anki::rank(candidates, context),
        }
    }
}
