//! Per-item spaced-repetition state.
//!
//! A [`MemoryState`] is created with "new" defaults when the store has nothing
//! for an item, and is only ever transformed by a scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::QuireError;

/// Learning phase of an item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CardStatus {
    /// Never graded.
    #[default]
    New,
    /// In the initial short-step phase.
    Learning,
    /// Graduated to long intervals.
    Review,
    /// Lapsed out of review and back in short steps.
    Relearning,
}

/// Spaced-repetition record for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    /// Learning phase.
    pub status: CardStatus,
    /// Next scheduled review. `None` means due now.
    pub due: Option<DateTime<Utc>>,
    /// Days for retrievability to drop to 90%.
    pub stability: f32,
    /// 1.0-10.0 once graded by FSRS (higher = harder).
    pub difficulty: f32,
    /// Successful grades.
    pub reps: u32,
    /// Again grades.
    pub lapses: u32,
    /// Last grade timestamp.
    pub last_review: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Fresh state for an item that has never been graded.
    pub fn new() -> Self {
        Self {
            status: CardStatus::New,
            due: None,
            stability: 0.0,
            difficulty: 0.0,
            reps: 0,
            lapses: 0,
            last_review: None,
        }
    }

    /// Whether the item has never been graded.
    pub fn is_new(&self) -> bool {
        self.status == CardStatus::New
    }

    /// Days since the last review, if any.
    pub fn days_since_review(&self, now: DateTime<Utc>) -> Option<f64> {
        self.last_review
            .map(|lr| (now.signed_duration_since(lr).num_seconds() as f64 / 86_400.0).max(0.0))
    }
}

impl Default for MemoryState {
    fn default() -> Self {
        Self::new()
    }
}

/// Learner feedback on recall quality (fsrs rating values 1-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[repr(u8)]
pub enum Rating {
    /// Complete failure to recall.
    Again = 1,
    /// Successful but difficult recall.
    Hard = 2,
    /// Normal successful recall.
    Good = 3,
    /// Effortless recall.
    Easy = 4,
}

impl Rating {
    /// All ratings in ascending order.
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Numeric rating value.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Create from a rating value. Returns None outside 1..=4.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Rating::Again),
            2 => Some(Rating::Hard),
            3 => Some(Rating::Good),
            4 => Some(Rating::Easy),
            _ => None,
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.value()
    }
}

impl TryFrom<u8> for Rating {
    type Error = QuireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::from_value(value).ok_or_else(|| QuireError::invalid_rating(value))
    }
}
