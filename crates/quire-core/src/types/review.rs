//! Review log records and session counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::{CardStatus, MemoryState, Rating};

/// One entry appended to the store's review log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// When the grade was given.
    pub ts: DateTime<Utc>,
    /// Graded item.
    pub item_id: String,
    /// Rating value 1-4.
    pub rating: u8,
    /// Time the learner spent on the item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    /// Status before the grade.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_before: Option<CardStatus>,
    /// Stability before the grade.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability_before: Option<f32>,
    /// Difficulty before the grade.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty_before: Option<f32>,
}

impl ReviewRecord {
    /// Minimal record with only the status snapshot.
    pub fn snapshot(
        item_id: impl Into<String>,
        rating: Rating,
        before: &MemoryState,
        elapsed_ms: Option<u64>,
        ts: DateTime<Utc>,
    ) -> Self {
        Self {
            ts,
            item_id: item_id.into(),
            rating: rating.value(),
            elapsed_ms,
            state_before: Some(before.status),
            stability_before: None,
            difficulty_before: None,
        }
    }

    /// Full audit record with the numeric model fields before the grade.
    pub fn audit(
        item_id: impl Into<String>,
        rating: Rating,
        before: &MemoryState,
        elapsed_ms: Option<u64>,
        ts: DateTime<Utc>,
    ) -> Self {
        Self {
            stability_before: Some(before.stability),
            difficulty_before: Some(before.difficulty),
            ..Self::snapshot(item_id, rating, before, elapsed_ms, ts)
        }
    }
}

/// Per-session grade counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Total grades recorded.
    pub reviewed: u32,
    pub again: u32,
    pub hard: u32,
    pub good: u32,
    pub easy: u32,
}

impl SessionStats {
    /// Count one grade.
    pub fn record(&mut self, rating: Rating) {
        self.reviewed += 1;
        match rating {
            Rating::Again => self.again += 1,
            Rating::Hard => self.hard += 1,
            Rating::Good => self.good += 1,
            Rating::Easy => self.easy += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_bucket_by_rating() {
        let mut stats = SessionStats::default();
        stats.record(Rating::Again);
        stats.record(Rating::Good);
        stats.record(Rating::Good);
        stats.record(Rating::Easy);

        assert_eq!(stats.reviewed, 4);
        assert_eq!(stats.again, 1);
        assert_eq!(stats.hard, 0);
        assert_eq!(stats.good, 2);
        assert_eq!(stats.easy, 1);
    }

    #[test]
    fn test_audit_record_carries_model_fields() {
        let mut before = MemoryState::new();
        before.stability = 4.5;
        before.difficulty = 6.0;

        let record = ReviewRecord::audit("n::c1", Rating::Hard, &before, Some(1200), Utc::now());
        assert_eq!(record.rating, 2);
        assert_eq!(record.state_before, Some(CardStatus::New));
        assert_eq!(record.stability_before, Some(4.5));
        assert_eq!(record.difficulty_before, Some(6.0));
        assert_eq!(record.elapsed_ms, Some(1200));
    }

    #[test]
    fn test_snapshot_skips_empty_fields() {
        let record =
            ReviewRecord::snapshot("a", Rating::Again, &MemoryState::new(), None, Utc::now());
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("stability_before").is_none());
        assert!(value.get("elapsed_ms").is_none());
        assert_eq!(value["state_before"], "new");
    }
}
