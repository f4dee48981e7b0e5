//! Fixed-interval scheduler for incremental-reading topics.
//!
//! Topics are read, not recalled, so the numeric memory model is ignored and
//! the next visit depends only on the rating.

use chrono::{DateTime, Duration, Utc};

use crate::types::{CardStatus, MemoryState, Rating};

/// Fixed-interval topic scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopicScheduler;

impl TopicScheduler {
    /// Create a topic scheduler.
    pub fn new() -> Self {
        Self
    }

    /// Delay until the next visit for a rating.
    pub fn interval(&self, rating: Rating) -> Duration {
        match rating {
            Rating::Again => Duration::minutes(10),
            Rating::Hard => Duration::days(1),
            Rating::Good => Duration::days(3),
            Rating::Easy => Duration::days(7),
        }
    }

    /// Grade a topic. Stability and difficulty are carried over unchanged.
    pub fn grade(&self, state: &MemoryState, rating: Rating, now: DateTime<Utc>) -> MemoryState {
        let mut next = state.clone();
        next.due = Some(now + self.interval(rating));
        next.last_review = Some(now);

        if rating == Rating::Again {
            next.status = CardStatus::Learning;
            next.lapses += 1;
        } else {
            next.status = CardStatus::Review;
            next.reps += 1;
        }
        next
    }
}
