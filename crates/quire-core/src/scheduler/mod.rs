//! Schedulers turning a grade into a new memory state.
//!
//! Schedulers are selected by id through [`Scheduler::from_id`]. Unknown ids
//! fall back to FSRS.

mod fsrs;
mod topic;

pub use self::fsrs::{FsrsParameters, FsrsScheduler, NextStates, MAX_INTERVAL_DAYS, WEIGHT_COUNT};
pub use self::topic::TopicScheduler;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

use crate::error::{QuireError, QuireResult};
use crate::types::{MemoryState, Rating};

/// Minimum number of reviews to fit before an exam.
pub const TARGET_REVIEWS: f64 = 6.0;
/// Shortest interval the exam adjustment will produce, in days.
pub const MIN_EXAM_INTERVAL_DAYS: f64 = 1.0;
/// Longest interval the exam adjustment will produce, in days.
pub const MAX_EXAM_INTERVAL_DAYS: f64 = 60.0;

/// Scheduler identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SchedulerKind {
    /// FSRS-6 memory model.
    #[default]
    Fsrs,
    /// SuperMemo-2. Selectable, not implemented.
    Sm2,
    /// Fixed intervals for reading topics.
    Topic,
}

/// A scheduler implementation.
#[derive(Debug, Clone)]
pub enum Scheduler {
    Fsrs(FsrsScheduler),
    Topic(TopicScheduler),
    /// Grading fails with [`QuireError::NotImplemented`].
    Sm2,
}

impl Scheduler {
    /// Build the scheduler for a kind.
    pub fn new(kind: SchedulerKind, params: &FsrsParameters) -> Self {
        match kind {
            SchedulerKind::Fsrs => Scheduler::Fsrs(FsrsScheduler::with_params(params)),
            SchedulerKind::Topic => Scheduler::Topic(TopicScheduler::new()),
            SchedulerKind::Sm2 => Scheduler::Sm2,
        }
    }

    /// Build a scheduler by id, falling back to FSRS for unknown ids.
    pub fn from_id(id: &str, params: &FsrsParameters) -> Self {
        let kind = id.parse::<SchedulerKind>().unwrap_or_else(|_| {
            warn!("Unknown scheduler '{}', falling back to fsrs", id);
            SchedulerKind::Fsrs
        });
        Self::new(kind, params)
    }

    /// Kind of this scheduler.
    pub fn kind(&self) -> SchedulerKind {
        match self {
            Scheduler::Fsrs(_) => SchedulerKind::Fsrs,
            Scheduler::Topic(_) => SchedulerKind::Topic,
            Scheduler::Sm2 => SchedulerKind::Sm2,
        }
    }

    /// Compute the state after grading `state` with `rating` at `now`.
    pub fn grade(
        &self,
        state: &MemoryState,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> QuireResult<MemoryState> {
        match self {
            Scheduler::Fsrs(fsrs) => Ok(fsrs.grade(state, rating, now)),
            Scheduler::Topic(topic) => Ok(topic.grade(state, rating, now)),
            Scheduler::Sm2 => Err(QuireError::scheduler_not_implemented(
                SchedulerKind::Sm2.to_string(),
            )),
        }
    }

    /// Whether the state is due. A missing due date counts as due.
    pub fn is_due(&self, state: &MemoryState, now: DateTime<Utc>) -> bool {
        is_due(state, now)
    }

    /// Pull `due` forward so the item fits enough reviews before an exam.
    pub fn apply_exam_adjustment(
        &self,
        state: &MemoryState,
        exam_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> MemoryState {
        apply_exam_adjustment(state, exam_date, now)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Scheduler::Fsrs(FsrsScheduler::new())
    }
}

/// A missing due date counts as due.
pub fn is_due(state: &MemoryState, now: DateTime<Utc>) -> bool {
    state.due.map_or(true, |due| due <= now)
}

/// Shorten `due` so at least [`TARGET_REVIEWS`] reviews fit before `exam_date`.
///
/// The interval is clamped to 1-60 days. The result is never later than the
/// input; states without a due date and exams already past are returned as is.
pub fn apply_exam_adjustment(
    state: &MemoryState,
    exam_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> MemoryState {
    let Some(due) = state.due else {
        return state.clone();
    };

    let days_until_exam = exam_date.signed_duration_since(now).num_seconds() as f64 / 86_400.0;
    if days_until_exam <= 0.0 {
        return state.clone();
    }

    let interval_days =
        (days_until_exam / TARGET_REVIEWS).clamp(MIN_EXAM_INTERVAL_DAYS, MAX_EXAM_INTERVAL_DAYS);
    let adjusted_due = now + Duration::seconds((interval_days * 86_400.0).round() as i64);

    let mut next = state.clone();
    if adjusted_due < due {
        next.due = Some(adjusted_due);
    }
    next
}
