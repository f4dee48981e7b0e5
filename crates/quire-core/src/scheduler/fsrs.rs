//! FSRS-6 scheduler.
//!
//! Stability, difficulty and the next due date are derived from the FSRS-6
//! memory model. Weights default to the published parameters shipped with the
//! `fsrs` crate; a custom 21-weight vector may be supplied instead.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{CardStatus, MemoryState, Rating};

/// Number of weights in an FSRS-6 parameter vector.
pub const WEIGHT_COUNT: usize = 21;

/// Upper bound accepted for `maximum_interval`, in days.
pub const MAX_INTERVAL_DAYS: u32 = 365_000;

/// Lowest stability the model will produce.
const S_MIN: f32 = 0.01;

/// Tunable FSRS parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsrsParameters {
    /// Longest interval the scheduler will assign, in days.
    pub maximum_interval: u32,
    /// Target probability of recall at the due date.
    pub request_retention: f32,
    /// Custom weight vector. Must hold exactly 21 values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<f32>>,
}

impl Default for FsrsParameters {
    fn default() -> Self {
        Self {
            maximum_interval: 36_500,
            request_retention: 0.9,
            weights: None,
        }
    }
}

/// The four possible outcomes of grading one state.
#[derive(Debug, Clone, PartialEq)]
pub struct NextStates {
    pub again: MemoryState,
    pub hard: MemoryState,
    pub good: MemoryState,
    pub easy: MemoryState,
}

impl NextStates {
    /// Take the outcome for a rating.
    pub fn into_state(self, rating: Rating) -> MemoryState {
        match rating {
            Rating::Again => self.again,
            Rating::Hard => self.hard,
            Rating::Good => self.good,
            Rating::Easy => self.easy,
        }
    }
}

/// FSRS-6 scheduler.
#[derive(Debug, Clone)]
pub struct FsrsScheduler {
    w: Vec<f32>,
    /// Forgetting curve decay (w20).
    decay: f32,
    /// `0.9^(-1/decay) - 1`, so that R(S) = 0.9.
    factor: f32,
    request_retention: f32,
    maximum_interval: u32,
}

impl FsrsScheduler {
    /// Create a scheduler with FSRS-6 default parameters.
    pub fn new() -> Self {
        Self::with_params(&FsrsParameters::default())
    }

    /// Create a scheduler with custom parameters.
    ///
    /// A weight vector of the wrong length is ignored in favour of the defaults.
    /// `maximum_interval` is clamped to `1..=MAX_INTERVAL_DAYS`.
    pub fn with_params(params: &FsrsParameters) -> Self {
        let w = match &params.weights {
            Some(weights) if weights.len() == WEIGHT_COUNT => weights.clone(),
            Some(weights) => {
                warn!(
                    "Ignoring custom FSRS weights: expected {} values, got {}",
                    WEIGHT_COUNT,
                    weights.len()
                );
                fsrs::DEFAULT_PARAMETERS.to_vec()
            }
            None => fsrs::DEFAULT_PARAMETERS.to_vec(),
        };
        let decay = w.get(20).copied().unwrap_or(fsrs::FSRS6_DEFAULT_DECAY);
        let factor = 0.9f32.powf(-1.0 / decay) - 1.0;

        Self {
            w,
            decay,
            factor,
            request_retention: params.request_retention,
            maximum_interval: params.maximum_interval.clamp(1, MAX_INTERVAL_DAYS),
        }
    }

    /// Retrievability after `days_elapsed` days at the given stability.
    pub fn retrievability(&self, stability: f32, days_elapsed: f32) -> f32 {
        if days_elapsed <= 0.0 {
            return 1.0;
        }
        if stability <= 0.001 {
            return 0.0;
        }

        let mem_state = fsrs::MemoryState {
            stability,
            difficulty: 5.0, // does not affect the curve
        };
        fsrs::current_retrievability(mem_state, days_elapsed, self.decay)
    }

    /// Current retrievability of a state. Never-reviewed states return 1.0.
    pub fn current_retrievability(&self, state: &MemoryState, now: DateTime<Utc>) -> f32 {
        match state.days_since_review(now) {
            Some(days) => self.retrievability(state.stability, days as f32),
            None => 1.0,
        }
    }

    /// Interval in whole days that reaches the requested retention.
    pub fn next_interval(&self, stability: f32) -> i64 {
        let ivl = stability / self.factor
            * (self.request_retention.powf(1.0 / -self.decay) - 1.0);
        (ivl.round() as i64).clamp(1, i64::from(self.maximum_interval))
    }

    /// All four candidate outcomes of grading `state` at `now`.
    pub fn preview(&self, state: &MemoryState, now: DateTime<Utc>) -> NextStates {
        let first_grade = state.is_new() || state.last_review.is_none() || state.stability <= 0.0;
        let elapsed = state.days_since_review(now).unwrap_or(0.0) as f32;
        let retrievability = self.current_retrievability(state, now);

        let model = |rating: Rating| -> (f32, f32) {
            if first_grade {
                return (self.init_stability(rating), self.init_difficulty(rating));
            }
            let d = state.difficulty.clamp(1.0, 10.0);
            let s = state.stability;
            let next_s = if elapsed < 1.0 {
                self.short_term_stability(s, rating)
            } else if rating == Rating::Again {
                self.forget_stability(d, s, retrievability)
            } else {
                self.recall_stability(d, s, retrievability, rating)
            };
            (next_s, self.next_difficulty(d, rating))
        };

        let (again_s, again_d) = model(Rating::Again);
        let (hard_s, hard_d) = model(Rating::Hard);
        let (good_s, good_d) = model(Rating::Good);
        let (easy_s, easy_d) = model(Rating::Easy);

        let in_review = state.status == CardStatus::Review;
        let max = i64::from(self.maximum_interval);

        let mut good_ivl = self.next_interval(good_s);
        let hard_ivl = self.next_interval(hard_s).min(good_ivl);
        if in_review {
            good_ivl = good_ivl.max(hard_ivl + 1).min(max);
        }
        let easy_ivl = self.next_interval(easy_s).max(good_ivl + 1).min(max);

        let base = MemoryState {
            last_review: Some(now),
            ..state.clone()
        };

        let again_minutes = match state.status {
            CardStatus::New => 1,
            CardStatus::Learning | CardStatus::Relearning => 5,
            CardStatus::Review => 10,
        };
        let again = MemoryState {
            status: match state.status {
                CardStatus::Review | CardStatus::Relearning => CardStatus::Relearning,
                CardStatus::New | CardStatus::Learning => CardStatus::Learning,
            },
            due: Some(now + Duration::minutes(again_minutes)),
            stability: again_s,
            difficulty: again_d,
            lapses: state.lapses + 1,
            ..base.clone()
        };

        let hard = if in_review {
            MemoryState {
                status: CardStatus::Review,
                due: Some(due_after_days(now, hard_ivl)),
                stability: hard_s,
                difficulty: hard_d,
                reps: state.reps + 1,
                ..base.clone()
            }
        } else {
            MemoryState {
                status: match state.status {
                    CardStatus::Relearning => CardStatus::Relearning,
                    _ => CardStatus::Learning,
                },
                due: Some(now + Duration::minutes(10)),
                stability: hard_s,
                difficulty: hard_d,
                reps: state.reps + 1,
                ..base.clone()
            }
        };

        let good = MemoryState {
            status: CardStatus::Review,
            due: Some(due_after_days(now, good_ivl)),
            stability: good_s,
            difficulty: good_d,
            reps: state.reps + 1,
            ..base.clone()
        };

        let easy = MemoryState {
            status: CardStatus::Review,
            due: Some(due_after_days(now, easy_ivl)),
            stability: easy_s,
            difficulty: easy_d,
            reps: state.reps + 1,
            ..base
        };

        NextStates {
            again,
            hard,
            good,
            easy,
        }
    }

    /// Grade a state.
    pub fn grade(&self, state: &MemoryState, rating: Rating, now: DateTime<Utc>) -> MemoryState {
        self.preview(state, now).into_state(rating)
    }

    fn init_stability(&self, rating: Rating) -> f32 {
        self.w[usize::from(rating.value()) - 1].max(S_MIN)
    }

    fn init_difficulty(&self, rating: Rating) -> f32 {
        let g = f32::from(rating.value());
        (self.w[4] - (self.w[5] * (g - 1.0)).exp() + 1.0).clamp(1.0, 10.0)
    }

    fn next_difficulty(&self, difficulty: f32, rating: Rating) -> f32 {
        let g = f32::from(rating.value());
        let delta = -self.w[6] * (g - 3.0);
        let damped = difficulty + delta * (10.0 - difficulty) / 9.0;
        let reverted = self.w[7] * self.init_difficulty(Rating::Easy) + (1.0 - self.w[7]) * damped;
        reverted.clamp(1.0, 10.0)
    }

    fn recall_stability(&self, d: f32, s: f32, r: f32, rating: Rating) -> f32 {
        let hard_penalty = if rating == Rating::Hard { self.w[15] } else { 1.0 };
        let easy_bonus = if rating == Rating::Easy { self.w[16] } else { 1.0 };
        let growth = self.w[8].exp()
            * (11.0 - d)
            * s.powf(-self.w[9])
            * (((1.0 - r) * self.w[10]).exp() - 1.0)
            * hard_penalty
            * easy_bonus;
        (s * (1.0 + growth)).max(S_MIN)
    }

    fn forget_stability(&self, d: f32, s: f32, r: f32) -> f32 {
        let raw = self.w[11]
            * d.powf(-self.w[12])
            * ((s + 1.0).powf(self.w[13]) - 1.0)
            * ((1.0 - r) * self.w[14]).exp();
        // Post-lapse stability never exceeds the pre-lapse stability.
        let ceiling = s / (self.w[17] * self.w[18]).exp();
        raw.min(ceiling).max(S_MIN)
    }

    fn short_term_stability(&self, s: f32, rating: Rating) -> f32 {
        let g = f32::from(rating.value());
        let mut increase = (self.w[17] * (g - 3.0 + self.w[18])).exp() * s.powf(-self.w[19]);
        if rating.value() >= Rating::Good.value() {
            increase = increase.max(1.0);
        }
        (s * increase).max(S_MIN)
    }
}

/// `now + days`, saturating at the latest representable instant.
fn due_after_days(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|span| now.checked_add_signed(span))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl Default for FsrsScheduler {
    fn default() -> Self {
        Self::new()
    }
}
