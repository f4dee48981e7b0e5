//! JD1 priority strategy.
//!
//! ```text
//! score = priority * 100
//!       + 50  if topic
//!       + 30  if linked from the previous note
//!       + urgency + recency + age bonus
//! ```
//!
//! Priority dominates; the remaining terms only reorder items of equal
//! priority.

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;

use super::{RankContext, RankedItem};
use crate::types::{ItemType, SessionItem};

const PRIORITY_WEIGHT: f64 = 100.0;
const TOPIC_BONUS: f64 = 50.0;
const LINK_BONUS: f64 = 30.0;
const MAX_URGENCY: f64 = 25.0;
const MAX_RECENCY: f64 = 10.0;
const MAX_AGE_BONUS: f64 = 10.0;

/// Individual terms of a JD1 score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub priority: f64,
    pub topic: f64,
    pub link: f64,
    pub urgency: f64,
    pub recency: f64,
    pub age: f64,
}

impl ScoreBreakdown {
    /// Sum of all terms.
    pub fn total(&self) -> f64 {
        self.priority + self.topic + self.link + self.urgency + self.recency + self.age
    }
}

/// Score one candidate.
pub fn jd1_score(candidate: &SessionItem, context: &RankContext) -> ScoreBreakdown {
    let item = &candidate.item;
    let state = &candidate.state;

    let (urgency, recency) = match state.days_since_review(context.now) {
        Some(days) => {
            let stability = f64::from(state.stability).max(1.0);
            (
                (1.0 - (-days / stability).exp()) * MAX_URGENCY,
                (days / 7.0).floor().min(MAX_RECENCY),
            )
        }
        None => (MAX_URGENCY, 0.0),
    };

    let age = if state.is_new() {
        item.created
            .map(|created| age_in_days(created, context.now).min(MAX_AGE_BONUS))
            .unwrap_or(0.0)
    } else {
        0.0
    };

    ScoreBreakdown {
        priority: f64::from(item.priority) * PRIORITY_WEIGHT,
        topic: if item.item_type == ItemType::Topic { TOPIC_BONUS } else { 0.0 },
        link: if context.linked_notes.contains(&item.note_id) { LINK_BONUS } else { 0.0 },
        urgency,
        recency,
        age,
    }
}

fn age_in_days(created: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now.signed_duration_since(created).num_seconds() as f64 / 86_400.0)
        .floor()
        .max(0.0)
}

pub(super) fn rank<'a>(
    candidates: impl IntoIterator<Item = &'a SessionItem>,
    context: &RankContext,
) -> Vec<RankedItem<'a>> {
    let mut ranked: Vec<RankedItem<'a>> = candidates
        .into_iter()
        .map(|item| RankedItem {
            item,
            score: jd1_score(item, context).total(),
        })
        .collect();

    ranked.sort_by(|a, b| {
        OrderedFloat(b.score)
            .cmp(&OrderedFloat(a.score))
            .then_with(|| a.item.id().cmp(b.item.id()))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::Strategy;
    use crate::types::{CardStatus, Item, MemoryState};
    use chrono::Duration;

    fn fresh(item: Item) -> SessionItem {
        SessionItem::new(item, MemoryState::new())
    }

    fn reviewed(item: Item, stability: f32, days_ago: i64, now: DateTime<Utc>) -> SessionItem {
        let state = MemoryState {
            status: CardStatus::Review,
            due: Some(now),
            stability,
            difficulty: 5.0,
            reps: 2,
            lapses: 0,
            last_review: Some(now - Duration::days(days_ago)),
        };
        SessionItem::new(item, state)
    }

    fn ids(ranked: &[RankedItem<'_>]) -> Vec<String> {
        ranked.iter().map(|r| r.item.id().to_string()).collect()
    }

    #[test]
    fn test_priority_dominates() {
        let now = Utc::now();
        let a = fresh(Item::topic("A", "A.md").with_priority(90));
        let b = fresh(Item::topic("B", "B.md").with_priority(10));

        let ranked = Strategy::Jd1.rank([&b, &a], &RankContext::new(now));
        assert_eq!(ids(&ranked), vec!["A", "B"]);
    }

    #[test]
    fn test_never_reviewed_gets_flat_urgency() {
        let now = Utc::now();
        let item = fresh(Item::cloze("n", "n.md", 1).with_priority(0));
        let score = jd1_score(&item, &RankContext::new(now));
        assert_eq!(score.urgency, 25.0);
        assert_eq!(score.recency, 0.0);
        assert_eq!(score.topic, 0.0);
        assert_eq!(score.total(), 25.0);
    }

    #[test]
    fn test_urgency_and_recency_terms() {
        let now = Utc::now();
        let item = reviewed(Item::cloze("n", "n.md", 1).with_priority(0), 10.0, 21, now);
        let score = jd1_score(&item, &RankContext::new(now));

        let expected_urgency = (1.0 - (-21.0f64 / 10.0).exp()) * 25.0;
        assert!((score.urgency - expected_urgency).abs() < 1e-9);
        assert_eq!(score.recency, 3.0);
    }

    #[test]
    fn test_recency_is_capped() {
        let now = Utc::now();
        let item = reviewed(Item::topic("n", "n.md"), 0.5, 400, now);
        let score = jd1_score(&item, &RankContext::new(now));
        assert_eq!(score.recency, 10.0);
        assert!(score.urgency <= 25.0);
    }

    #[test]
    fn test_low_stability_treated_as_one_day() {
        let now = Utc::now();
        let low = reviewed(Item::topic("a", "a.md"), 0.1, 2, now);
        let one = reviewed(Item::topic("b", "b.md"), 1.0, 2, now);
        let ctx = RankContext::new(now);
        assert_eq!(jd1_score(&low, &ctx).urgency, jd1_score(&one, &ctx).urgency);
    }

    #[test]
    fn test_link_bonus_applies_to_linked_notes() {
        let now = Utc::now();
        let linked = fresh(Item::cloze("linked", "linked.md", 1));
        let other = fresh(Item::cloze("other", "other.md", 1));
        let ctx = RankContext::new(now).with_last_note("prev", vec!["linked".to_string()]);

        assert_eq!(jd1_score(&linked, &ctx).link, 30.0);
        assert_eq!(jd1_score(&other, &ctx).link, 0.0);

        let ranked = Strategy::Jd1.rank([&other, &linked], &ctx);
        assert_eq!(ranked[0].item.id(), "linked::c1");
    }

    #[test]
    fn test_age_bonus_only_for_new_items() {
        let now = Utc::now();
        let created = now - Duration::days(4) - Duration::hours(6);
        let new_item = fresh(Item::topic("a", "a.md").with_created(created));
        let old_item = reviewed(Item::topic("b", "b.md").with_created(created), 5.0, 1, now);
        let ctx = RankContext::new(now);

        assert_eq!(jd1_score(&new_item, &ctx).age, 4.0);
        assert_eq!(jd1_score(&old_item, &ctx).age, 0.0);

        let ancient = fresh(Item::topic("c", "c.md").with_created(now - Duration::days(300)));
        assert_eq!(jd1_score(&ancient, &ctx).age, 10.0);
    }

    #[test]
    fn test_ties_broken_by_id() {
        let now = Utc::now();
        let c = fresh(Item::topic("c", "c.md"));
        let a = fresh(Item::topic("a", "a.md"));
        let b = fresh(Item::topic("b", "b.md"));

        let ranked = Strategy::Jd1.rank([&c, &a, &b], &RankContext::new(now));
        assert_eq!(ids(&ranked), vec!["a", "b", "c"]);
    }
}
