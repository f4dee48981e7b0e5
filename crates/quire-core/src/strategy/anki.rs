//! Anki-style bucket strategy.

use super::{RankContext, RankedItem};
use crate::scheduler::is_due;
use crate::types::{CardStatus, SessionItem};

/// Buckets in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    /// Learning or relearning steps.
    InSteps = 0,
    /// Review items whose due date has passed.
    DueReview = 1,
    /// Never graded.
    New = 2,
    /// Review items not yet due.
    NotDue = 3,
}

/// Bucket of a candidate at `context.now`.
pub fn bucket_of(candidate: &SessionItem, context: &RankContext) -> Bucket {
    match candidate.state.status {
        CardStatus::Learning | CardStatus::Relearning => Bucket::InSteps,
        CardStatus::New => Bucket::New,
        CardStatus::Review if is_due(&candidate.state, context.now) => Bucket::DueReview,
        CardStatus::Review => Bucket::NotDue,
    }
}

pub(super) fn rank<'a>(
    candidates: impl IntoIterator<Item = &'a SessionItem>,
    context: &RankContext,
) -> Vec<RankedItem<'a>> {
    let mut keyed: Vec<(Bucket, RankedItem<'a>)> = candidates
        .into_iter()
        .map(|item| {
            let bucket = bucket_of(item, context);
            (
                bucket,
                RankedItem {
                    item,
                    score: f64::from(bucket as u8),
                },
            )
        })
        .collect();

    // Fragments before whole-note topics, then id.
    keyed.sort_by(|(ba, a), (bb, b)| {
        ba.cmp(bb)
            .then_with(|| {
                let a_topic = !a.item.item.item_type.is_fragment();
                let b_topic = !b.item.item.item_type.is_fragment();
                a_topic.cmp(&b_topic)
            })
            .then_with(|| a.item.id().cmp(b.item.id()))
    });

    keyed.into_iter().map(|(_, ranked)| ranked).collect()
}
