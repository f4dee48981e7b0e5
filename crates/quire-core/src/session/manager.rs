//! Session manager: pool, selection constraints and grading.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::error::QuireResult;
use crate::scheduler::Scheduler;
use crate::strategy::{RankContext, RankedItem, Strategy, StrategyKind};
use crate::traits::{ItemStore, NotePlatform};
use crate::types::{MemoryState, Rating, ReviewRecord, SessionItem, SessionStats};

use super::queue::{SessionHistory, VolatileQueue};

/// Options for [`SessionManager::load_pool`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Only load items whose note path lies under this folder.
    pub folder_filter: Option<String>,
}

impl LoadOptions {
    /// Restrict loading to a folder.
    pub fn folder(folder: impl Into<String>) -> Self {
        Self {
            folder_filter: Some(folder.into()),
        }
    }
}

/// Stateful orchestrator of one review session.
///
/// Operations that mutate the session take `&mut self`; callers sharing a
/// manager across tasks must serialize access themselves.
pub struct SessionManager {
    config: SessionConfig,
    scheduler: Scheduler,
    strategy: Strategy,
    store: Arc<dyn ItemStore>,
    platform: Arc<dyn NotePlatform>,
    pool: Vec<SessionItem>,
    volatile: VolatileQueue,
    history: SessionHistory,
    last_note_id: Option<String>,
    seed: u64,
    rng: StdRng,
    stats: SessionStats,
    new_introduced: usize,
}

impl SessionManager {
    /// Create a manager. The pool is empty until [`load_pool`](Self::load_pool).
    pub fn new(
        config: SessionConfig,
        store: Arc<dyn ItemStore>,
        platform: Arc<dyn NotePlatform>,
    ) -> QuireResult<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let scheduler = Scheduler::new(config.scheduler, &config.fsrs);
        let strategy = Strategy::new(config.strategy);
        debug!(
            "Session created: strategy={}, scheduler={}, seed={}",
            config.strategy, config.scheduler, seed
        );

        Ok(Self {
            config,
            scheduler,
            strategy,
            store,
            platform,
            pool: Vec::new(),
            volatile: VolatileQueue::new(),
            history: SessionHistory::new(),
            last_note_id: None,
            seed,
            rng: StdRng::seed_from_u64(seed),
            stats: SessionStats::default(),
            new_introduced: 0,
        })
    }

    /// Load items and their states from the store, replacing the pool.
    ///
    /// Items without stored state start as new. With an exam date configured,
    /// every state is passed through the exam adjustment. The volatile queue is
    /// cleared; history is kept. Returns the pool size.
    pub async fn load_pool(&mut self, now: DateTime<Utc>, options: LoadOptions) -> QuireResult<usize> {
        let items = self.store.list_items().await?;
        let total = items.len();

        let mut pool = Vec::with_capacity(total);
        for item in items {
            if let Some(folder) = options.folder_filter.as_deref() {
                if !item.is_in_folder(folder) {
                    continue;
                }
            }

            let mut state = self.store.get_state(&item.id).await?.unwrap_or_default();
            if let Some(exam_date) = self.config.exam_date {
                state = self.scheduler.apply_exam_adjustment(&state, exam_date, now);
            }
            pool.push(SessionItem::new(item, state));
        }

        self.pool = pool;
        self.volatile.clear();
        info!(
            "Loaded {} of {} items into session pool (folder filter: {:?})",
            self.pool.len(),
            total,
            options.folder_filter
        );
        Ok(self.pool.len())
    }

    /// Next item to present, or None when the session is complete.
    pub async fn get_next(&mut self, now: DateTime<Utc>) -> QuireResult<Option<SessionItem>> {
        let ranked = self.ranked_candidates(now).await?;
        if ranked.is_empty() {
            debug!("No eligible items left");
            return Ok(None);
        }

        let index = self.pick_index(ranked.len());
        if index > 0 {
            debug!("Interleaving rank {} of {}", index + 1, ranked.len());
        }
        Ok(ranked.into_iter().nth(index))
    }

    /// Up to `limit` upcoming items in ranked order, without interleaving.
    pub async fn get_next_n(
        &self,
        limit: usize,
        now: DateTime<Utc>,
    ) -> QuireResult<Vec<SessionItem>> {
        let mut ranked = self.ranked_candidates(now).await?;
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Grade an item. See [`record_review_timed`](Self::record_review_timed).
    pub async fn record_review(
        &mut self,
        item_id: &str,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> QuireResult<Option<MemoryState>> {
        self.record_review_timed(item_id, rating, now, None).await
    }

    /// Grade an item, noting how long the learner spent on it.
    ///
    /// Unknown ids are ignored and return None. The new state is computed
    /// before any write, so a failing scheduler leaves no trace. Store errors
    /// propagate and leave the in-memory session untouched.
    pub async fn record_review_timed(
        &mut self,
        item_id: &str,
        rating: Rating,
        now: DateTime<Utc>,
        elapsed_ms: Option<u64>,
    ) -> QuireResult<Option<MemoryState>> {
        let Some(index) = self.pool.iter().position(|c| c.id() == item_id) else {
            debug!("Ignoring review of '{}': not in pool", item_id);
            return Ok(None);
        };

        let before = self.pool[index].state.clone();
        let note_id = self.pool[index].item.note_id.clone();
        let next = self.scheduler.grade(&before, rating, now)?;

        if rating == Rating::Again {
            let record = ReviewRecord::snapshot(item_id, rating, &before, elapsed_ms, now);
            self.store.append_review(&record).await?;
        }
        self.store.set_state(item_id, &next).await?;
        let audit = ReviewRecord::audit(item_id, rating, &before, elapsed_ms, now);
        self.store.append_review(&audit).await?;

        self.pool[index].state = next.clone();
        if rating == Rating::Again {
            self.volatile.insert(item_id);
        } else if self.volatile.remove(item_id) {
            debug!("'{}' graduated from the volatile queue", item_id);
        }
        if before.is_new() {
            self.new_introduced += 1;
        }
        self.history.push(item_id, note_id.clone());
        self.last_note_id = Some(note_id);
        self.stats.record(rating);

        debug!(
            "Graded '{}' {}: {} -> {}, due {:?}",
            item_id, rating, before.status, next.status, next.due
        );
        Ok(Some(next))
    }

    /// Drop an item from the pool and volatile queue for the rest of the session.
    pub fn dismiss(&mut self, item_id: &str) -> bool {
        let before = self.pool.len();
        self.pool.retain(|c| c.id() != item_id);
        self.volatile.remove(item_id);
        self.pool.len() != before
    }

    /// Saved reading position of a topic.
    pub async fn scroll_position(&self, item_id: &str) -> QuireResult<Option<f64>> {
        self.store.get_scroll_pos(item_id).await
    }

    /// Save the reading position of a topic.
    pub async fn save_scroll_position(&self, item_id: &str, pos: f64) -> QuireResult<()> {
        self.store.set_scroll_pos(item_id, pos).await
    }

    /// Clear the session counters. Pool, queue and history are kept.
    pub fn reset_session(&mut self) {
        self.stats = SessionStats::default();
    }

    /// Grade counters since creation or the last reset.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Configuration the session was created with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Scheduler applied on grading.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Strategy used to rank candidates.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Items loaded by the last [`load_pool`](Self::load_pool), minus dismissed ones.
    pub fn pool(&self) -> &[SessionItem] {
        &self.pool
    }

    /// Ids of graded items, oldest first.
    pub fn history_ids(&self) -> Vec<&str> {
        self.history.ids()
    }

    /// Ids parked in the volatile queue.
    pub fn volatile_ids(&self) -> &[String] {
        self.volatile.ids()
    }

    /// Note of the most recently graded item.
    pub fn last_note_id(&self) -> Option<&str> {
        self.last_note_id.as_deref()
    }

    /// Seed of the interleaving RNG, for replaying a session.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Candidates after every selection filter, best first.
    async fn ranked_candidates(&self, now: DateTime<Utc>) -> QuireResult<Vec<SessionItem>> {
        let context = self.rank_context(now).await?;
        let ranked = self.strategy.rank(self.eligible(), &context);
        let ranked = self.apply_clump_limit(ranked);
        Ok(ranked.into_iter().map(|r| r.item.clone()).collect())
    }

    async fn rank_context(&self, now: DateTime<Utc>) -> QuireResult<RankContext> {
        let context = RankContext::new(now).with_seed(self.seed);
        match self.last_note_id.as_deref() {
            Some(note_id) => {
                let links = self.platform.get_links(note_id).await?;
                Ok(context.with_last_note(note_id, links))
            }
            None => Ok(context),
        }
    }

    fn eligible(&self) -> impl Iterator<Item = &SessionItem> + '_ {
        let new_exhausted = self
            .config
            .new_cards_limit
            .is_some_and(|limit| self.new_introduced >= limit);

        self.pool.iter().filter(move |candidate| {
            let id = candidate.id();
            let available = if self.volatile.contains(id) {
                self.volatile
                    .is_ready(id, &self.history, self.config.cooldown)
            } else {
                !self.history.contains(id)
            };
            available && !(new_exhausted && candidate.state.is_new())
        })
    }

    /// Skip the note the last `clump_limit` items came from, unless nothing else is left.
    fn apply_clump_limit<'a>(&self, ranked: Vec<RankedItem<'a>>) -> Vec<RankedItem<'a>> {
        let Some(note) = self.history.trailing_note_run(self.config.clump_limit) else {
            return ranked;
        };

        if ranked.iter().all(|r| r.item.note_id() == note) {
            return ranked;
        }
        debug!("Clump limit reached for note '{}'", note);
        ranked
            .into_iter()
            .filter(|r| r.item.note_id() != note)
            .collect()
    }

    fn pick_index(&mut self, candidates: usize) -> usize {
        let interleave = self.strategy.kind() == StrategyKind::Jd1
            && !self.config.deterministic
            && candidates > 1
            && self.rng.gen::<f64>() < self.config.interleave_probability;

        if interleave {
            self.rng.gen_range(1..candidates)
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuireError;
    use crate::scheduler::SchedulerKind;
    use crate::store::{InMemoryItemStore, InMemoryNotePlatform};
    use crate::types::{CardStatus, Item};
    use chrono::Duration;

    fn deterministic() -> SessionConfig {
        SessionConfig::builder().deterministic(true).seed(7).build()
    }

    async fn manager_with(
        config: SessionConfig,
        items: Vec<Item>,
    ) -> (SessionManager, Arc<InMemoryItemStore>) {
        let store = Arc::new(InMemoryItemStore::with_items(items));
        let platform = Arc::new(InMemoryNotePlatform::new());
        let mut manager = SessionManager::new(config, store.clone(), platform).unwrap();
        manager.load_pool(Utc::now(), LoadOptions::default()).await.unwrap();
        (manager, store)
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_config() {
        let config = SessionConfig::builder().clump_limit(0).build();
        let result = SessionManager::new(
            config,
            Arc::new(InMemoryItemStore::new()),
            Arc::new(InMemoryNotePlatform::new()),
        );
        assert!(matches!(result, Err(QuireError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_load_pool_defaults_missing_state() {
        let (manager, _) = manager_with(deterministic(), vec![Item::topic("a", "a.md")]).await;
        assert_eq!(manager.pool().len(), 1);
        assert_eq!(manager.pool()[0].state, MemoryState::new());
    }

    #[tokio::test]
    async fn test_load_pool_folder_filter() {
        let items = vec![
            Item::topic("a", "physics/a.md"),
            Item::topic("b", "history/b.md"),
            Item::cloze("c", "physics/deep/c.md", 1),
        ];
        let store = Arc::new(InMemoryItemStore::with_items(items));
        let mut manager =
            SessionManager::new(deterministic(), store, Arc::new(InMemoryNotePlatform::new()))
                .unwrap();

        let loaded = manager
            .load_pool(Utc::now(), LoadOptions::folder("physics"))
            .await
            .unwrap();
        assert_eq!(loaded, 2);
        assert!(manager.pool().iter().all(|c| c.item.note_path.starts_with("physics/")));
    }

    #[tokio::test]
    async fn test_load_pool_applies_exam_adjustment() {
        let now = Utc::now();
        let store = Arc::new(InMemoryItemStore::with_items(vec![Item::topic("a", "a.md")]));
        let mut stored = MemoryState::new();
        stored.status = CardStatus::Review;
        stored.due = Some(now + Duration::days(100));
        store.set_state("a", &stored).await.unwrap();

        let config = SessionConfig::builder()
            .deterministic(true)
            .exam_date(now + Duration::days(12))
            .build();
        let mut manager =
            SessionManager::new(config, store, Arc::new(InMemoryNotePlatform::new())).unwrap();
        manager.load_pool(now, LoadOptions::default()).await.unwrap();

        assert_eq!(manager.pool()[0].state.due, Some(now + Duration::days(2)));
    }

    #[tokio::test]
    async fn test_unknown_item_review_is_noop() {
        let (mut manager, store) = manager_with(deterministic(), vec![Item::topic("a", "a.md")]).await;
        let result = manager
            .record_review("missing", Rating::Good, Utc::now())
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(manager.history_ids().is_empty());
        assert_eq!(manager.stats().reviewed, 0);
        assert!(store.reviews().await.is_empty());
    }

    #[tokio::test]
    async fn test_again_logs_twice_and_parks_item() {
        let (mut manager, store) = manager_with(deterministic(), vec![Item::topic("a", "a.md")]).await;
        let now = Utc::now();

        let state = manager
            .record_review_timed("a", Rating::Again, now, Some(3_000))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state.status, CardStatus::Learning);
        assert_eq!(manager.volatile_ids(), ["a".to_string()]);
        assert_eq!(manager.last_note_id(), Some("a"));

        let reviews = store.reviews_for("a").await;
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].stability_before, None);
        assert_eq!(reviews[1].stability_before, Some(0.0));
        assert!(reviews.iter().all(|r| r.elapsed_ms == Some(3_000)));
        assert_eq!(store.get_state("a").await.unwrap(), Some(state));
    }

    #[tokio::test]
    async fn test_good_logs_once_and_graduates() {
        let (mut manager, store) = manager_with(deterministic(), vec![Item::topic("a", "a.md")]).await;
        let now = Utc::now();

        manager.record_review("a", Rating::Again, now).await.unwrap();
        manager
            .record_review("a", Rating::Good, now + Duration::minutes(5))
            .await
            .unwrap();

        assert!(manager.volatile_ids().is_empty());
        assert_eq!(store.reviews_for("a").await.len(), 3);
        assert_eq!(manager.history_ids(), vec!["a", "a"]);
    }

    #[tokio::test]
    async fn test_sm2_grade_fails_without_side_effects() {
        let config = SessionConfig::builder()
            .deterministic(true)
            .scheduler(SchedulerKind::Sm2)
            .build();
        let (mut manager, store) = manager_with(config, vec![Item::topic("a", "a.md")]).await;

        let err = manager
            .record_review("a", Rating::Again, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, QuireError::NotImplemented { .. }));
        assert!(store.reviews().await.is_empty());
        assert!(manager.volatile_ids().is_empty());
        assert!(manager.history_ids().is_empty());
    }

    #[tokio::test]
    async fn test_stats_and_reset() {
        let items = vec![Item::topic("a", "a.md"), Item::topic("b", "b.md")];
        let (mut manager, _) = manager_with(deterministic(), items).await;
        let now = Utc::now();

        manager.record_review("a", Rating::Again, now).await.unwrap();
        manager.record_review("b", Rating::Easy, now).await.unwrap();
        let stats = manager.stats();
        assert_eq!((stats.reviewed, stats.again, stats.easy), (2, 1, 1));

        manager.reset_session();
        assert_eq!(manager.stats(), SessionStats::default());
        assert_eq!(manager.pool().len(), 2);
        assert_eq!(manager.history_ids().len(), 2);
    }

    #[tokio::test]
    async fn test_dismiss_removes_from_pool_and_queue() {
        let items = vec![Item::topic("a", "a.md"), Item::topic("b", "b.md")];
        let (mut manager, _) = manager_with(SessionConfig::builder().deterministic(true).cooldown(0).build(), items).await;
        let now = Utc::now();

        manager.record_review("a", Rating::Again, now).await.unwrap();
        assert!(manager.dismiss("a"));
        assert!(!manager.dismiss("a"));
        assert!(manager.volatile_ids().is_empty());

        let next = manager.get_next(now).await.unwrap().unwrap();
        assert_eq!(next.id(), "b");
    }

    #[tokio::test]
    async fn test_new_cards_limit() {
        let items = vec![
            Item::topic("a", "a.md"),
            Item::topic("b", "b.md"),
            Item::topic("c", "c.md"),
        ];
        let config = SessionConfig::builder()
            .deterministic(true)
            .new_cards_limit(Some(2))
            .build();
        let (mut manager, _) = manager_with(config, items).await;
        let now = Utc::now();

        for _ in 0..2 {
            let next = manager.get_next(now).await.unwrap().unwrap();
            manager.record_review(next.id(), Rating::Good, now).await.unwrap();
        }
        assert!(manager.get_next(now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_next_n_is_ranked_prefix() {
        let items = vec![
            Item::topic("a", "a.md").with_priority(10),
            Item::topic("b", "b.md").with_priority(90),
            Item::topic("c", "c.md").with_priority(50),
        ];
        let (manager, _) = manager_with(deterministic(), items).await;

        let next = manager.get_next_n(2, Utc::now()).await.unwrap();
        let ids: Vec<&str> = next.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_scroll_position_round_trip() {
        let (manager, _) = manager_with(deterministic(), vec![Item::topic("a", "a.md")]).await;
        manager.save_scroll_position("a", 0.6).await.unwrap();
        assert_eq!(manager.scroll_position("a").await.unwrap(), Some(0.6));
    }

    #[tokio::test]
    async fn test_accessors_reflect_config() {
        let config = SessionConfig::builder()
            .deterministic(true)
            .seed(7)
            .strategy(StrategyKind::Anki)
            .scheduler(SchedulerKind::Topic)
            .build();
        let (manager, _) = manager_with(config.clone(), vec![]).await;

        assert_eq!(manager.seed(), 7);
        assert_eq!(manager.config(), &config);
        assert_eq!(manager.strategy().kind(), StrategyKind::Anki);
        assert_eq!(manager.scheduler().kind(), SchedulerKind::Topic);
        assert_eq!(manager.last_note_id(), None);
    }
}
