//! In-memory collaborators.
//!
//! Nothing is persisted; contents live as long as the value does. Useful for
//! tests and for hosts that run a throwaway session.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::QuireResult;
use crate::traits::{ItemStore, NotePlatform};
use crate::types::{Item, MemoryState, ReviewRecord};

/// In-memory [`ItemStore`].
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    items: RwLock<Vec<Item>>,
    states: RwLock<HashMap<String, MemoryState>>,
    reviews: RwLock<Vec<ReviewRecord>>,
    scroll: RwLock<HashMap<String, f64>>,
}

impl InMemoryItemStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given items.
    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items: RwLock::new(items),
            ..Default::default()
        }
    }

    /// Add or replace an item (matched by id).
    pub async fn upsert_item(&self, item: Item) {
        let mut items = self.items.write().await;
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
    }

    /// Remove an item and its state.
    pub async fn remove_item(&self, item_id: &str) -> bool {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| item.id != item_id);
        self.states.write().await.remove(item_id);
        items.len() != before
    }

    /// Copy of the review log.
    pub async fn reviews(&self) -> Vec<ReviewRecord> {
        self.reviews.read().await.clone()
    }

    /// Review log entries for one item.
    pub async fn reviews_for(&self, item_id: &str) -> Vec<ReviewRecord> {
        self.reviews
            .read()
            .await
            .iter()
            .filter(|record| record.item_id == item_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn list_items(&self) -> QuireResult<Vec<Item>> {
        Ok(self.items.read().await.clone())
    }

    async fn get_state(&self, item_id: &str) -> QuireResult<Option<MemoryState>> {
        Ok(self.states.read().await.get(item_id).cloned())
    }

    async fn set_state(&self, item_id: &str, state: &MemoryState) -> QuireResult<()> {
        self.states
            .write()
            .await
            .insert(item_id.to_string(), state.clone());
        Ok(())
    }

    async fn append_review(&self, record: &ReviewRecord) -> QuireResult<()> {
        self.reviews.write().await.push(record.clone());
        Ok(())
    }

    async fn get_scroll_pos(&self, item_id: &str) -> QuireResult<Option<f64>> {
        Ok(self.scroll.read().await.get(item_id).copied())
    }

    async fn set_scroll_pos(&self, item_id: &str, pos: f64) -> QuireResult<()> {
        self.scroll.write().await.insert(item_id.to_string(), pos);
        Ok(())
    }
}

/// In-memory [`NotePlatform`].
#[derive(Debug, Default)]
pub struct InMemoryNotePlatform {
    notes: RwLock<HashMap<String, String>>,
    links: RwLock<HashMap<String, HashSet<String>>>,
}

impl InMemoryNotePlatform {
    /// Create an empty platform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a link from one note to another.
    pub async fn add_link(&self, from: impl Into<String>, to: impl Into<String>) {
        self.links
            .write()
            .await
            .entry(from.into())
            .or_default()
            .insert(to.into());
    }
}

#[async_trait]
impl NotePlatform for InMemoryNotePlatform {
    async fn get_note(&self, note_id: &str) -> QuireResult<Option<String>> {
        Ok(self.notes.read().await.get(note_id).cloned())
    }

    async fn set_note(&self, note_id: &str, content: &str) -> QuireResult<()> {
        self.notes
            .write()
            .await
            .insert(note_id.to_string(), content.to_string());
        Ok(())
    }

    async fn get_links(&self, note_id: &str) -> QuireResult<Vec<String>> {
        let mut links: Vec<String> = self
            .links
            .read()
            .await
            .get(note_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        links.sort();
        Ok(links)
    }
}
