//! Item/state store trait.

use async_trait::async_trait;

use crate::error::QuireResult;
use crate::types::{Item, MemoryState, ReviewRecord};

/// Source of items and owner of their persisted state.
///
/// The engine never interprets how state is stored. Errors returned here are
/// propagated unchanged to the caller of the session operation.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// All reviewable items currently known.
    async fn list_items(&self) -> QuireResult<Vec<Item>>;

    /// Stored state for an item, or None if it has never been persisted.
    async fn get_state(&self, item_id: &str) -> QuireResult<Option<MemoryState>>;

    /// Persist the state of an item.
    async fn set_state(&self, item_id: &str, state: &MemoryState) -> QuireResult<()>;

    /// Append an entry to the review log.
    async fn append_review(&self, record: &ReviewRecord) -> QuireResult<()>;

    /// Saved reading position of a topic.
    async fn get_scroll_pos(&self, item_id: &str) -> QuireResult<Option<f64>>;

    /// Save the reading position of a topic.
    async fn set_scroll_pos(&self, item_id: &str, pos: f64) -> QuireResult<()>;
}
