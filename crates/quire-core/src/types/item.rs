//! Reviewable items and their session pairing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::state::MemoryState;

/// Separator between note id and cloze key in fragment ids.
pub const FRAGMENT_ID_SEPARATOR: &str = "::";

/// Kind of reviewable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemType {
    /// A whole note read incrementally.
    Topic,
    /// Fill-in-the-blank fragment.
    Cloze,
    /// Front/back card.
    Basic,
    /// Masked region of an image.
    ImageOcclusion,
}

impl ItemType {
    /// Fragments are extracted from a note; topics are the note itself.
    pub fn is_fragment(self) -> bool {
        !matches!(self, ItemType::Topic)
    }
}

/// One reviewable unit, as supplied by the item store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique id. Fragments use `<note_id>::<cloze key>`.
    pub id: String,
    /// Owning note.
    pub note_id: String,
    /// Store-resolved location, opaque to the engine.
    pub note_path: String,
    /// Kind of unit.
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// Cloze slot number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloze_index: Option<u32>,
    /// 0-100, higher is more important.
    pub priority: u8,
    /// Creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

impl Item {
    /// Create a topic item for a whole note.
    pub fn topic(note_id: impl Into<String>, note_path: impl Into<String>) -> Self {
        let note_id = note_id.into();
        Self {
            id: note_id.clone(),
            note_id,
            note_path: note_path.into(),
            item_type: ItemType::Topic,
            cloze_index: None,
            priority: 50,
            created: None,
        }
    }

    /// Create a cloze fragment of a note.
    pub fn cloze(note_id: impl Into<String>, note_path: impl Into<String>, index: u32) -> Self {
        let note_id = note_id.into();
        Self {
            id: Self::fragment_id(&note_id, &format!("c{}", index)),
            note_id,
            note_path: note_path.into(),
            item_type: ItemType::Cloze,
            cloze_index: Some(index),
            priority: 50,
            created: None,
        }
    }

    /// Compose a fragment id from a note id and a slot key.
    pub fn fragment_id(note_id: &str, key: &str) -> String {
        format!("{}{}{}", note_id, FRAGMENT_ID_SEPARATOR, key)
    }

    /// Set the item id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the item type.
    pub fn with_type(mut self, item_type: ItemType) -> Self {
        self.item_type = item_type;
        self
    }

    /// Set the priority, clamped to 0-100.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.min(100);
        self
    }

    /// Set the creation time.
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// Whether the note lives under `folder` (path prefix match on segment boundaries).
    pub fn is_in_folder(&self, folder: &str) -> bool {
        let folder = folder.trim_end_matches('/');
        if folder.is_empty() {
            return true;
        }
        self.note_path == folder
            || self
                .note_path
                .strip_prefix(folder)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// An item paired with its current memory state for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionItem {
    /// The reviewable unit.
    pub item: Item,
    /// Its current state.
    pub state: MemoryState,
}

impl SessionItem {
    /// Pair an item with a state.
    pub fn new(item: Item, state: MemoryState) -> Self {
        Self { item, state }
    }

    /// Item id.
    pub fn id(&self) -> &str {
        &self.item.id
    }

    /// Owning note id.
    pub fn note_id(&self) -> &str {
        &self.item.note_id
    }
}
