//! Note/link platform trait.

use async_trait::async_trait;

use crate::error::QuireResult;

/// Host access to note content and the link graph between notes.
#[async_trait]
pub trait NotePlatform: Send + Sync {
    /// Raw content of a note, or None if it does not exist.
    async fn get_note(&self, note_id: &str) -> QuireResult<Option<String>>;

    /// Replace the content of a note.
    async fn set_note(&self, note_id: &str, content: &str) -> QuireResult<()>;

    /// Ids of notes linked from the given note. Unknown notes have no links.
    async fn get_links(&self, note_id: &str) -> QuireResult<Vec<String>>;
}
