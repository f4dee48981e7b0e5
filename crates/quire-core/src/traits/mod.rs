//! Collaborator traits bounding the engine.

mod item_store;
mod note_platform;

pub use item_store::*;
pub use note_platform::*;
