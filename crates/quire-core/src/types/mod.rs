//! Core data types for quire.

mod item;
mod review;
mod state;

pub use item::{Item, ItemType, SessionItem, FRAGMENT_ID_SEPARATOR};
pub use review::{ReviewRecord, SessionStats};
pub use state::{CardStatus, MemoryState, Rating};
