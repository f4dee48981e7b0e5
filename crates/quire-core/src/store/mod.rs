//! Reference collaborator implementations.

mod memory;

pub use memory::{InMemoryItemStore, InMemoryNotePlatform};
