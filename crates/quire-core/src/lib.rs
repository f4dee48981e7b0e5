//! quire-core - Spaced-repetition session engine.
//!
//! This crate decides what a learner reviews next and how each grade moves
//! an item's memory state. Storage and note access are supplied by the host
//! through the [`ItemStore`] and [`NotePlatform`] traits.
//!
//! # Example
//!
//! ```ignore
//! use quire_core::{InMemoryItemStore, InMemoryNotePlatform, Item, LoadOptions, Rating, SessionConfig, SessionManager};
//!
//! let store = Arc::new(InMemoryItemStore::with_items(vec![Item::topic("intro", "physics/intro.md")]));
//! let platform = Arc::new(InMemoryNotePlatform::new());
//! let mut session = SessionManager::new(SessionConfig::default(), store, platform)?;
//!
//! session.load_pool(Utc::now(), LoadOptions::default()).await?;
//! while let Some(item) = session.get_next(Utc::now()).await? {
//!     session.record_review(item.id(), Rating::Good, Utc::now()).await?;
//! }
//! ```

pub mod config;
pub mod error;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod strategy;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{SessionConfig, SessionConfigBuilder};
pub use error::{ErrorCode, QuireError, QuireResult};
pub use scheduler::{FsrsParameters, FsrsScheduler, Scheduler, SchedulerKind, TopicScheduler};
pub use session::{LoadOptions, SessionManager};
pub use store::{InMemoryItemStore, InMemoryNotePlatform};
pub use strategy::{RankContext, RankedItem, Strategy, StrategyKind};
pub use traits::{ItemStore, NotePlatform};
pub use types::{
    CardStatus, Item, ItemType, MemoryState, Rating, ReviewRecord, SessionItem, SessionStats,
};
