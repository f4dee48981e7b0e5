//! Review session orchestration.

mod manager;
mod queue;

pub use manager::{LoadOptions, SessionManager};
pub use queue::{SessionHistory, VolatileQueue};
