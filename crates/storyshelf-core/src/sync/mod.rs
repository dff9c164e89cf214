//! Reconciliation between the remote story service and the local cache.

pub mod engine;
pub mod source;

pub use engine::{ReconciliationEngine, StoriesOrigin, SyncedStories};
pub use source::StorySource;
