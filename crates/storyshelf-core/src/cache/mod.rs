//! Cache bookkeeping shared by the repositories.
//!
//! - `CacheMeta`: per-profile last-update timestamp and the 5 minute TTL
//! - `KeyLocks`: per-key async mutexes serializing read-modify-write cycles

pub mod locks;
pub mod meta;

pub use locks::KeyLocks;
pub use meta::{CacheMeta, CacheStatus, CACHE_TTL_MINUTES};
