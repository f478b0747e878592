//! Key/value caching with per-entry expiry.
//!
//! `CacheStorage` is the raw store (SQLite on disk or in memory, or a no-op
//! store when caching is disabled). `CacheLayer` keeps typed lists in it as JSON
//! under a fixed time-to-live.

mod layer;
mod storage;

pub use layer::CacheLayer;
pub use storage::{CacheStorage, NoopStorage, SqliteStorage};
