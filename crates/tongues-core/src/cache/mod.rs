//! Response caching for vendor calls
//!
//! - `CacheStore`: the injected key-value seam (get, set with optional TTL)
//! - `MemoryCacheStore`: bounded in-process LRU implementation
//! - `ResponseCache`: content-addressed memoization wrapper used by every engine

pub mod store;
pub mod response;

pub use store::{CacheStore, MemoryCacheStore};
pub use response::{ResponseCache, normalize_base_uri};
