//! Cache module for storing raw API payloads on disk
//!
//! Each cache key maps to exactly one `<key>.json` file holding the last payload
//! that was fetched successfully for it. There is no expiry: the fetch layer
//! decides when to bypass the cache, and stale payloads are kept around as a
//! fallback for when the upstream API is unreachable.

mod manager;

pub use manager::{write_atomic, CacheManager};
