//! VoteWatch Storage - In-Memory TTL Cache
//!
//! Single-process, non-persistent cache used for both raw upstream documents
//! and derived candidate lists.

pub mod cache;

pub use cache::{CacheRead, CacheStats, Clock, ManualClock, SystemClock, TtlCache};
