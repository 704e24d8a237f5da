//! Short-TTL cache with explicit expiry semantics.
//!
//! Entries carry their own deadline (`expires_at = set time + ttl`). A read
//! returns the value only while `now < expires_at`; the first read after the
//! deadline removes the entry. Nothing sweeps expired entries in the
//! background; memory for an expired key is reclaimed on its next access.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use votewatch_storage::{ManualClock, TtlCache};
//!
//! let clock = ManualClock::new();
//! let cache = TtlCache::with_clock(Duration::from_secs(30), clock.clone());
//! cache.set("romania", 1u64);
//!
//! clock.advance(Duration::from_secs(29));
//! assert_eq!(cache.get("romania"), Some(1));
//!
//! clock.advance(Duration::from_secs(2));
//! assert_eq!(cache.get("romania"), None);
//! ```

pub mod clock;
pub mod read;
pub mod stats;
pub mod ttl;

pub use clock::{Clock, ManualClock, SystemClock};
pub use read::CacheRead;
pub use stats::CacheStats;
pub use ttl::TtlCache;
