//! VoteWatch Core - Candidate Model and Vote Aggregation
//!
//! Pure data types and transformations with no I/O:
//! - [`Candidate`] / [`ScopeResult`]: per-electorate candidate lists
//! - [`upstream`]: validated traversal of the upstream `scopes` documents
//! - [`aggregate`]: national extraction, diaspora fold and the combined union
//! - [`error`]: the error taxonomy shared by every other crate

pub mod aggregate;
pub mod candidate;
pub mod error;
pub mod upstream;

pub use aggregate::{combine, extract_diaspora, extract_romania};
pub use candidate::{Candidate, Electorate, ListKey, ScopeResult};
pub use error::{
    AggregationError, FetchError, FetchErrorKind, UpstreamUnavailable, VoteError, VoteResult,
    PAGE_SNAPSHOT_LIMIT,
};
