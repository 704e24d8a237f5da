//! Response types for the HTTP API.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use votewatch_core::ScopeResult;

/// Body of `GET /votes`.
///
/// Each list serializes as an array of
/// `{ id, candidate, party, votes }` objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotesResponse {
    pub romania: Arc<ScopeResult>,
    pub diaspora: Arc<ScopeResult>,
    pub combined: Arc<ScopeResult>,
}
