//! Poll state machine.
//!
//! `Loading` until the first poll completes. Each poll then replaces the
//! state wholesale: a failure drops the previous snapshot.

use crate::api_client::VotesSnapshot;
use crate::ranking::{rank, RankedCandidate};

/// The three lists of a snapshot, ranked.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSnapshot {
    pub romania: Vec<RankedCandidate>,
    pub diaspora: Vec<RankedCandidate>,
    pub combined: Vec<RankedCandidate>,
}

impl From<&VotesSnapshot> for RankedSnapshot {
    fn from(snapshot: &VotesSnapshot) -> Self {
        Self {
            romania: rank(&snapshot.romania),
            diaspora: rank(&snapshot.diaspora),
            combined: rank(&snapshot.combined),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PollState {
    #[default]
    Loading,
    Ready(RankedSnapshot),
    Failed(String),
}

impl PollState {
    /// Apply the outcome of one poll.
    pub fn apply<E: std::fmt::Display>(&mut self, outcome: Result<VotesSnapshot, E>) {
        *self = match outcome {
            Ok(snapshot) => PollState::Ready(RankedSnapshot::from(&snapshot)),
            Err(err) => PollState::Failed(err.to_string()),
        };
    }

    pub fn snapshot(&self) -> Option<&RankedSnapshot> {
        match self {
            PollState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PollState::Loading => "loading",
            PollState::Ready(_) => "ready",
            PollState::Failed(_) => "failed",
        }
    }
}
