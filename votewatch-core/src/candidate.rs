//! Candidate and scope result types.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A candidate with the votes counted for them in one scope.
///
/// Serializes to the public wire shape
/// `{ "id": string, "candidate": string, "party": string|null, "votes": number }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    #[serde(rename = "candidate")]
    pub name: String,
    pub party: Option<String>,
    pub votes: u64,
}

impl Candidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, votes: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            party: None,
            votes,
        }
    }

    pub fn with_party(mut self, party: impl Into<String>) -> Self {
        self.party = Some(party.into());
        self
    }
}

/// One electorate snapshot: a list of candidates with unique ids.
///
/// Order is insertion order. It carries no meaning for callers but is
/// deterministic for a given input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeResult {
    candidates: Vec<Candidate>,
}

impl ScopeResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from candidates whose ids are already unique.
    pub(crate) fn from_unique(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    /// Build from an arbitrary candidate list, keeping the first entry for
    /// each id. Returns the list and the number of dropped duplicates.
    pub fn dedup_first(candidates: impl IntoIterator<Item = Candidate>) -> (Self, usize) {
        let mut seen = HashSet::new();
        let mut dropped = 0;
        let mut unique = Vec::new();
        for candidate in candidates {
            if seen.insert(candidate.id.clone()) {
                unique.push(candidate);
            } else {
                dropped += 1;
            }
        }
        (Self { candidates: unique }, dropped)
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Votes recorded for `id`, 0 when the candidate is absent.
    pub fn votes(&self, id: &str) -> u64 {
        self.get(id).map_or(0, |c| c.votes)
    }

    pub fn total_votes(&self) -> u64 {
        self.candidates
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.votes))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|c| c.id.as_str())
    }
}

impl FromIterator<Candidate> for ScopeResult {
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> Self {
        Self::dedup_first(iter).0
    }
}

impl<'a> IntoIterator for &'a ScopeResult {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

/// The two electorates published by the upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Electorate {
    Romania,
    Diaspora,
}

impl Electorate {
    pub const ALL: [Electorate; 2] = [Electorate::Romania, Electorate::Diaspora];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Romania => "romania",
            Self::Diaspora => "diaspora",
        }
    }

    pub fn list_key(&self) -> ListKey {
        match self {
            Self::Romania => ListKey::Romania,
            Self::Diaspora => ListKey::Diaspora,
        }
    }
}

impl fmt::Display for Electorate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys of the derived candidate-list cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKey {
    Romania,
    Diaspora,
    Combined,
}

impl ListKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Romania => "romania",
            Self::Diaspora => "diaspora",
            Self::Combined => "combined",
        }
    }
}

impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
