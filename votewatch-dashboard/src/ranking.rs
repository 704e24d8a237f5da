//! Ranked view of a candidate list.

use serde::Serialize;
use votewatch_core::Candidate;

/// One row of a ranked list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    /// 1-based position after sorting.
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub party: Option<String>,
    pub votes: u64,
    /// Lead over the next-lower-ranked candidate; 0 for the last row.
    pub gap: u64,
    /// Percent of the list total; 0.0 when the total is 0.
    pub share: f64,
}

/// Sort descending by votes and derive rank, gap and share.
///
/// The sort is stable: candidates with equal votes keep their input order.
pub fn rank(candidates: &[Candidate]) -> Vec<RankedCandidate> {
    let mut sorted: Vec<&Candidate> = candidates.iter().collect();
    sorted.sort_by(|a, b| b.votes.cmp(&a.votes));

    let total = sorted
        .iter()
        .fold(0u64, |acc, c| acc.saturating_add(c.votes));

    sorted
        .iter()
        .enumerate()
        .map(|(pos, candidate)| {
            let gap = sorted
                .get(pos + 1)
                .map_or(0, |next| candidate.votes - next.votes);
            RankedCandidate {
                rank: pos + 1,
                id: candidate.id.clone(),
                name: candidate.name.clone(),
                party: candidate.party.clone(),
                votes: candidate.votes,
                gap,
                share: share(candidate.votes, total),
            }
        })
        .collect()
}

fn share(votes: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        votes as f64 * 100.0 / total as f64
    }
}
