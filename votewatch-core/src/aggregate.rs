//! Vote aggregation over parsed upstream documents.
//!
//! All three operations are pure: the same document (or the same pair of
//! scope results) always yields the same output, including candidate order.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::warn;

use crate::candidate::{Candidate, ScopeResult};
use crate::error::AggregationError;
use crate::upstream;

/// Candidate list of the national presidential scope.
///
/// Upstream order is kept. Upstream lists each candidate once; should an id
/// repeat, only its first entry is kept.
pub fn extract_romania(doc: &Value) -> Result<ScopeResult, AggregationError> {
    let candidates = upstream::national_candidates(doc)?;
    let (scope, dropped) = ScopeResult::dedup_first(candidates);
    if dropped > 0 {
        warn!(dropped, "Duplicate candidate ids in national scope, kept first entries");
    }
    Ok(scope)
}

/// Fold every regional candidate list of the diaspora document into one.
///
/// Votes for the same id are summed across regions. The first region that
/// mentions an id decides its `name` and `party`. Within a single region an
/// id is counted once.
pub fn extract_diaspora(doc: &Value) -> Result<ScopeResult, AggregationError> {
    let regions = upstream::regional_candidates(doc)?;

    let mut folded: Vec<Candidate> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for region in regions {
        let mut seen_in_region = HashSet::new();
        for candidate in region.candidates {
            if !seen_in_region.insert(candidate.id.clone()) {
                warn!(
                    region = %region.region,
                    id = %candidate.id,
                    "Duplicate candidate id within region, ignoring"
                );
                continue;
            }
            match index.get(&candidate.id) {
                Some(&pos) => {
                    let entry = &mut folded[pos];
                    entry.votes = entry.votes.saturating_add(candidate.votes);
                }
                None => {
                    index.insert(candidate.id.clone(), folded.len());
                    folded.push(candidate);
                }
            }
        }
    }

    Ok(ScopeResult::from_unique(folded))
}

/// Left-seeded union of two scope results, summing votes for shared ids.
///
/// The result starts as a copy of `romania`; diaspora votes are added to
/// matching entries and diaspora-only candidates are appended in diaspora
/// order. Neither input is modified.
pub fn combine(romania: &ScopeResult, diaspora: &ScopeResult) -> ScopeResult {
    let mut combined: Vec<Candidate> = romania.candidates().to_vec();
    let mut index: HashMap<&str, usize> = romania
        .iter()
        .enumerate()
        .map(|(pos, c)| (c.id.as_str(), pos))
        .collect();

    for candidate in diaspora {
        match index.get(candidate.id.as_str()) {
            Some(&pos) => {
                let entry = &mut combined[pos];
                entry.votes = entry.votes.saturating_add(candidate.votes);
            }
            None => {
                index.insert(candidate.id.as_str(), combined.len());
                combined.push(candidate.clone());
            }
        }
    }

    ScopeResult::from_unique(combined)
}
