//! Validated parsing of upstream result documents.
//!
//! Both electorates publish a document with a top-level `scopes` object:
//!
//! ```text
//! romania:  { "scopes": { "CNTRY": { "PRSD": { "candidates": [...] } } } }
//! diaspora: { "scopes": { "CNTRY": { "<region>": { "PRSD": { "candidates": [...] } }, ... } } }
//! ```
//!
//! Every step of the traversal is checked. A missing key or a value of the
//! wrong type fails with an [`AggregationError`] naming the dotted path, so a
//! change upstream surfaces as an error rather than an empty result.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::candidate::Candidate;
use crate::error::AggregationError;

pub const SCOPES_KEY: &str = "scopes";
pub const COUNTRY_SCOPE: &str = "CNTRY";
pub const PRESIDENTIAL_SCOPE: &str = "PRSD";
pub const CANDIDATES_KEY: &str = "candidates";

/// Candidates of one regional sub-scope, tagged with the region code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionCandidates {
    pub region: String,
    pub candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct UpstreamCandidate {
    id: UpstreamId,
    #[serde(rename = "candidate")]
    name: String,
    #[serde(default)]
    party: Option<String>,
    votes: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UpstreamId {
    Text(String),
    Number(u64),
}

impl From<UpstreamCandidate> for Candidate {
    fn from(raw: UpstreamCandidate) -> Self {
        let id = match raw.id {
            UpstreamId::Text(id) => id,
            UpstreamId::Number(id) => id.to_string(),
        };
        Candidate {
            id,
            name: raw.name,
            party: raw.party,
            votes: raw.votes,
        }
    }
}

fn join(base: &str, key: &str) -> String {
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", base, key)
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, AggregationError> {
    value.as_object().ok_or_else(|| AggregationError::UnexpectedType {
        path: if path.is_empty() { "$".to_string() } else { path.to_string() },
        expected: "object",
    })
}

/// Follow `keys` from `value`, whose own location is `base`.
fn descend<'a>(
    value: &'a Value,
    base: &str,
    keys: &[&str],
) -> Result<(&'a Value, String), AggregationError> {
    let mut current = value;
    let mut path = base.to_string();
    for key in keys {
        let object = as_object(current, &path)?;
        path = join(&path, key);
        current = object
            .get(*key)
            .ok_or_else(|| AggregationError::MissingPath { path: path.clone() })?;
    }
    Ok((current, path))
}

fn parse_candidates(value: &Value, path: &str) -> Result<Vec<Candidate>, AggregationError> {
    let items = value
        .as_array()
        .ok_or_else(|| AggregationError::UnexpectedType {
            path: path.to_string(),
            expected: "array",
        })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            UpstreamCandidate::deserialize(item)
                .map(Candidate::from)
                .map_err(|e| AggregationError::InvalidCandidate {
                    path: format!("{}[{}]", path, index),
                    reason: e.to_string(),
                })
        })
        .collect()
}

/// Candidates of the national presidential scope, in document order.
pub fn national_candidates(doc: &Value) -> Result<Vec<Candidate>, AggregationError> {
    let (list, path) = descend(
        doc,
        "",
        &[SCOPES_KEY, COUNTRY_SCOPE, PRESIDENTIAL_SCOPE, CANDIDATES_KEY],
    )?;
    parse_candidates(list, &path)
}

/// Candidates of every regional sub-scope, in document key order.
pub fn regional_candidates(doc: &Value) -> Result<Vec<RegionCandidates>, AggregationError> {
    let (regions, regions_path) = descend(doc, "", &[SCOPES_KEY, COUNTRY_SCOPE])?;
    let regions = as_object(regions, &regions_path)?;

    regions
        .iter()
        .map(|(code, region)| {
            let base = join(&regions_path, code);
            let (list, path) = descend(region, &base, &[PRESIDENTIAL_SCOPE, CANDIDATES_KEY])?;
            Ok(RegionCandidates {
                region: code.clone(),
                candidates: parse_candidates(list, &path)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_national_candidates_parsed_in_order() {
        let doc = json!({
            "scopes": { "CNTRY": { "PRSD": { "candidates": [
                { "id": "A", "candidate": "Alpha", "party": "P1", "votes": 100, "extra": true },
                { "id": 42, "candidate": "Beta", "votes": 50 }
            ]}}}
        });

        let candidates = national_candidates(&doc).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].party.as_deref(), Some("P1"));
        assert_eq!(candidates[1].id, "42");
        assert_eq!(candidates[1].party, None);
    }

    #[test]
    fn test_missing_scopes_names_path() {
        let err = national_candidates(&json!({ "data": {} })).unwrap_err();
        assert_eq!(
            err,
            AggregationError::MissingPath {
                path: "scopes".to_string()
            }
        );
    }

    #[test]
    fn test_missing_nested_path() {
        let doc = json!({ "scopes": { "CNTRY": {} } });
        let err = national_candidates(&doc).unwrap_err();
        assert_eq!(err.path(), "scopes.CNTRY.PRSD");
    }

    #[test]
    fn test_non_object_root() {
        let err = national_candidates(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, AggregationError::UnexpectedType { ref path, .. } if path == "$"));
    }

    #[test]
    fn test_candidates_not_array() {
        let doc = json!({ "scopes": { "CNTRY": { "PRSD": { "candidates": {} } } } });
        let err = national_candidates(&doc).unwrap_err();
        assert_eq!(
            err,
            AggregationError::UnexpectedType {
                path: "scopes.CNTRY.PRSD.candidates".to_string(),
                expected: "array",
            }
        );
    }

    #[test]
    fn test_invalid_candidate_names_index() {
        let doc = json!({ "scopes": { "CNTRY": { "PRSD": { "candidates": [
            { "id": "A", "candidate": "Alpha", "votes": 1 },
            { "id": "B", "candidate": "Beta", "votes": -3 }
        ]}}}});
        let err = national_candidates(&doc).unwrap_err();
        assert_eq!(err.path(), "scopes.CNTRY.PRSD.candidates[1]");
    }

    #[test]
    fn test_regional_candidates() {
        let doc = json!({ "scopes": { "CNTRY": {
            "DE": { "PRSD": { "candidates": [ { "id": "A", "candidate": "Alpha", "votes": 5 } ] } },
            "AT": { "PRSD": { "candidates": [] } }
        }}});
        let regions = regional_candidates(&doc).unwrap();
        assert_eq!(regions.len(), 2);
        let de = regions.iter().find(|r| r.region == "DE").unwrap();
        assert_eq!(de.candidates[0].votes, 5);
    }

    #[test]
    fn test_regional_missing_presidential_scope() {
        let doc = json!({ "scopes": { "CNTRY": { "IT": { "LOC": {} } } } });
        let err = regional_candidates(&doc).unwrap_err();
        assert_eq!(err.path(), "scopes.CNTRY.IT.PRSD");
    }
}
