//! Property-Based Tests for Vote Aggregation
//!
//! **Property: Merge correctness**
//!
//! For any two valid scope results R and D, `combine(R, D)` SHALL hold
//! exactly the union of their ids, with `votes(id) = R.votes(id) + D.votes(id)`.
//!
//! **Property: Diaspora fold**
//!
//! For any set of regions, the folded diaspora list SHALL count each id once
//! per region (first entry wins within a region) and sum across regions.
//!
//! **Property: Determinism**
//!
//! Equal inputs SHALL produce equal outputs, candidate order included.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use votewatch_core::{combine, extract_diaspora, extract_romania, Candidate, ScopeResult};

// ============================================================================
// STRATEGIES
// ============================================================================

fn arb_candidate() -> impl Strategy<Value = Candidate> {
    ("[A-H]", "[a-z]{3,8}", proptest::option::of("[A-Z]{2,4}"), 0u64..1_000_000).prop_map(
        |(id, name, party, votes)| Candidate {
            id,
            name,
            party,
            votes,
        },
    )
}

fn arb_candidate_list() -> impl Strategy<Value = Vec<Candidate>> {
    prop::collection::vec(arb_candidate(), 0..10)
}

fn arb_scope_result() -> impl Strategy<Value = ScopeResult> {
    arb_candidate_list().prop_map(|list| list.into_iter().collect())
}

fn arb_regions() -> impl Strategy<Value = BTreeMap<String, Vec<Candidate>>> {
    prop::collection::btree_map("[A-Z]{2}", arb_candidate_list(), 0..6)
}

// ============================================================================
// DOCUMENT BUILDERS
// ============================================================================

fn wire(candidates: &[Candidate]) -> Value {
    let list: Vec<Value> = candidates
        .iter()
        .map(|c| json!({ "id": c.id, "candidate": c.name, "party": c.party, "votes": c.votes }))
        .collect();
    json!({ "PRSD": { "candidates": list } })
}

fn romania_doc(candidates: &[Candidate]) -> Value {
    json!({ "scopes": { "CNTRY": wire(candidates) } })
}

fn diaspora_doc(regions: &BTreeMap<String, Vec<Candidate>>) -> Value {
    let mut country = Map::new();
    for (code, candidates) in regions {
        country.insert(code.clone(), wire(candidates));
    }
    json!({ "scopes": { "CNTRY": Value::Object(country) } })
}

/// Expected fold computed independently: first entry per id within a
/// region, summed across regions.
fn expected_fold(regions: &BTreeMap<String, Vec<Candidate>>) -> HashMap<String, u64> {
    let mut totals = HashMap::new();
    for candidates in regions.values() {
        let mut seen = BTreeSet::new();
        for candidate in candidates {
            if seen.insert(candidate.id.clone()) {
                *totals.entry(candidate.id.clone()).or_insert(0) += candidate.votes;
            }
        }
    }
    totals
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_combine_sums_votes_per_id(r in arb_scope_result(), d in arb_scope_result()) {
        let combined = combine(&r, &d);
        for id in r.ids().chain(d.ids()) {
            prop_assert_eq!(combined.votes(id), r.votes(id) + d.votes(id));
        }
    }

    #[test]
    fn prop_combine_ids_are_union(r in arb_scope_result(), d in arb_scope_result()) {
        let combined = combine(&r, &d);
        let expected: BTreeSet<&str> = r.ids().chain(d.ids()).collect();
        let actual: BTreeSet<&str> = combined.ids().collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(combined.len(), combined.ids().collect::<BTreeSet<_>>().len());
    }

    #[test]
    fn prop_combine_does_not_touch_inputs(r in arb_scope_result(), d in arb_scope_result()) {
        let (r_before, d_before) = (r.clone(), d.clone());
        let _ = combine(&r, &d);
        prop_assert_eq!(r, r_before);
        prop_assert_eq!(d, d_before);
    }

    #[test]
    fn prop_combine_romania_order_first(r in arb_scope_result(), d in arb_scope_result()) {
        let combined = combine(&r, &d);
        let prefix: Vec<&str> = combined.ids().take(r.len()).collect();
        prop_assert_eq!(prefix, r.ids().collect::<Vec<_>>());
    }

    #[test]
    fn prop_diaspora_fold_matches_model(regions in arb_regions()) {
        let folded = extract_diaspora(&diaspora_doc(&regions)).unwrap();
        let expected = expected_fold(&regions);

        prop_assert_eq!(folded.len(), expected.len());
        for (id, votes) in &expected {
            prop_assert_eq!(folded.votes(id), *votes);
        }
    }

    #[test]
    fn prop_diaspora_duplicate_region_entry_not_double_counted(
        candidate in arb_candidate(),
        extra in 0u64..1_000,
    ) {
        let mut again = candidate.clone();
        again.votes = extra;
        let mut regions = BTreeMap::new();
        regions.insert("US".to_string(), vec![candidate.clone(), again]);

        let folded = extract_diaspora(&diaspora_doc(&regions)).unwrap();
        prop_assert_eq!(folded.votes(&candidate.id), candidate.votes);
    }

    #[test]
    fn prop_romania_extract_keeps_first_of_each_id(list in arb_candidate_list()) {
        let extracted = extract_romania(&romania_doc(&list)).unwrap();
        let expected: ScopeResult = list.into_iter().collect();
        prop_assert_eq!(extracted, expected);
    }

    #[test]
    fn prop_aggregation_is_deterministic(
        national in arb_candidate_list(),
        regions in arb_regions(),
    ) {
        let romania_doc = romania_doc(&national);
        let diaspora_doc = diaspora_doc(&regions);

        let r1 = extract_romania(&romania_doc).unwrap();
        let r2 = extract_romania(&romania_doc).unwrap();
        let d1 = extract_diaspora(&diaspora_doc).unwrap();
        let d2 = extract_diaspora(&diaspora_doc).unwrap();

        prop_assert_eq!(&r1, &r2);
        prop_assert_eq!(&d1, &d2);
        prop_assert_eq!(combine(&r1, &d1), combine(&r2, &d2));
    }
}
