//! Assertion helpers with readable diffs.

use drugscope_common::{DrugCandidate, InteractionRecord};
use pretty_assertions::assert_eq;

/// Assert candidate names, in order.
pub fn assert_candidate_names(actual: &[DrugCandidate], expected: &[&str]) {
    let names: Vec<&str> = actual.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, expected);
}

/// Assert `(partner, mechanism)` pairs, in order.
pub fn assert_interaction_pairs(actual: &[InteractionRecord], expected: &[(&str, &str)]) {
    let pairs: Vec<(&str, &str)> = actual
        .iter()
        .map(|r| (r.target.as_str(), r.mechanism_of_action.as_str()))
        .collect();
    assert_eq!(pairs, expected);
}
