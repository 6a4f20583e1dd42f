//! End-to-end behaviour of the resolver and aggregators against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use drugscope_common::{ErrorKind, QueryError};
use drugscope_config::QueryConfig;
use drugscope_db::{ConnectionManager, LinkState};
use drugscope_query::DrugExplorer;
use drugscope_test_utils::assertions::{assert_candidate_names, assert_interaction_pairs};
use drugscope_test_utils::fixtures::{COX_INHIBITOR, PLATELET_INHIBITOR};
use drugscope_test_utils::{chembl_sample, mechanism, molecule, Fault, InMemoryBackend, Operation};
use pretty_assertions::assert_eq;
use tokio_test::{assert_err, assert_ok};

fn explorer_with(backend: Arc<InMemoryBackend>, config: QueryConfig) -> DrugExplorer {
    let manager = ConnectionManager::with_timeouts(
        backend,
        Duration::from_millis(250),
        Duration::from_millis(250),
    );
    DrugExplorer::new(Arc::new(manager), &config)
}

fn explorer(backend: Arc<InMemoryBackend>) -> DrugExplorer {
    explorer_with(backend, QueryConfig::default())
}

// ── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_search_aspirin_orders_by_phase_then_name() {
    let explorer = explorer(Arc::new(chembl_sample()));
    let results = assert_ok!(explorer.search("aspirin").await);
    assert_candidate_names(&results, &["ASPIRIN", "Aspirin-like compound X"]);
}

#[tokio::test]
async fn test_search_results_contain_term() {
    let explorer = explorer(Arc::new(chembl_sample()));
    for term in ["a", "IN", "profen", " x ", "Cox"] {
        let needle = term.trim().to_lowercase();
        let results = assert_ok!(explorer.search(term).await);
        assert!(
            results.iter().all(|c| c.name.to_lowercase().contains(&needle)),
            "term {term:?} returned {results:?}"
        );
    }
}

#[tokio::test]
async fn test_search_never_exceeds_limit() {
    let config = QueryConfig { search_limit: 3, ..QueryConfig::default() };
    let explorer = explorer_with(Arc::new(chembl_sample()), config);

    for term in ["", "a", "i", "n"] {
        let results = assert_ok!(explorer.search(term).await);
        assert!(results.len() <= 3, "term {term:?} returned {}", results.len());
    }
}

#[tokio::test]
async fn test_empty_term_is_deterministic_popular_set() {
    let explorer = explorer(Arc::new(chembl_sample()));
    let first = assert_ok!(explorer.search("").await);
    let second = assert_ok!(explorer.search("   ").await);

    assert_eq!(first, second);
    assert_candidate_names(
        &first,
        &["ASPIRIN", "CELECOXIB", "CLOPIDOGREL", "IBUPROFEN", "METFORMIN", "NAPROXEN"],
    );
}

#[tokio::test]
async fn test_search_no_match_is_empty_not_error() {
    let explorer = explorer(Arc::new(chembl_sample()));
    let results = assert_ok!(explorer.search("asprin").await);
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_search_after_failed_startup_probe_is_unavailable() {
    let backend = Arc::new(chembl_sample());
    backend.fail(Operation::Ping, Fault::Unavailable);
    let explorer = explorer(backend.clone());

    assert!(!explorer.manager().probe().await);
    assert_eq!(explorer.manager().state(), LinkState::Degraded);

    let err = assert_err!(explorer.search("x").await);
    assert_eq!(err.kind(), ErrorKind::BackendUnavailable);
    assert_eq!(backend.calls(Operation::Candidates), 0);
}

#[tokio::test]
async fn test_search_recovers_once_backend_returns() {
    let backend = Arc::new(chembl_sample());
    backend.fail(Operation::Ping, Fault::Unavailable);
    let explorer = explorer(backend.clone());
    assert_err!(explorer.search("aspirin").await);

    backend.heal_all();
    let results = assert_ok!(explorer.search("aspirin").await);
    assert_eq!(results.len(), 2);
    assert_eq!(explorer.manager().state(), LinkState::Live);
}

// ── Details and properties ──────────────────────────────────────────────────

#[tokio::test]
async fn test_unknown_identity_is_not_found_everywhere() {
    let explorer = explorer(Arc::new(chembl_sample()));

    let expected = QueryError::not_found("unknowndrug123");
    assert_eq!(explorer.get_details("UnknownDrug123").await.unwrap_err(), expected);
    assert_eq!(explorer.get_properties("UnknownDrug123").await.unwrap_err(), expected);
    assert_eq!(explorer.get_interactions("UnknownDrug123").await.unwrap_err(), expected);
}

#[tokio::test]
async fn test_identity_lookup_ignores_case_and_spacing() {
    let explorer = explorer(Arc::new(chembl_sample()));
    let a = assert_ok!(explorer.get_details("ASPIRIN").await);
    let b = assert_ok!(explorer.get_details("  aspirin ").await);
    assert_eq!(a, b);

    let like = assert_ok!(explorer.get_details("aspirin-like   COMPOUND x").await);
    assert_eq!(like.name, "Aspirin-like compound X");
}

#[tokio::test]
async fn test_blank_identity_is_malformed_without_backend_calls() {
    let backend = Arc::new(chembl_sample());
    let explorer = explorer(backend.clone());

    let err = assert_err!(explorer.get_details("   ").await);
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
    assert_err!(explorer.get_properties("").await);
    assert_err!(explorer.get_interactions("\t").await);
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn test_null_columns_report_unknown() {
    let explorer = explorer(Arc::new(chembl_sample()));

    let detail = assert_ok!(explorer.get_details("Aspirin-like compound X").await);
    assert_eq!(detail.black_box_warning, None);
    assert_eq!(detail.administration_routes, None);

    // Exists, but has no computed-properties row.
    let props = assert_ok!(explorer.get_properties("Aspirin-like compound X").await);
    assert_eq!(props.molecular_weight, None);
    assert_eq!(props.h_bond_donors, None);
}

#[tokio::test]
async fn test_known_values_decode() {
    let explorer = explorer(Arc::new(chembl_sample()));

    let detail = assert_ok!(explorer.get_details("clopidogrel").await);
    assert_eq!(detail.black_box_warning, Some(true));
    assert_eq!(detail.first_approval, Some(1997));

    let props = assert_ok!(explorer.get_properties("clopidogrel").await);
    assert_eq!(props.h_bond_donors, Some(0));
    assert_eq!(props.drug_likeness.lipinski.passes, Some(true));
}

#[tokio::test]
async fn test_details_and_properties_are_independent() {
    let backend = Arc::new(chembl_sample());
    let explorer = explorer(backend.clone());

    let baseline_details = assert_ok!(explorer.get_details("aspirin").await);
    let baseline_props = assert_ok!(explorer.get_properties("aspirin").await);

    // Reverse order.
    assert_eq!(assert_ok!(explorer.get_properties("aspirin").await), baseline_props);
    assert_eq!(assert_ok!(explorer.get_details("aspirin").await), baseline_details);

    // One failing does not affect the other.
    backend.fail(Operation::Detail, Fault::SchemaMismatch("molecule_dictionary.chirality".into()));
    let err = assert_err!(explorer.get_details("aspirin").await);
    assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    assert_eq!(assert_ok!(explorer.get_properties("aspirin").await), baseline_props);

    backend.heal(Operation::Detail);
    backend.fail(Operation::Properties, Fault::Unavailable);
    assert_err!(explorer.get_properties("aspirin").await);
    assert_eq!(assert_ok!(explorer.get_details("aspirin").await), baseline_details);
}

#[tokio::test]
async fn test_hung_backend_times_out_as_unavailable() {
    let backend = Arc::new(chembl_sample());
    backend.fail(Operation::Detail, Fault::Hang);
    let explorer = explorer(backend);

    let err = assert_err!(explorer.get_details("aspirin").await);
    assert_eq!(err, QueryError::unavailable("details"));
}

// ── Interactions and graph ──────────────────────────────────────────────────

#[tokio::test]
async fn test_interactions_are_deduped_and_grouped() {
    let explorer = explorer(Arc::new(chembl_sample()));
    let records = assert_ok!(explorer.get_interactions("Aspirin").await);

    assert_interaction_pairs(
        &records,
        &[
            ("CLOPIDOGREL", PLATELET_INHIBITOR),
            ("COX PROBE 17", COX_INHIBITOR),
            ("IBUPROFEN", COX_INHIBITOR),
            ("NAPROXEN", COX_INHIBITOR),
        ],
    );
    assert!(records.iter().all(|r| r.source_drug == "ASPIRIN"));
}

#[tokio::test]
async fn test_existing_drug_without_partners_is_empty() {
    let explorer = explorer(Arc::new(chembl_sample()));
    let records = assert_ok!(explorer.get_interactions("metformin").await);
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_negative_phase_ranks_as_unknown_at_the_limit() {
    let backend = InMemoryBackend::new()
        .with_molecule(molecule(1, "XB", Some(-1.0)))
        .with_molecule(molecule(2, "XA", None));
    let config = QueryConfig { search_limit: 1, ..QueryConfig::default() };
    let explorer = explorer_with(Arc::new(backend), config);

    let results = assert_ok!(explorer.search("x").await);
    assert_candidate_names(&results, &["XA"]);
    assert_eq!(results[0].phase, None);
}

#[tokio::test]
async fn test_same_name_molecule_is_not_an_interaction_partner() {
    let backend = InMemoryBackend::new()
        .with_molecule(molecule(1, "ASPIRIN", Some(4.0)))
        .with_molecule(molecule(9, "Aspirin", Some(1.0)))
        .with_molecule(molecule(3, "IBUPROFEN", Some(4.0)))
        .with_mechanism(mechanism(1, COX_INHIBITOR, Some("INHIBITOR"), None))
        .with_mechanism(mechanism(9, COX_INHIBITOR, Some("INHIBITOR"), None))
        .with_mechanism(mechanism(3, COX_INHIBITOR, Some("INHIBITOR"), None));
    let explorer = explorer(Arc::new(backend));

    let records = assert_ok!(explorer.get_interactions("aspirin").await);
    assert_interaction_pairs(&records, &[("IBUPROFEN", COX_INHIBITOR)]);

    let graph = assert_ok!(explorer.network("aspirin").await);
    assert_eq!(graph.nodes.len(), 2);
    assert!(graph.edges.iter().all(|e| e.source != e.target));
}

#[tokio::test]
async fn test_interaction_row_cap_applies_before_dedup() {
    let config = QueryConfig { interaction_limit: 3, ..QueryConfig::default() };
    let explorer = explorer_with(Arc::new(chembl_sample()), config);

    // Raw rows: CLOPIDOGREL, COX PROBE 17, IBUPROFEN (x2), NAPROXEN (x2).
    let records = assert_ok!(explorer.get_interactions("aspirin").await);
    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn test_network_is_rooted_and_idempotent() {
    let explorer = explorer(Arc::new(chembl_sample()));
    let first = assert_ok!(explorer.network("aspirin").await);
    let second = assert_ok!(explorer.network("ASPIRIN").await);

    assert!(first.same_shape(&second));
    assert_eq!(first.root.as_deref(), Some("aspirin"));
    assert_eq!(first.nodes.len(), 5);
    assert_eq!(first.edges.len(), 4);
    assert_eq!(first.groups, vec![PLATELET_INHIBITOR.to_string(), COX_INHIBITOR.to_string()]);
}

#[tokio::test]
async fn test_network_of_isolated_drug_is_root_only() {
    let explorer = explorer(Arc::new(chembl_sample()));
    let graph = assert_ok!(explorer.network("Metformin").await);
    assert_eq!(graph.nodes.len(), 1);
    assert!(graph.edges.is_empty());
}

#[tokio::test]
async fn test_isolated_root_is_labelled_with_normalized_name() {
    let explorer = explorer(Arc::new(chembl_sample()));
    let graph = assert_ok!(explorer.network("  Metformin \t").await);

    let root = graph.node("metformin").expect("root node");
    assert_eq!(root.label, "metformin");
}

// ── Profile ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_profile_sections_fail_independently() {
    for parallel_profile in [true, false] {
        let backend = Arc::new(chembl_sample());
        backend.fail(Operation::Interactions, Fault::Unavailable);
        let config = QueryConfig { parallel_profile, ..QueryConfig::default() };
        let explorer = explorer_with(backend, config);

        let profile = assert_ok!(explorer.profile("aspirin").await);
        assert_eq!(profile.identity.as_str(), "aspirin");
        assert!(profile.details.is_ok());
        assert!(profile.properties.is_ok());
        assert_eq!(
            profile.interactions.unwrap_err().kind(),
            ErrorKind::BackendUnavailable
        );
        assert!(profile.graph.is_none());
    }
}

#[tokio::test]
async fn test_profile_of_unknown_drug() {
    let explorer = explorer(Arc::new(chembl_sample()));
    let profile = assert_ok!(explorer.profile("UnknownDrug123").await);

    assert!(profile.details.unwrap_err().is_not_found());
    assert!(profile.properties.unwrap_err().is_not_found());
    assert!(profile.interactions.unwrap_err().is_not_found());
    assert!(profile.graph.is_none());
}

#[tokio::test]
async fn test_profile_builds_graph() {
    let explorer = explorer(Arc::new(chembl_sample()));
    let profile = assert_ok!(explorer.profile("ibuprofen").await);

    let graph = profile.graph.expect("graph for successful interactions");
    assert_eq!(graph.root.as_deref(), Some("ibuprofen"));
    assert!(graph.node("aspirin").is_some());
}

#[tokio::test]
async fn test_profile_rejects_blank_identity() {
    let explorer = explorer(Arc::new(chembl_sample()));
    let err = assert_err!(explorer.profile("  ").await);
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
}
