//! Exercise the PostgreSQL backend against a real ChEMBL dump.
//!
//! Reads DB_* from the environment (or `.env`).
//! Run with: cargo test --package drugscope-db --test test_live_store -- --ignored --nocapture

use std::sync::Arc;

use drugscope_common::DrugIdentity;
use drugscope_config::Config;
use drugscope_db::{CandidateFilter, CandidateQuery, ConnectionManager, LinkState, PgBackend};

async fn connect() -> ConnectionManager {
    let config = Config::load().expect("DB_* must be set for live tests");
    println!("Connecting to: {}", config.database.redacted_url());

    let backend =
        PgBackend::connect(&config.database, &config.pool, &config.query).expect("pool config");
    ConnectionManager::new(Arc::new(backend), &config.query)
}

#[tokio::test]
#[ignore]
async fn test_db_connection() {
    let manager = connect().await;

    assert!(manager.probe().await, "backend did not answer the liveness probe");
    assert_eq!(manager.state(), LinkState::Live);
    manager.check_schema().await.expect("schema contract");
}

#[tokio::test]
#[ignore]
async fn test_aspirin_round_trip() {
    let manager = connect().await;

    let query = CandidateQuery {
        filter: CandidateFilter::Containing("aspirin".into()),
        limit: 10,
        therapeutic_only: true,
    };
    let candidates = manager.run("search", manager.backend().candidates(&query)).await.unwrap();
    println!("Candidates: {candidates:?}");
    assert!(candidates.iter().any(|c| c.name == "ASPIRIN"));

    let aspirin = DrugIdentity::parse("aspirin").unwrap();
    let detail = manager
        .run("details", manager.backend().drug_detail(&aspirin))
        .await
        .unwrap()
        .expect("aspirin exists");
    assert_eq!(detail.pref_name, "ASPIRIN");

    let interactions = manager
        .run("interactions", manager.backend().drug_interactions(&aspirin, 50))
        .await
        .unwrap()
        .expect("aspirin exists");
    println!("Interaction rows: {}", interactions.rows.len());
    assert!(interactions.rows.len() <= 50);
}

#[tokio::test]
#[ignore]
async fn test_unknown_drug_is_absent() {
    let manager = connect().await;
    let unknown = DrugIdentity::parse("UnknownDrug123").unwrap();

    let detail = manager
        .run("details", manager.backend().drug_detail(&unknown))
        .await
        .unwrap();
    assert!(detail.is_none());
}
