//! Axum router: maps URL paths to handlers.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    drugs::{drug_details, drug_interactions, drug_network, drug_profile, drug_properties, search_drugs},
    health::health,
};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/api/health",                    get(health))
        .route("/api/drugs/search",              get(search_drugs))
        .route("/api/drugs/{name}",              get(drug_profile))
        .route("/api/drugs/{name}/details",      get(drug_details))
        .route("/api/drugs/{name}/properties",   get(drug_properties))
        .route("/api/drugs/{name}/interactions", get(drug_interactions))
        .route("/api/drugs/{name}/network",      get(drug_network))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
