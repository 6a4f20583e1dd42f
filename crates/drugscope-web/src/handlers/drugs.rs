//! Drug search, per-drug sections and the interaction network.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use drugscope_common::{
    DrugCandidate, DrugDetail, DrugProperties, InteractionRecord, QueryResult,
};
use drugscope_kg::InteractionGraph;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// One section of a profile: `status` is `ok` or an error kind.
#[derive(Debug, Serialize)]
pub struct Section<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> From<QueryResult<T>> for Section<T> {
    fn from(result: QueryResult<T>) -> Self {
        match result {
            Ok(data) => Section { status: "ok", data: Some(data) },
            Err(e)   => Section { status: e.kind().as_str(), data: None },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub identity: String,
    pub details: Section<DrugDetail>,
    pub properties: Section<DrugProperties>,
    pub interactions: Section<Vec<InteractionRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<InteractionGraph>,
}

/// GET /api/drugs/search?q= - Ranked candidates; empty `q` gives the popular set
pub async fn search_drugs(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<DrugCandidate>>, ApiError> {
    Ok(Json(state.explorer.search(&params.q).await?))
}

/// GET /api/drugs/{name} - All sections, each with its own status
pub async fn drug_profile(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.explorer.profile(&name).await?;

    Ok(Json(ProfileResponse {
        identity: profile.identity.to_string(),
        details: profile.details.into(),
        properties: profile.properties.into(),
        interactions: profile.interactions.into(),
        network: profile.graph,
    }))
}

/// GET /api/drugs/{name}/details
pub async fn drug_details(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<DrugDetail>, ApiError> {
    Ok(Json(state.explorer.get_details(&name).await?))
}

/// GET /api/drugs/{name}/properties
pub async fn drug_properties(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<DrugProperties>, ApiError> {
    Ok(Json(state.explorer.get_properties(&name).await?))
}

/// GET /api/drugs/{name}/interactions
pub async fn drug_interactions(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<InteractionRecord>>, ApiError> {
    Ok(Json(state.explorer.get_interactions(&name).await?))
}

/// GET /api/drugs/{name}/network
pub async fn drug_network(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<InteractionGraph>, ApiError> {
    Ok(Json(state.explorer.network(&name).await?))
}
