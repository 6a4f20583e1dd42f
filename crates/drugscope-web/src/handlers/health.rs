//! Backend link health.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use drugscope_db::LinkState;
use serde::Serialize;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub backend: &'static str,
    pub last_probe_at: Option<DateTime<Utc>>,
    pub version: &'static str,
}

/// GET /api/health - Re-probes when the link is not live; 503 while it stays down
pub async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthResponse>) {
    let manager = state.manager();
    // The outcome is recorded in the link state.
    let _ = manager.ensure_live("health").await;

    let link = manager.state();
    let status = if link == LinkState::Live {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            backend: link.as_str(),
            last_probe_at: manager.last_probe_at(),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
