//! Health check endpoints

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
    pub pages_cached: usize,
    pub in_flight: usize,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.document().stats();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: "pdf-pager",
        pages_cached: stats.pages_cached,
        in_flight: stats.in_flight,
    })
}
