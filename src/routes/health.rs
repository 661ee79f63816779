//! Health check endpoints

use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use super::response::{json_response, FullBody};
use crate::engine::CollectionCounts;
use crate::server::AppState;

/// Liveness response
#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    /// "mongodb" or "memory"
    pub storage: &'static str,
}

/// Readiness response
#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<CollectionCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn storage_kind(state: &AppState) -> &'static str {
    if state.mongo.is_some() {
        "mongodb"
    } else {
        "memory"
    }
}

/// Handle liveness probe (/health). Always 200 while the process serves.
pub fn health_check(state: Arc<AppState>) -> Response<FullBody> {
    json_response(
        StatusCode::OK,
        &HealthResponse {
            healthy: true,
            status: "online",
            version: env!("CARGO_PKG_VERSION"),
            uptime_secs: state.started_at.elapsed().as_secs(),
            storage: storage_kind(&state),
        },
    )
}

/// Handle readiness probe (/ready)
///
/// Returns 200 only when every collection answers a count.
pub async fn readiness_check(state: Arc<AppState>) -> Response<FullBody> {
    match state.engine.collection_counts().await {
        Ok(counts) => json_response(
            StatusCode::OK,
            &ReadyResponse {
                ready: true,
                counts: Some(counts),
                error: None,
            },
        ),
        Err(e) => json_response(
            StatusCode::SERVICE_UNAVAILABLE,
            &ReadyResponse {
                ready: false,
                counts: None,
                error: Some(e.to_string()),
            },
        ),
    }
}
