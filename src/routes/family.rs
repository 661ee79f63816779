//! Family tree, statistics and maintenance routes

use hyper::{Method, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use super::response::{
    error_response, id_segment, json_response, method_not_allowed_response, not_found_response,
    FullBody,
};
use crate::server::AppState;

pub const FAMILY_TREE_PREFIX: &str = "/api/family-tree";

/// `GET /api/family-tree/{id}`
pub async fn handle_family_tree(
    method: &Method,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    let id = match id_segment(path, FAMILY_TREE_PREFIX) {
        Some(id) if !id.is_empty() => id,
        _ => return not_found_response(path),
    };
    if method != Method::GET {
        return method_not_allowed_response();
    }

    match state.engine.family_neighborhood(id).await {
        Ok(tree) => json_response(StatusCode::OK, &tree),
        Err(e) => error_response(e),
    }
}

/// `GET /api/statistics`
pub async fn statistics(state: Arc<AppState>) -> Response<FullBody> {
    match state.engine.statistics().await {
        Ok(stats) => json_response(StatusCode::OK, &stats),
        Err(e) => error_response(e),
    }
}

#[derive(Serialize)]
struct SweepResponse {
    relationships_removed: u64,
}

/// `POST /api/maintenance/orphan-sweep`
pub async fn orphan_sweep(state: Arc<AppState>) -> Response<FullBody> {
    match state.engine.sweep_orphan_relationships().await {
        Ok(relationships_removed) => json_response(
            StatusCode::OK,
            &SweepResponse {
                relationships_removed,
            },
        ),
        Err(e) => error_response(e),
    }
}
