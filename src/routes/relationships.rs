//! Relationship routes
//!
//! Creation checks that both endpoints exist. Endpoints cannot be changed
//! through `PUT`.

use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;

use super::response::{
    error_response, id_segment, json_response, message_response, method_not_allowed_response,
    not_found_response, read_json, FullBody,
};
use crate::db::schemas::{NewRelationship, RelationshipPatch};
use crate::server::AppState;
use crate::types::Result;

pub const RELATIONSHIPS_PREFIX: &str = "/api/relationships";

pub async fn handle_relationships_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    let Some(id) = id_segment(path, RELATIONSHIPS_PREFIX) else {
        return not_found_response(path);
    };
    let id = id.to_string();
    let method = req.method().clone();

    let result: Result<Response<FullBody>> = match (method, id.is_empty()) {
        (Method::GET, true) => state
            .engine
            .list_relationships()
            .await
            .map(|relationships| json_response(StatusCode::OK, &relationships)),

        (Method::POST, true) => match read_json::<NewRelationship>(req).await {
            Ok(payload) => state
                .engine
                .create_relationship(payload)
                .await
                .map(|relationship| json_response(StatusCode::CREATED, &relationship)),
            Err(e) => Err(e),
        },

        (Method::GET, false) => state
            .engine
            .get_relationship(&id)
            .await
            .map(|relationship| json_response(StatusCode::OK, &relationship)),

        (Method::PUT, false) => match read_json::<RelationshipPatch>(req).await {
            Ok(patch) => state
                .engine
                .update_relationship(&id, patch)
                .await
                .map(|()| message_response(StatusCode::OK, "Relationship updated successfully")),
            Err(e) => Err(e),
        },

        (Method::DELETE, false) => state
            .engine
            .delete_relationship(&id)
            .await
            .map(|()| message_response(StatusCode::OK, "Relationship deleted successfully")),

        _ => return method_not_allowed_response(),
    };

    result.unwrap_or_else(error_response)
}
