//! Event routes

use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;

use super::response::{
    error_response, id_segment, json_response, message_response, method_not_allowed_response,
    not_found_response, read_json, FullBody,
};
use crate::db::schemas::{EventPatch, NewEvent};
use crate::server::AppState;
use crate::types::Result;

pub const EVENTS_PREFIX: &str = "/api/events";

pub async fn handle_events_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    let Some(id) = id_segment(path, EVENTS_PREFIX) else {
        return not_found_response(path);
    };
    let id = id.to_string();
    let method = req.method().clone();

    let result: Result<Response<FullBody>> = match (method, id.is_empty()) {
        (Method::GET, true) => state
            .engine
            .list_events()
            .await
            .map(|events| json_response(StatusCode::OK, &events)),

        (Method::POST, true) => match read_json::<NewEvent>(req).await {
            Ok(payload) => state
                .engine
                .create_event(payload)
                .await
                .map(|event| json_response(StatusCode::CREATED, &event)),
            Err(e) => Err(e),
        },

        (Method::GET, false) => state
            .engine
            .get_event(&id)
            .await
            .map(|event| json_response(StatusCode::OK, &event)),

        (Method::PUT, false) => match read_json::<EventPatch>(req).await {
            Ok(patch) => state
                .engine
                .update_event(&id, patch)
                .await
                .map(|()| message_response(StatusCode::OK, "Event updated successfully")),
            Err(e) => Err(e),
        },

        (Method::DELETE, false) => state
            .engine
            .delete_event(&id)
            .await
            .map(|()| message_response(StatusCode::OK, "Event deleted successfully")),

        _ => return method_not_allowed_response(),
    };

    result.unwrap_or_else(error_response)
}
