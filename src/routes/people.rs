//! People routes
//!
//! - `GET    /api/people`       list every person
//! - `POST   /api/people`       create a person
//! - `GET    /api/people/{id}`  fetch one person
//! - `PUT    /api/people/{id}`  partial update
//! - `DELETE /api/people/{id}`  cascade delete

use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use super::response::{
    error_response, id_segment, json_response, message_response, method_not_allowed_response,
    not_found_response, read_json, FullBody,
};
use crate::db::schemas::{NewPerson, PersonPatch};
use crate::engine::CascadeDeleteReport;
use crate::server::AppState;
use crate::types::Result;

pub const PEOPLE_PREFIX: &str = "/api/people";

#[derive(Serialize)]
struct DeletePersonResponse {
    message: &'static str,
    #[serde(flatten)]
    report: CascadeDeleteReport,
}

pub async fn handle_people_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    let Some(id) = id_segment(path, PEOPLE_PREFIX) else {
        return not_found_response(path);
    };
    let id = id.to_string();
    let method = req.method().clone();

    let result: Result<Response<FullBody>> = match (method, id.is_empty()) {
        (Method::GET, true) => state
            .engine
            .list_people()
            .await
            .map(|people| json_response(StatusCode::OK, &people)),

        (Method::POST, true) => match read_json::<NewPerson>(req).await {
            Ok(payload) => state
                .engine
                .create_person(payload)
                .await
                .map(|person| json_response(StatusCode::CREATED, &person)),
            Err(e) => Err(e),
        },

        (Method::GET, false) => state
            .engine
            .get_person(&id)
            .await
            .map(|person| json_response(StatusCode::OK, &person)),

        (Method::PUT, false) => match read_json::<PersonPatch>(req).await {
            Ok(patch) => state
                .engine
                .update_person(&id, patch)
                .await
                .map(|()| message_response(StatusCode::OK, "Person updated successfully")),
            Err(e) => Err(e),
        },

        (Method::DELETE, false) => state.engine.delete_person(&id).await.map(|report| {
            let message = if report.is_complete() {
                "Person and related relationships deleted successfully"
            } else {
                "Person deleted; related relationships could not all be removed"
            };
            json_response(StatusCode::OK, &DeletePersonResponse { message, report })
        }),

        _ => return method_not_allowed_response(),
    };

    result.unwrap_or_else(error_response)
}
