//! JSON request/response helpers shared by the API routes

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use crate::types::{GenealogyError, Result};

pub type FullBody = Full<Bytes>;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

#[derive(Serialize)]
pub struct MessageResponse<'a> {
    pub message: &'a str,
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<FullBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

pub fn message_response(status: StatusCode, message: &str) -> Response<FullBody> {
    json_response(status, &MessageResponse { message })
}

/// Render an engine error with its status code
pub fn error_response(err: GenealogyError) -> Response<FullBody> {
    let status = err.status_code();
    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        debug!("Request rejected: {}", err);
    }

    json_response(
        status,
        &ErrorResponse {
            error: err.to_string(),
            code: err.code(),
        },
    )
}

pub fn not_found_response(path: &str) -> Response<FullBody> {
    error_response(GenealogyError::NotFound(format!("No route for {}", path)))
}

pub fn method_not_allowed_response() -> Response<FullBody> {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &ErrorResponse {
            error: "Method not allowed".to_string(),
            code: "method_not_allowed",
        },
    )
}

/// Read and decode a JSON request body
pub async fn read_json<T: DeserializeOwned>(req: Request<Incoming>) -> Result<T> {
    let body = Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| GenealogyError::Validation(format!("Unreadable request body: {}", e)))?
        .to_bytes();

    if body.is_empty() {
        return Err(GenealogyError::Validation("Request body is empty".to_string()));
    }

    Ok(serde_json::from_slice(&body)?)
}

/// Split `/api/people/{id}` into the identity segment, if any.
/// `None` means the path has more segments than the route understands.
pub fn id_segment<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?.trim_matches('/');
    if rest.contains('/') {
        None
    } else {
        Some(rest)
    }
}
