//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Args;
use crate::db::MongoClient;
use crate::engine::GenealogyEngine;
use crate::routes::{self, FullBody};
use crate::types::GenealogyError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub engine: Arc<GenealogyEngine>,
    /// `None` when serving from the in-memory store
    pub mongo: Option<MongoClient>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, engine: Arc<GenealogyEngine>, mongo: Option<MongoClient>) -> Self {
        Self {
            args,
            engine,
            mongo,
            started_at: Instant::now(),
        }
    }
}

/// Bind the configured address and serve until `shutdown` resolves
pub async fn run<F>(state: Arc<AppState>, shutdown: F) -> Result<(), GenealogyError>
where
    F: Future<Output = ()>,
{
    let listener = TcpListener::bind(state.args.listen)
        .await
        .map_err(|e| GenealogyError::Internal(format!("Failed to bind {}: {}", state.args.listen, e)))?;

    info!("Silsilah listening on {}", state.args.listen);

    if state.args.dev_mode {
        warn!("Development mode enabled");
    }

    serve(listener, state, shutdown).await;
    Ok(())
}

/// Accept connections on `listener` until `shutdown` resolves. In-flight
/// connections are left to finish on their own tasks.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);

                        let service = service_fn(move |req| {
                            let state = Arc::clone(&state);
                            async move { handle_request(state, addr, req).await }
                        });

                        if let Err(err) = http1::Builder::new()
                            .serve_connection(io, service)
                            .await
                        {
                            error!("Error serving connection from {}: {:?}", addr, err);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {:?}", e);
                }
            },
            _ = &mut shutdown => {
                info!("Shutdown signal received, no longer accepting connections");
                return;
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<FullBody>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    if method == Method::OPTIONS {
        return Ok(preflight_response());
    }

    if is_under(&path, routes::PEOPLE_PREFIX) {
        return Ok(routes::handle_people_request(req, state, &path).await);
    }
    if is_under(&path, routes::RELATIONSHIPS_PREFIX) {
        return Ok(routes::handle_relationships_request(req, state, &path).await);
    }
    if is_under(&path, routes::EVENTS_PREFIX) {
        return Ok(routes::handle_events_request(req, state, &path).await);
    }
    if is_under(&path, routes::FAMILY_TREE_PREFIX) {
        return Ok(routes::handle_family_tree(&method, state, &path).await);
    }

    let response = match (method, path.as_str()) {
        (Method::GET, "/health") => routes::health_check(state),
        (Method::GET, "/ready") => routes::readiness_check(state).await,
        (Method::GET, "/api/statistics") => routes::statistics(state).await,
        (Method::POST, "/api/maintenance/orphan-sweep") => routes::orphan_sweep(state).await,
        _ => routes::not_found_response(&path),
    };

    Ok(response)
}

/// `path` is `prefix` itself or a subpath of it
fn is_under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// CORS preflight response
fn preflight_response() -> Response<FullBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}
