//! HTTP surface: a websocket for live play and a small JSON API.

mod rest;
mod ws;

pub use rest::ApiError;

use crate::service::MatchService;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tracing::info;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    service: MatchService,
    subscriber_buffer: usize,
}

impl AppState {
    /// Creates handler state. `subscriber_buffer` bounds each session's
    /// outbound queue.
    pub fn new(service: MatchService, subscriber_buffer: usize) -> Self {
        Self {
            service,
            subscriber_buffer: subscriber_buffer.max(1),
        }
    }
}

/// Builds the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/matches", post(rest::create_match))
        .route("/api/matches/{id}", get(rest::get_match))
        .route("/api/matches/{id}/record", get(rest::get_record))
        .route("/api/records/{user}", get(rest::history))
        .route("/ws", get(ws::upgrade))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(state)
}
