//! JSON endpoints for creating and inspecting matches.

use super::AppState;
use crate::error::GameError;
use crate::matches::{MatchId, MatchView};
use crate::service::CreateMatch;
use crate::store::MatchRecord;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{instrument, warn};

/// Default number of records returned by the history endpoint.
const DEFAULT_HISTORY_LIMIT: usize = 20;

/// A [`GameError`] rendered as an HTTP response.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
#[display("{}", _0)]
pub struct ApiError(GameError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            GameError::GameNotFound { .. } => StatusCode::NOT_FOUND,
            GameError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        if status.is_server_error() {
            warn!(error = %self.0, "Request failed");
        }
        let body = json!({ "code": self.0.code(), "message": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

/// `POST /api/matches`
#[instrument(skip(state))]
pub(super) async fn create_match(
    State(state): State<AppState>,
    Json(request): Json<CreateMatch>,
) -> (StatusCode, Json<MatchView>) {
    let game = state.service.create_match(request);
    let view = MatchView::for_identity(&game, &game.player1.identity, Utc::now());
    (StatusCode::CREATED, Json(view))
}

/// `GET /api/matches/{id}`, rendered for an unseated observer.
#[instrument(skip(state))]
pub(super) async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MatchView>, ApiError> {
    let game = state.service.get_match(&MatchId::new(id)).await?;
    Ok(Json(MatchView::for_viewer(&game, None, Utc::now())))
}

/// `GET /api/matches/{id}/record`
#[instrument(skip(state))]
pub(super) async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MatchRecord>, ApiError> {
    let id = MatchId::new(id);
    let record = state.service.record(&id).await?;
    record.map(Json).ok_or_else(|| {
        ApiError(GameError::GameNotFound {
            match_id: id.to_string(),
        })
    })
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryQuery {
    limit: Option<usize>,
}

/// `GET /api/records/{user}?limit=N`
#[instrument(skip(state))]
pub(super) async fn history(
    State(state): State<AppState>,
    Path(user): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<MatchRecord>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Ok(Json(state.service.history(&user, limit).await?))
}
