// crates/server/src/routes/sessions.rs
//! Session lifecycle endpoints: start, end, active, list.
//!
//! Handlers validate inputs, then delegate to the lifecycle orchestrator in
//! `reeltrack-db`; no session or rollup logic lives here.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use reeltrack_core::{dates, Session};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Payload for starting a new session.
#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    /// Client UTC offset in minutes (-840..=840), used to pin the session's
    /// local calendar date. Defaults to the UTC date when absent.
    pub utc_offset_minutes: Option<i32>,
}

/// Payload for ending a session.
#[derive(Debug, Deserialize)]
pub struct EndSessionRequest {
    pub session_id: i64,
    pub reels_watched: Option<i64>,
    pub mood: Option<String>,
}

/// Query parameters for GET /api/sessions.
#[derive(Debug, Deserialize)]
pub struct ListSessionsQuery {
    /// Restrict to sessions on this calendar date (YYYY-MM-DD).
    pub date_filter: Option<NaiveDate>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../bindings/")]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct SessionListResponse {
    pub sessions: Vec<Session>,
}

/// POST /api/session/start - Start a new session.
///
/// Only one active session is allowed at a time; starting while one is open
/// returns 409 and changes nothing. The body is optional.
pub async fn start_session(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<StartSessionRequest>>,
) -> ApiResult<impl IntoResponse> {
    let offset = payload.and_then(|Json(req)| req.utc_offset_minutes);
    if let Some(minutes) = offset {
        if !dates::utc_offset_in_range(minutes) {
            return Err(ApiError::Validation(format!(
                "utc_offset_minutes out of range: {minutes} (expected {}..={})",
                dates::MIN_UTC_OFFSET_MINUTES,
                dates::MAX_UTC_OFFSET_MINUTES
            )));
        }
    }

    let session = state.lifecycle.start(offset).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/session/end - End an active session.
///
/// Computes the duration, records close-time fields, and updates the daily
/// rollup atomically. 404 for unknown ids, 409 if already ended.
pub async fn end_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EndSessionRequest>,
) -> ApiResult<Json<Session>> {
    if let Some(reels) = payload.reels_watched {
        if reels < 0 {
            return Err(ApiError::Validation(format!(
                "reels_watched must be non-negative, got {reels}"
            )));
        }
    }

    let session = state
        .lifecycle
        .end(payload.session_id, payload.reels_watched, payload.mood)
        .await?;
    Ok(Json(session))
}

/// GET /api/session/active - The currently open session, or null.
///
/// Lets the frontend restore state across reloads.
pub async fn get_active_session(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Option<Session>>> {
    let session = state.lifecycle.active_session().await?;
    Ok(Json(session))
}

/// GET /api/sessions - List sessions, newest start first.
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListSessionsQuery>,
) -> ApiResult<Json<SessionListResponse>> {
    let sessions = state.lifecycle.list_sessions(query.date_filter).await?;
    Ok(Json(SessionListResponse { sessions }))
}

/// Create the session routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session/start", post(start_session))
        .route("/session/end", post(end_session))
        .route("/session/active", get(get_active_session))
        .route("/sessions", get(list_sessions))
}
