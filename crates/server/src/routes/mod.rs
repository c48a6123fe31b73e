//! API route handlers for the reeltrack server.

pub mod health;
pub mod sessions;
pub mod summaries;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined API router with all routes under the /api prefix.
///
/// Routes:
/// - GET  /api/health - Health check
/// - POST /api/session/start - Start a session (409 if one is active)
/// - POST /api/session/end - End a session and bump its day's rollup
/// - GET  /api/session/active - The open session, or null
/// - GET  /api/sessions - List sessions, optional ?date_filter=YYYY-MM-DD
/// - GET  /api/summary/daily - Rollups for a date range (default: last 30 days)
/// - GET  /api/summary/weekly - Last 8 weeks bucketed by (year, week)
/// - GET  /api/summary/monthly - Last 6 months bucketed by (year, month)
/// - GET  /api/summary/streaks - Current and longest daily streaks
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", health::router())
        .nest("/api", sessions::router())
        .nest("/api", summaries::router())
        .with_state(state)
}
