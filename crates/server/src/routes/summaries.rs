// crates/server/src/routes/summaries.rs
//! Aggregate endpoints over the daily rollup table: daily ranges, weekly and
//! monthly buckets, streaks. Every window is anchored on the server's "today".

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use reeltrack_core::{dates, DailySummary, MonthlySummary, Streaks, WeeklySummary};

use crate::error::ApiResult;
use crate::state::AppState;

/// Query parameters for GET /api/summary/daily.
///
/// When either bound is missing the range falls back to the last 30 days
/// ending today.
#[derive(Debug, Deserialize)]
pub struct DailySummaryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../bindings/")]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct DailySummaryResponse {
    pub items: Vec<DailySummary>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../bindings/")]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct WeeklySummaryResponse {
    pub items: Vec<WeeklySummary>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../../bindings/")]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct MonthlySummaryResponse {
    pub items: Vec<MonthlySummary>,
}

/// GET /api/summary/daily - Rollups for a date range, ascending.
pub async fn daily_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DailySummaryQuery>,
) -> ApiResult<Json<DailySummaryResponse>> {
    let (start, end) = match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => (start, end),
        _ => dates::default_daily_range(state.clock.today()),
    };
    let items = state.db.daily_summaries(start, end).await?;
    Ok(Json(DailySummaryResponse { items }))
}

/// GET /api/summary/weekly - The last eight calendar weeks.
pub async fn weekly_summary(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<WeeklySummaryResponse>> {
    let items = state.db.weekly_summaries(state.clock.today()).await?;
    Ok(Json(WeeklySummaryResponse { items }))
}

/// GET /api/summary/monthly - The last six months.
pub async fn monthly_summary(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<MonthlySummaryResponse>> {
    let items = state.db.monthly_summaries(state.clock.today()).await?;
    Ok(Json(MonthlySummaryResponse { items }))
}

/// GET /api/summary/streaks - Current and longest daily streaks.
pub async fn streak_summary(State(state): State<Arc<AppState>>) -> ApiResult<Json<Streaks>> {
    let streaks = state.db.streaks(state.clock.today()).await?;
    Ok(Json(streaks))
}

/// Create the summary routes router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/summary/daily", get(daily_summary))
        .route("/summary/weekly", get(weekly_summary))
        .route("/summary/monthly", get(monthly_summary))
        .route("/summary/streaks", get(streak_summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use reeltrack_core::FixedClock;
    use reeltrack_db::Database;
    use tower::ServiceExt;

    async fn test_app(today: (i32, u32, u32)) -> (Router, Arc<AppState>) {
        let db = Database::new_in_memory().await.expect("in-memory DB");
        let clock = Arc::new(FixedClock::at(
            Utc.with_ymd_and_hms(today.0, today.1, today.2, 12, 0, 0)
                .unwrap(),
        ));
        let state = AppState::with_clock(db, clock);
        let app = crate::routes::api_routes(state.clone());
        (app, state)
    }

    async fn seed_rollup(state: &AppState, date: &str, sessions: i64, reels: i64, minutes: i64) {
        sqlx::query(
            "INSERT INTO daily_summaries (summary_date, total_sessions, total_reels, total_minutes)
             VALUES (?, ?, ?, ?)",
        )
        .bind(date)
        .bind(sessions)
        .bind(reels)
        .bind(minutes)
        .execute(state.db.pool())
        .await
        .unwrap();
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_daily_explicit_range() {
        let (app, state) = test_app((2024, 6, 15)).await;
        seed_rollup(&state, "2024-06-01", 1, 5, 10).await;
        seed_rollup(&state, "2024-06-03", 2, 8, 20).await;
        seed_rollup(&state, "2024-06-10", 1, 1, 1).await;

        let (status, body) = get_json(
            &app,
            "/api/summary/daily?start_date=2024-06-01&end_date=2024-06-05",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["summary_date"], "2024-06-01");
        assert_eq!(items[1]["total_reels"], 8);
    }

    #[tokio::test]
    async fn test_daily_defaults_to_last_30_days() {
        let (app, state) = test_app((2024, 6, 15)).await;
        // 2024-05-17 is day one of the default window; 2024-05-16 is just
        // outside it.
        seed_rollup(&state, "2024-05-16", 9, 9, 9).await;
        seed_rollup(&state, "2024-05-17", 1, 2, 3).await;
        seed_rollup(&state, "2024-06-15", 1, 4, 6).await;

        let (status, body) = get_json(&app, "/api/summary/daily").await;

        assert_eq!(status, StatusCode::OK);
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["summary_date"], "2024-05-17");
        assert_eq!(items[1]["summary_date"], "2024-06-15");
    }

    #[tokio::test]
    async fn test_daily_partial_range_falls_back_to_default() {
        let (app, state) = test_app((2024, 6, 15)).await;
        seed_rollup(&state, "2024-05-16", 9, 9, 9).await;
        seed_rollup(&state, "2024-06-01", 1, 1, 1).await;

        let (status, body) = get_json(&app, "/api/summary/daily?start_date=2024-01-01").await;

        assert_eq!(status, StatusCode::OK);
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["summary_date"], "2024-06-01");
    }

    #[tokio::test]
    async fn test_weekly_buckets() {
        let (app, state) = test_app((2024, 6, 19)).await;
        seed_rollup(&state, "2024-06-10", 1, 5, 10).await;
        seed_rollup(&state, "2024-06-12", 2, 3, 20).await;
        seed_rollup(&state, "2024-06-17", 1, 1, 5).await;

        let (status, body) = get_json(&app, "/api/summary/weekly").await;

        assert_eq!(status, StatusCode::OK);
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["start_date"], "2024-06-10");
        assert_eq!(items[0]["end_date"], "2024-06-12");
        assert_eq!(items[0]["total_sessions"], 3);
        assert_eq!(items[1]["start_date"], "2024-06-17");
    }

    #[tokio::test]
    async fn test_monthly_buckets() {
        let (app, state) = test_app((2024, 6, 15)).await;
        seed_rollup(&state, "2024-05-02", 1, 2, 3).await;
        seed_rollup(&state, "2024-05-20", 1, 2, 3).await;
        seed_rollup(&state, "2024-06-01", 2, 4, 6).await;

        let (status, body) = get_json(&app, "/api/summary/monthly").await;

        assert_eq!(status, StatusCode::OK);
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["year"], 2024);
        assert_eq!(items[0]["month"], 5);
        assert_eq!(items[0]["total_sessions"], 2);
        assert_eq!(items[1]["month"], 6);
    }

    #[tokio::test]
    async fn test_streaks_current_requires_today() {
        let (app, state) = test_app((2024, 1, 3)).await;
        seed_rollup(&state, "2024-01-01", 1, 0, 5).await;
        seed_rollup(&state, "2024-01-02", 1, 0, 5).await;
        seed_rollup(&state, "2024-01-03", 1, 0, 5).await;

        let (status, body) = get_json(&app, "/api/summary/streaks").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_streak"], 3);
        assert_eq!(body["longest_streak"], 3);

        // Two days later the run is stale: current resets, longest holds.
        let (app, state) = test_app((2024, 1, 5)).await;
        seed_rollup(&state, "2024-01-01", 1, 0, 5).await;
        seed_rollup(&state, "2024-01-02", 1, 0, 5).await;
        seed_rollup(&state, "2024-01-03", 1, 0, 5).await;

        let (status, body) = get_json(&app, "/api/summary/streaks").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_streak"], 0);
        assert_eq!(body["longest_streak"], 3);
    }

    #[tokio::test]
    async fn test_summaries_empty_database() {
        let (app, _state) = test_app((2024, 6, 15)).await;

        let (status, body) = get_json(&app, "/api/summary/daily").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 0);

        let (status, body) = get_json(&app, "/api/summary/streaks").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_streak"], 0);
        assert_eq!(body["longest_streak"], 0);
    }
}
