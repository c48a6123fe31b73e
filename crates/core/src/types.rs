// crates/core/src/types.rs
//! Shared domain types: sessions, daily rollups and their aggregates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single usage session.
///
/// A session is *open* while `end_time` is `None`. Closing it fills in
/// `end_time`, `duration_minutes` and the optional close-time fields
/// (`reels_watched`, `mood`) exactly once; the record is never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
pub struct Session {
    #[ts(type = "number")]
    pub id: i64,
    /// UTC instant the session was started. Immutable after creation.
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Whole minutes between start and end, floored, clamped to zero.
    /// Set once when the session closes.
    #[ts(type = "number | null")]
    pub duration_minutes: Option<i64>,
    /// Approximate reels watched, supplied only at close time.
    #[ts(type = "number | null")]
    pub reels_watched: Option<i64>,
    /// Free-form mood label like Bored / Stressed / Relaxed / Happy.
    pub mood: Option<String>,
    /// Local calendar date the session belongs to, derived at creation from
    /// `start_time` plus the client's UTC offset. Immutable afterwards, even
    /// when `end_time` crosses midnight.
    pub calendar_date: NaiveDate,
}

impl Session {
    /// A session is open until an end operation records `end_time`.
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// Per-day aggregate counters (the daily rollup).
///
/// One row per calendar date. Counters are monotonically non-decreasing and
/// only ever incremented when a session *closes* on that date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
pub struct DailySummary {
    pub summary_date: NaiveDate,
    #[ts(type = "number")]
    pub total_sessions: i64,
    #[ts(type = "number")]
    pub total_reels: i64,
    #[ts(type = "number")]
    pub total_minutes: i64,
}

/// Daily rollups folded into one `(year, week)` bucket.
///
/// `week` follows the `%W` convention: week 1 starts at the first Monday of
/// the year, days before that are week 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
pub struct WeeklySummary {
    pub year: i32,
    pub week: u32,
    /// Earliest rollup date contributing to this bucket.
    pub start_date: NaiveDate,
    /// Latest rollup date contributing to this bucket.
    pub end_date: NaiveDate,
    #[ts(type = "number")]
    pub total_sessions: i64,
    #[ts(type = "number")]
    pub total_reels: i64,
    #[ts(type = "number")]
    pub total_minutes: i64,
}

/// Daily rollups folded into one `(year, month)` bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[ts(type = "number")]
    pub total_sessions: i64,
    #[ts(type = "number")]
    pub total_reels: i64,
    #[ts(type = "number")]
    pub total_minutes: i64,
}

/// Current and longest streaks of consecutive days with at least one
/// closed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
pub struct Streaks {
    /// Length of the run ending today; 0 unless the latest rollup date is
    /// today.
    pub current_streak: u32,
    pub longest_streak: u32,
}
