// crates/db/src/sessions.rs
//! Session store read queries and row mapping.
//!
//! Writes go through [`crate::SessionLifecycle`], which owns the
//! single-open-session invariant and the close-plus-rollup transaction.

use chrono::{DateTime, NaiveDate, Utc};
use reeltrack_core::Session;
use sqlx::FromRow;

use crate::{Database, DbError, DbResult};

pub(crate) const SESSION_COLUMNS: &str =
    "id, start_time, end_time, duration_minutes, reels_watched, mood, calendar_date";

/// Raw `sessions` row; converted to the domain type via [`SessionRow::into_session`].
#[derive(Debug, FromRow)]
pub(crate) struct SessionRow {
    pub id: i64,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub duration_minutes: Option<i64>,
    pub reels_watched: Option<i64>,
    pub mood: Option<String>,
    pub calendar_date: String,
}

impl SessionRow {
    pub(crate) fn into_session(self) -> DbResult<Session> {
        let start_time = decode_timestamp(self.start_time)?;
        let end_time = self.end_time.map(decode_timestamp).transpose()?;
        let calendar_date = decode_date(&self.calendar_date)?;
        Ok(Session {
            id: self.id,
            start_time,
            end_time,
            duration_minutes: self.duration_minutes,
            reels_watched: self.reels_watched,
            mood: self.mood,
            calendar_date,
        })
    }
}

pub(crate) fn decode_timestamp(secs: i64) -> DbResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| DbError::Decode(format!("timestamp out of range: {secs}")))
}

pub(crate) fn decode_date(text: &str) -> DbResult<NaiveDate> {
    text.parse()
        .map_err(|_| DbError::Decode(format!("malformed calendar date: {text}")))
}

impl Database {
    /// Load a session by id.
    pub async fn get_session(&self, id: i64) -> DbResult<Option<Session>> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(SessionRow::into_session).transpose()
    }

    /// The currently open session, if any.
    pub async fn active_session(&self) -> DbResult<Option<Session>> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE end_time IS NULL
             ORDER BY start_time DESC
             LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;
        row.map(SessionRow::into_session).transpose()
    }

    /// List sessions newest-first, optionally restricted to one calendar date.
    pub async fn list_sessions(&self, date_filter: Option<NaiveDate>) -> DbResult<Vec<Session>> {
        let rows: Vec<SessionRow> = match date_filter {
            Some(date) => {
                sqlx::query_as(&format!(
                    "SELECT {SESSION_COLUMNS} FROM sessions
                     WHERE calendar_date = ?
                     ORDER BY start_time DESC, id DESC"
                ))
                .bind(date.to_string())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {SESSION_COLUMNS} FROM sessions
                     ORDER BY start_time DESC, id DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(SessionRow::into_session).collect()
    }
}
