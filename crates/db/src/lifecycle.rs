// crates/db/src/lifecycle.rs
//! Session lifecycle orchestration: start, end, and the invariants around
//! them.
//!
//! This is the only writer of the `sessions` and `daily_summaries` tables.
//! `start` relies on the unique open-marker index for the single-open
//! invariant; `end` closes the session and bumps the day's rollup counters
//! inside one transaction, so the pair commits or fails as a unit.

use std::sync::Arc;

use chrono::NaiveDate;
use reeltrack_core::{dates, Clock, Session};
use thiserror::Error;
use tracing::info;

use crate::sessions::{decode_timestamp, SessionRow, SESSION_COLUMNS};
use crate::{Database, DbError};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("a session is already active")]
    SessionAlreadyActive,

    #[error("session {0} is already ended")]
    SessionAlreadyEnded(i64),

    #[error("session {0} not found")]
    SessionNotFound(i64),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for LifecycleError {
    fn from(err: sqlx::Error) -> Self {
        LifecycleError::Db(DbError::Sqlx(err))
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Coordinates the session store and the daily rollup store.
#[derive(Clone)]
pub struct SessionLifecycle {
    db: Database,
    clock: Arc<dyn Clock>,
    /// Serializes the two write paths. Without it, two deferred SQLite
    /// transactions that read before either writes can abort with
    /// `SQLITE_BUSY_SNAPSHOT` instead of queueing; with it, the loser of a
    /// race sees the winner's commit and gets a clean conflict error. The
    /// unique open-marker index remains the backstop underneath.
    write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl SessionLifecycle {
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            clock,
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Start a new session.
    ///
    /// `utc_offset_minutes` fixes the session's local calendar date; when
    /// absent the UTC date is used. Fails with
    /// [`LifecycleError::SessionAlreadyActive`] if an open session exists,
    /// and creates no row in that case.
    pub async fn start(&self, utc_offset_minutes: Option<i32>) -> LifecycleResult<Session> {
        let now = self.clock.now();
        let calendar_date = match utc_offset_minutes {
            Some(minutes) => dates::local_date(now, minutes),
            None => now.date_naive(),
        };

        let _guard = self.write_lock.lock().await;

        // Check-then-insert is safe under the write lock; the unique index
        // on open_marker still rejects a duplicate if anything else writes
        // to the database.
        if self.db.active_session().await?.is_some() {
            return Err(LifecycleError::SessionAlreadyActive);
        }

        let insert = sqlx::query(
            "INSERT INTO sessions (start_time, calendar_date, open_marker) VALUES (?, ?, 1)",
        )
        .bind(now.timestamp())
        .bind(calendar_date.to_string())
        .execute(self.db.pool())
        .await;

        let id = match insert {
            Ok(result) => result.last_insert_rowid(),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(LifecycleError::SessionAlreadyActive);
            }
            Err(err) => return Err(err.into()),
        };

        info!(session_id = id, date = %calendar_date, "session started");

        self.db
            .get_session(id)
            .await?
            .ok_or(LifecycleError::SessionNotFound(id))
    }

    /// End an open session, recording duration and close-time fields, and
    /// bump the rollup counters for its calendar date.
    ///
    /// The session close and the rollup upsert run in one transaction:
    /// either both commit or neither does. Absent `reels_watched` counts
    /// as 0 toward the rollup.
    pub async fn end(
        &self,
        session_id: i64,
        reels_watched: Option<i64>,
        mood: Option<String>,
    ) -> LifecycleResult<Session> {
        let now = self.clock.now();
        let _guard = self.write_lock.lock().await;
        let mut tx = self.db.pool().begin().await?;

        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?"
        ))
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?;
        let row = row.ok_or(LifecycleError::SessionNotFound(session_id))?;
        if row.end_time.is_some() {
            return Err(LifecycleError::SessionAlreadyEnded(session_id));
        }

        let start_time = decode_timestamp(row.start_time).map_err(LifecycleError::Db)?;
        let duration = dates::duration_minutes(start_time, now);
        // Defensive backfill: calendar_date is NOT NULL in the schema, but a
        // row with a malformed date still gets a sane one from start_time.
        let calendar_date: NaiveDate = row
            .calendar_date
            .parse()
            .unwrap_or_else(|_| start_time.date_naive());

        let updated = sqlx::query(
            "UPDATE sessions
             SET end_time = ?, duration_minutes = ?, reels_watched = ?, mood = ?,
                 calendar_date = ?, open_marker = NULL
             WHERE id = ? AND end_time IS NULL",
        )
        .bind(now.timestamp())
        .bind(duration)
        .bind(reels_watched)
        .bind(&mood)
        .bind(calendar_date.to_string())
        .bind(session_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if updated == 0 {
            // Another request closed this session between our read and write.
            return Err(LifecycleError::SessionAlreadyEnded(session_id));
        }

        sqlx::query(
            "INSERT INTO daily_summaries (summary_date, total_sessions, total_reels, total_minutes)
             VALUES (?, 1, ?, ?)
             ON CONFLICT(summary_date) DO UPDATE SET
                 total_sessions = daily_summaries.total_sessions + 1,
                 total_reels = daily_summaries.total_reels + excluded.total_reels,
                 total_minutes = daily_summaries.total_minutes + excluded.total_minutes",
        )
        .bind(calendar_date.to_string())
        .bind(reels_watched.unwrap_or(0))
        .bind(duration)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            session_id,
            date = %calendar_date,
            duration_minutes = duration,
            "session ended"
        );

        self.db
            .get_session(session_id)
            .await?
            .ok_or(LifecycleError::SessionNotFound(session_id))
    }

    /// The currently open session, if any. Pure read.
    pub async fn active_session(&self) -> LifecycleResult<Option<Session>> {
        Ok(self.db.active_session().await?)
    }

    /// Sessions newest-first, optionally restricted to one calendar date.
    pub async fn list_sessions(
        &self,
        date_filter: Option<NaiveDate>,
    ) -> LifecycleResult<Vec<Session>> {
        Ok(self.db.list_sessions(date_filter).await?)
    }
}
