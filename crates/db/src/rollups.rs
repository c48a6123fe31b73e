// crates/db/src/rollups.rs
//! Read paths over the daily rollup table: date-range reads, weekly and
//! monthly buckets, streak counters.
//!
//! Rollup rows are written only by [`crate::SessionLifecycle`]; everything
//! here is a read. Bucketing happens in Rust over the windowed rows so the
//! `%W` week convention stays in one place ([`reeltrack_core::dates`]).

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use reeltrack_core::{dates, DailySummary, MonthlySummary, Streaks, WeeklySummary};
use sqlx::FromRow;

use crate::sessions::decode_date;
use crate::{Database, DbResult};

#[derive(Debug, FromRow)]
struct RollupRow {
    summary_date: String,
    total_sessions: i64,
    total_reels: i64,
    total_minutes: i64,
}

impl RollupRow {
    fn into_summary(self) -> DbResult<DailySummary> {
        Ok(DailySummary {
            summary_date: decode_date(&self.summary_date)?,
            total_sessions: self.total_sessions,
            total_reels: self.total_reels,
            total_minutes: self.total_minutes,
        })
    }
}

impl Database {
    /// Rollup rows with `summary_date` in `[start, end]`, ascending.
    ///
    /// Days without a rollup row are simply absent, not zero-filled.
    pub async fn daily_summaries(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<DailySummary>> {
        let rows: Vec<RollupRow> = sqlx::query_as(
            "SELECT summary_date, total_sessions, total_reels, total_minutes
             FROM daily_summaries
             WHERE summary_date >= ? AND summary_date <= ?
             ORDER BY summary_date ASC",
        )
        .bind(start.to_string())
        .bind(end.to_string())
        .fetch_all(self.pool())
        .await?;
        rows.into_iter().map(RollupRow::into_summary).collect()
    }

    /// Rollups from the last eight calendar weeks (Monday-floored) bucketed
    /// by `(year, week)`, ascending.
    pub async fn weekly_summaries(&self, today: NaiveDate) -> DbResult<Vec<WeeklySummary>> {
        let start = dates::weekly_window_start(today);
        let rows = self.daily_summaries(start, today).await?;
        Ok(bucket_weeks(&rows))
    }

    /// Rollups from the last six months bucketed by `(year, month)`,
    /// ascending.
    pub async fn monthly_summaries(&self, today: NaiveDate) -> DbResult<Vec<MonthlySummary>> {
        let start = dates::monthly_window_start(today);
        let rows = self.daily_summaries(start, today).await?;
        Ok(bucket_months(&rows))
    }

    /// Current and longest streaks over all days with at least one closed
    /// session.
    pub async fn streaks(&self, today: NaiveDate) -> DbResult<Streaks> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT summary_date FROM daily_summaries
             WHERE total_sessions > 0
             ORDER BY summary_date ASC",
        )
        .fetch_all(self.pool())
        .await?;
        let days = rows
            .iter()
            .map(|(date,)| decode_date(date))
            .collect::<DbResult<Vec<_>>>()?;
        Ok(dates::compute_streaks(&days, today))
    }
}

fn bucket_weeks(rows: &[DailySummary]) -> Vec<WeeklySummary> {
    let mut buckets: BTreeMap<(i32, u32), WeeklySummary> = BTreeMap::new();
    for row in rows {
        let date = row.summary_date;
        let key = (date.year(), dates::week_number(date));
        buckets
            .entry(key)
            .and_modify(|bucket| fold_week(bucket, row))
            .or_insert_with(|| WeeklySummary {
                year: key.0,
                week: key.1,
                start_date: date,
                end_date: date,
                total_sessions: row.total_sessions,
                total_reels: row.total_reels,
                total_minutes: row.total_minutes,
            });
    }
    buckets.into_values().collect()
}

fn fold_week(bucket: &mut WeeklySummary, row: &DailySummary) {
    bucket.start_date = bucket.start_date.min(row.summary_date);
    bucket.end_date = bucket.end_date.max(row.summary_date);
    bucket.total_sessions += row.total_sessions;
    bucket.total_reels += row.total_reels;
    bucket.total_minutes += row.total_minutes;
}

fn bucket_months(rows: &[DailySummary]) -> Vec<MonthlySummary> {
    let mut buckets: BTreeMap<(i32, u32), MonthlySummary> = BTreeMap::new();
    for row in rows {
        let date = row.summary_date;
        let key = (date.year(), date.month());
        buckets
            .entry(key)
            .and_modify(|bucket| {
                bucket.start_date = bucket.start_date.min(date);
                bucket.end_date = bucket.end_date.max(date);
                bucket.total_sessions += row.total_sessions;
                bucket.total_reels += row.total_reels;
                bucket.total_minutes += row.total_minutes;
            })
            .or_insert_with(|| MonthlySummary {
                year: key.0,
                month: key.1,
                start_date: date,
                end_date: date,
                total_sessions: row.total_sessions,
                total_reels: row.total_reels,
                total_minutes: row.total_minutes,
            });
    }
    buckets.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    async fn seed_rollup(db: &Database, date: &str, sessions: i64, reels: i64, minutes: i64) {
        sqlx::query(
            "INSERT INTO daily_summaries (summary_date, total_sessions, total_reels, total_minutes)
             VALUES (?, ?, ?, ?)",
        )
        .bind(date)
        .bind(sessions)
        .bind(reels)
        .bind(minutes)
        .execute(db.pool())
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_daily_summaries_range_inclusive_and_ascending() {
        let db = Database::new_in_memory().await.unwrap();
        seed_rollup(&db, "2024-03-05", 1, 10, 15).await;
        seed_rollup(&db, "2024-03-01", 2, 4, 30).await;
        seed_rollup(&db, "2024-02-29", 1, 1, 1).await;
        seed_rollup(&db, "2024-03-06", 3, 9, 9).await;

        let items = db
            .daily_summaries(d(2024, 3, 1), d(2024, 3, 5))
            .await
            .unwrap();
        let dates: Vec<NaiveDate> = items.iter().map(|i| i.summary_date).collect();
        assert_eq!(dates, vec![d(2024, 3, 1), d(2024, 3, 5)]);
        assert_eq!(items[0].total_sessions, 2);
    }

    #[tokio::test]
    async fn test_weekly_summaries_buckets_and_window() {
        let db = Database::new_in_memory().await.unwrap();
        // today = Wednesday 2024-06-19; window starts Monday 2024-04-29.
        let today = d(2024, 6, 19);

        // Before the window: must not appear.
        seed_rollup(&db, "2024-04-28", 9, 9, 9).await;
        // Same week (week of 2024-06-10): two rows, one bucket.
        seed_rollup(&db, "2024-06-10", 1, 5, 10).await;
        seed_rollup(&db, "2024-06-12", 2, 3, 20).await;
        // Current week.
        seed_rollup(&db, "2024-06-17", 1, 1, 5).await;

        let items = db.weekly_summaries(today).await.unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].year, 2024);
        assert_eq!(items[0].week, dates::week_number(d(2024, 6, 10)));
        assert_eq!(items[0].start_date, d(2024, 6, 10));
        assert_eq!(items[0].end_date, d(2024, 6, 12));
        assert_eq!(items[0].total_sessions, 3);
        assert_eq!(items[0].total_reels, 8);
        assert_eq!(items[0].total_minutes, 30);

        assert_eq!(items[1].start_date, d(2024, 6, 17));
    }

    #[tokio::test]
    async fn test_weekly_buckets_split_at_year_boundary() {
        let db = Database::new_in_memory().await.unwrap();
        // 2023-12-31 is a Sunday, 2024-01-01 the following Monday. They sit
        // in the same ISO week but different (year, %W-week) buckets.
        seed_rollup(&db, "2023-12-31", 1, 1, 1).await;
        seed_rollup(&db, "2024-01-01", 1, 1, 1).await;

        let items = db.weekly_summaries(d(2024, 1, 3)).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].year, 2023);
        assert_eq!(items[1].year, 2024);
        assert_eq!(items[1].week, 1);
    }

    #[tokio::test]
    async fn test_monthly_summaries_buckets_and_window() {
        let db = Database::new_in_memory().await.unwrap();
        let today = d(2024, 6, 15); // window starts 2023-12-01

        seed_rollup(&db, "2023-11-30", 9, 9, 9).await; // outside
        seed_rollup(&db, "2023-12-01", 1, 2, 3).await;
        seed_rollup(&db, "2024-06-01", 1, 5, 10).await;
        seed_rollup(&db, "2024-06-14", 2, 5, 20).await;

        let items = db.monthly_summaries(today).await.unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!((items[0].year, items[0].month), (2023, 12));
        assert_eq!((items[1].year, items[1].month), (2024, 6));
        assert_eq!(items[1].start_date, d(2024, 6, 1));
        assert_eq!(items[1].end_date, d(2024, 6, 14));
        assert_eq!(items[1].total_sessions, 3);
        assert_eq!(items[1].total_reels, 10);
        assert_eq!(items[1].total_minutes, 30);
    }

    #[tokio::test]
    async fn test_streaks_from_rollups() {
        let db = Database::new_in_memory().await.unwrap();
        seed_rollup(&db, "2024-01-01", 1, 0, 5).await;
        seed_rollup(&db, "2024-01-02", 2, 0, 5).await;
        seed_rollup(&db, "2024-01-03", 1, 0, 5).await;

        let streaks = db.streaks(d(2024, 1, 3)).await.unwrap();
        assert_eq!(streaks.longest_streak, 3);
        assert_eq!(streaks.current_streak, 3);

        let streaks = db.streaks(d(2024, 1, 5)).await.unwrap();
        assert_eq!(streaks.longest_streak, 3);
        assert_eq!(streaks.current_streak, 0);
    }

    #[tokio::test]
    async fn test_streaks_ignore_zero_session_rows() {
        let db = Database::new_in_memory().await.unwrap();
        seed_rollup(&db, "2024-01-01", 1, 0, 5).await;
        seed_rollup(&db, "2024-01-02", 0, 0, 0).await;
        seed_rollup(&db, "2024-01-03", 1, 0, 5).await;

        let streaks = db.streaks(d(2024, 1, 3)).await.unwrap();
        assert_eq!(streaks.longest_streak, 1);
        assert_eq!(streaks.current_streak, 1);
    }

    #[tokio::test]
    async fn test_empty_rollups_yield_empty_aggregates() {
        let db = Database::new_in_memory().await.unwrap();
        let today = d(2024, 6, 15);
        assert!(db.weekly_summaries(today).await.unwrap().is_empty());
        assert!(db.monthly_summaries(today).await.unwrap().is_empty());
        let streaks = db.streaks(today).await.unwrap();
        assert_eq!(streaks.longest_streak, 0);
        assert_eq!(streaks.current_streak, 0);
    }
}
