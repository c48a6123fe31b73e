// crates/core/src/dates.rs
//! Calendar rules: local dates from fixed UTC offsets, `%W` week numbering,
//! summary windows and streak folding.
//!
//! All functions here are pure and operate on explicit dates so callers can
//! supply "today" from a [`crate::Clock`].

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};

use crate::types::Streaks;

/// Smallest accepted client UTC offset (UTC-14:00), in minutes.
pub const MIN_UTC_OFFSET_MINUTES: i32 = -840;
/// Largest accepted client UTC offset (UTC+14:00), in minutes.
pub const MAX_UTC_OFFSET_MINUTES: i32 = 840;

/// Whether a client-supplied UTC offset is within the accepted range.
pub fn utc_offset_in_range(minutes: i32) -> bool {
    (MIN_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES).contains(&minutes)
}

/// The local calendar date of a UTC instant for a fixed offset in minutes.
///
/// This deliberately ignores DST; the offset is whatever the client reported
/// at session start.
pub fn local_date(instant: DateTime<Utc>, utc_offset_minutes: i32) -> NaiveDate {
    (instant + Duration::minutes(i64::from(utc_offset_minutes))).date_naive()
}

/// Whole minutes between `start` and `end`, floored.
///
/// Clamped to zero when `end` precedes `start` (clock skew).
pub fn duration_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_seconds().max(0) / 60
}

/// Week-of-year with Monday as the first day of the week, matching
/// strftime's `%W`: week 1 starts at the first Monday of the year, days
/// before that are week 0.
pub fn week_number(date: NaiveDate) -> u32 {
    let days_from_monday = date.weekday().num_days_from_monday();
    (date.ordinal0() + 7 - days_from_monday) / 7
}

/// The Monday of the week containing `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// Start of the weekly-summary window: the Monday of the week seven weeks
/// before `today`, giving eight calendar weeks including the current one.
pub fn weekly_window_start(today: NaiveDate) -> NaiveDate {
    monday_of(today - Days::new(7 * 7))
}

/// Start of the monthly-summary window: day 1 of the month roughly 180 days
/// before the first of the current month, covering the last six months.
pub fn monthly_window_start(today: NaiveDate) -> NaiveDate {
    let first_of_month = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
        .expect("day 1 exists in every month");
    let back = first_of_month - Days::new(180);
    NaiveDate::from_ymd_opt(back.year(), back.month(), 1).expect("day 1 exists in every month")
}

/// Default daily-summary range: the 30-day window ending on `today`,
/// inclusive on both ends.
pub fn default_daily_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today - Days::new(29), today)
}

/// Fold an ascending list of distinct rollup dates into streak counters.
///
/// `longest_streak` is the longest run of consecutive dates. The trailing
/// run only counts as `current_streak` when it ends exactly on `today`; a
/// run that stopped yesterday reports 0.
pub fn compute_streaks(dates: &[NaiveDate], today: NaiveDate) -> Streaks {
    let Some(last) = dates.last() else {
        return Streaks {
            current_streak: 0,
            longest_streak: 0,
        };
    };

    let mut longest = 1u32;
    let mut run = 1u32;
    for pair in dates.windows(2) {
        if pair[0].succ_opt() == Some(pair[1]) {
            run += 1;
        } else {
            run = 1;
        }
        longest = longest.max(run);
    }

    // After the loop `run` holds the length of the trailing run.
    let current = if *last == today { run } else { 0 };
    Streaks {
        current_streak: current,
        longest_streak: longest,
    }
}
