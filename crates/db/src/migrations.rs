// crates/db/src/migrations.rs
//! Inline schema migrations, applied in order by `Database::run_migrations`.
//!
//! Each entry runs at most once; the `_migrations` table tracks the highest
//! applied version. Append new statements, never edit released ones.

pub(crate) const MIGRATIONS: &[&str] = &[
    // 001: usage sessions. Timestamps are Unix seconds (UTC); calendar_date
    // is the local date the session belongs to, fixed at creation.
    "CREATE TABLE IF NOT EXISTS sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        start_time INTEGER NOT NULL,
        end_time INTEGER,
        duration_minutes INTEGER,
        reels_watched INTEGER,
        mood TEXT,
        calendar_date TEXT NOT NULL,
        open_marker INTEGER
    )",
    // 002: per-day rollup counters, keyed by calendar date.
    "CREATE TABLE IF NOT EXISTS daily_summaries (
        summary_date TEXT PRIMARY KEY,
        total_sessions INTEGER NOT NULL DEFAULT 0,
        total_reels INTEGER NOT NULL DEFAULT 0,
        total_minutes INTEGER NOT NULL DEFAULT 0
    )",
    // 003: at most one open session, store-wide. open_marker is 1 while a
    // session is open and NULL once closed; the unique index admits any
    // number of NULLs but only a single 1, so a second concurrent insert
    // fails at the database rather than racing a check-then-act.
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_single_open
        ON sessions (open_marker)",
    // 004: read-path indexes.
    "CREATE INDEX IF NOT EXISTS idx_sessions_calendar_date ON sessions (calendar_date)",
    "CREATE INDEX IF NOT EXISTS idx_sessions_start_time ON sessions (start_time)",
];
