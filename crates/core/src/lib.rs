// crates/core/src/lib.rs
//! Domain types and calendar arithmetic for reeltrack.
//!
//! This crate is pure: no I/O, no storage. It holds the session and rollup
//! types shared across the workspace, the [`Clock`] time source, and the
//! date rules (local calendar dates, week numbering, summary windows,
//! streaks) that the db and server crates build on.

pub mod clock;
pub mod dates;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use dates::{MAX_UTC_OFFSET_MINUTES, MIN_UTC_OFFSET_MINUTES};
pub use types::{DailySummary, MonthlySummary, Session, Streaks, WeeklySummary};
