// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use reeltrack_core::{Clock, SystemClock};
use reeltrack_db::{Database, SessionLifecycle};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Database handle for session and rollup queries.
    pub db: Database,
    /// Session lifecycle orchestrator (sole writer of both tables).
    pub lifecycle: SessionLifecycle,
    /// Time source; summary routes derive "today" from it.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create application state with the system clock.
    pub fn new(db: Database) -> Arc<Self> {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    /// Create application state with an explicit clock (used by tests to
    /// pin "now").
    pub fn with_clock(db: Database, clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            lifecycle: SessionLifecycle::new(db.clone(), clock.clone()),
            db,
            clock,
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
