// crates/server/src/main.rs
//! Reeltrack server binary.
//!
//! Opens (or creates) the SQLite database, runs migrations, and serves the
//! session-tracking API on localhost.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use reeltrack_db::Database;
use reeltrack_server::{create_app, AppState};

/// Default port for the server.
const DEFAULT_PORT: u16 = 47911;

/// Get the server port from environment or use default.
fn get_port() -> u16 {
    std::env::var("REELTRACK_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Get the database path from environment or use the default file in the
/// working directory.
fn get_db_path() -> PathBuf {
    std::env::var("REELTRACK_DB")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("reeltrack.db"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let db_path = get_db_path();
    let db = Database::new(&db_path).await?;
    tracing::info!(db_path = %db_path.display(), "Database ready");

    let state = AppState::new(db);
    let app = create_app(state);

    let port = get_port();
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");
    eprintln!("reeltrack v{} on http://{addr}", env!("CARGO_PKG_VERSION"));

    axum::serve(listener, app).await?;

    Ok(())
}
