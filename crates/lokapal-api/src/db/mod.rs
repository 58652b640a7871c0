//! # Database Persistence Layer
//!
//! Optional Postgres vote ledger via SQLx. When `DATABASE_URL` is set the
//! service stores votes in the `poll_votes` table; when absent it uses the
//! file ledger under `VOTE_DATA_DIR`.
//!
//! Poll definitions are never stored here; they stay in the content tree.

pub mod votes;

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Pool sizing, from `DATABASE_MAX_CONNECTIONS` (default 10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

impl PoolSettings {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_connections),
            ..defaults
        }
    }
}

/// Connect to `DATABASE_URL` and bring `poll_votes` up to date.
///
/// `Ok(None)` when the variable is unset. A set but unreachable database is
/// an error: silently falling back to files would split the ledger.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        tracing::info!("DATABASE_URL not set, votes are stored in the file ledger");
        return Ok(None);
    };
    connect(&url, PoolSettings::from_env()).await.map(Some)
}

/// Open a pool on `url` and apply the embedded migrations.
pub async fn connect(url: &str, settings: PoolSettings) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect(url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!(
        max_connections = settings.max_connections,
        "vote ledger database ready"
    );
    Ok(pool)
}
