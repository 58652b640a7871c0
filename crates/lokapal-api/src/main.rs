//! # lokapal-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for chapter polls.
//! Binds to configurable port (default 8080).

use lokapal_api::db::votes::PgLedger;
use lokapal_api::state::{AppConfig, AppState, LogFormat};
use lokapal_api::store::VoteStore;
use lokapal_chain_client::{ChainClient, ChainConfig, ConfigError};
use lokapal_polls::FileLedger;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    // Postgres when DATABASE_URL is set, otherwise the file ledger.
    let db_pool = lokapal_api::db::init_pool().await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;
    let votes = match db_pool {
        Some(pool) => VoteStore::Postgres(PgLedger::new(pool, config.storage_timeout)),
        None => VoteStore::File(FileLedger::new(
            config.votes_dir.clone(),
            config.storage_timeout,
        )),
    };

    let chain = match ChainConfig::from_env() {
        Ok(chain_config) => {
            tracing::info!(?chain_config, "book token gating enforced");
            Some(ChainClient::new(chain_config)?)
        }
        Err(ConfigError::MissingRpcUrl) => {
            tracing::warn!("CHAIN_RPC_URL not set: token-gated polls accept votes without an ownership check");
            None
        }
        Err(e) => {
            tracing::error!("Chain reader configuration invalid: {e}");
            return Err(e.into());
        }
    };

    tracing::info!(
        content_dir = %config.content_dir.display(),
        vote_backend = votes.backend(),
        "poll service configured"
    );

    let port = config.port;
    let state = AppState::with_backends(config, votes, chain);
    let app = lokapal_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Lokapal poll API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
