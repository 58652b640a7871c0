//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor. Everything in it is cheap to clone: the catalog
//! and ledgers hold paths or pools, the chain client wraps a shared
//! `reqwest::Client`, and metrics are `Arc`ed counters.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use lokapal_chain_client::ChainClient;
use lokapal_polls::{FileLedger, PollCatalog};

use crate::middleware::metrics::ApiMetrics;
use crate::store::VoteStore;

/// Default poll definition root.
pub const DEFAULT_CONTENT_DIR: &str = "contents/fmao/polls";
/// Default file ledger root.
pub const DEFAULT_VOTES_DIR: &str = "data/votes";
/// Default bound on one storage operation.
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5_000;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Root of the poll definition tree.
    pub content_dir: PathBuf,
    /// Root of the file ledger. Unused when Postgres is configured.
    pub votes_dir: PathBuf,
    /// Bound on each storage read or write.
    pub storage_timeout: Duration,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            content_dir: PathBuf::from(DEFAULT_CONTENT_DIR),
            votes_dir: PathBuf::from(DEFAULT_VOTES_DIR),
            storage_timeout: Duration::from_millis(DEFAULT_STORAGE_TIMEOUT_MS),
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 8080)
    /// - `POLL_CONTENT_DIR` (default: `contents/fmao/polls`)
    /// - `VOTE_DATA_DIR` (default: `data/votes`)
    /// - `STORAGE_TIMEOUT_MS` (default: 5000)
    /// - `LOG_FORMAT` (`json` for JSON logs, anything else for text)
    ///
    /// `DATABASE_URL` and the `CHAIN_*` variables are read by their own
    /// modules.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse("PORT").unwrap_or(defaults.port),
            content_dir: std::env::var_os("POLL_CONTENT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.content_dir),
            votes_dir: std::env::var_os("VOTE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.votes_dir),
            storage_timeout: env_parse("STORAGE_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.storage_timeout),
            log_format: match std::env::var("LOG_FORMAT") {
                Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        }
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.parse().ok())
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Poll definitions.
    pub catalog: PollCatalog,
    /// Vote ledger.
    pub votes: VoteStore,
    /// Book token reader. `None` makes token gating advisory.
    pub chain: Option<ChainClient>,
    /// Request and vote counters.
    pub metrics: ApiMetrics,
    /// Configuration the state was built from.
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// State with the file ledger and no chain reader.
    pub fn new(config: AppConfig) -> Self {
        let votes = VoteStore::File(FileLedger::new(
            config.votes_dir.clone(),
            config.storage_timeout,
        ));
        Self::with_backends(config, votes, None)
    }

    /// State with an explicit vote backend and optional chain reader.
    pub fn with_backends(config: AppConfig, votes: VoteStore, chain: Option<ChainClient>) -> Self {
        Self {
            catalog: PollCatalog::new(config.content_dir.clone(), config.storage_timeout),
            votes,
            chain,
            metrics: ApiMetrics::new(),
            config: Arc::new(config),
        }
    }
}
