//! Chain reader configuration.
//!
//! The RPC endpoint is required; there is no public default because hosted
//! endpoints usually embed an API key in the URL.

use lokapal_core::WalletAddress;
use url::Url;

/// Book token contract deployed for the FMAO series.
pub const DEFAULT_BOOK_TOKEN_CONTRACT: &str = "0x4FEb9Fbc359400d477761cD67d80cF0ce43dd84F";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the JSON-RPC chain reader.
///
/// Custom `Debug` implementation redacts the RPC URL, which commonly carries
/// a provider key in its path or query.
#[derive(Clone)]
pub struct ChainConfig {
    /// JSON-RPC endpoint.
    pub rpc_url: Url,
    /// ERC-1155 book token contract, lowercase.
    pub book_token_contract: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainConfig")
            .field("rpc_host", &self.rpc_url.host_str().unwrap_or("[none]"))
            .field("rpc_url", &"[REDACTED]")
            .field("book_token_contract", &self.book_token_contract)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ChainConfig {
    /// Build a configuration for `rpc_url` with the default contract and
    /// timeout.
    pub fn new(rpc_url: Url) -> Self {
        Self {
            rpc_url,
            book_token_contract: DEFAULT_BOOK_TOKEN_CONTRACT.to_ascii_lowercase(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CHAIN_RPC_URL` (required)
    /// - `BOOK_TOKEN_CONTRACT` (default: [`DEFAULT_BOOK_TOKEN_CONTRACT`])
    /// - `CHAIN_TIMEOUT_SECS` (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw = var("CHAIN_RPC_URL").ok_or(ConfigError::MissingRpcUrl)?;
        let rpc_url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidUrl("CHAIN_RPC_URL".to_string(), e.to_string()))?;

        let mut config = Self::new(rpc_url);
        if let Some(secs) = var("CHAIN_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            config.timeout_secs = secs;
        }
        match var("BOOK_TOKEN_CONTRACT") {
            Some(contract) => config.with_contract(&contract),
            None => Ok(config),
        }
    }

    /// Override the token contract.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidContract`] unless `contract` is a
    /// `0x`-prefixed 20-byte hex address.
    pub fn with_contract(mut self, contract: &str) -> Result<Self, ConfigError> {
        self.book_token_contract = parse_contract(contract)?;
        Ok(self)
    }
}

fn parse_contract(raw: &str) -> Result<String, ConfigError> {
    WalletAddress::new(raw)
        .map(String::from)
        .map_err(|_| ConfigError::InvalidContract(raw.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `CHAIN_RPC_URL` is unset.
    #[error("CHAIN_RPC_URL environment variable is required")]
    MissingRpcUrl,
    /// A URL variable did not parse.
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    /// The contract is not an EVM address.
    #[error("invalid book token contract address: {0}")]
    InvalidContract(String),
}
