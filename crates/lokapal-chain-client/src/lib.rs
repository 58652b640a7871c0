//! # lokapal-chain-client — Book Token Ownership Reader
//!
//! Answers one question for the poll gate: does this wallet hold the book
//! token for this book? The answer comes from an ERC-1155 `balanceOf` read
//! issued as a JSON-RPC `eth_call` against the latest block.
//!
//! Token ids are derived from book ids elsewhere
//! ([`lokapal_core::BookId::token_id`]); this crate only speaks the wire
//! protocol.

pub mod abi;
pub mod config;
pub mod error;
pub(crate) mod retry;

pub use config::{ChainConfig, ConfigError};
pub use error::ChainError;

use std::time::Duration;

use lokapal_core::WalletAddress;
use serde::{Deserialize, Serialize};

const ETH_CALL: &str = "eth_call";

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: (CallObject<'a>, &'static str),
}

#[derive(Debug, Serialize)]
struct CallObject<'a> {
    to: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC client for the book token contract.
#[derive(Debug, Clone)]
pub struct ChainClient {
    http: reqwest::Client,
    rpc_url: url::Url,
    contract: String,
    retry: retry::RetryPolicy,
}

impl ChainClient {
    /// Create a client from configuration.
    pub fn new(config: ChainConfig) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChainError::Http {
                method: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            rpc_url: config.rpc_url,
            contract: config.book_token_contract,
            retry: retry::RetryPolicy::default(),
        })
    }

    /// The contract queried, lowercase.
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Whether `account` holds a non-zero balance of `token_id`.
    pub async fn owns_book_token(
        &self,
        account: &WalletAddress,
        token_id: u64,
    ) -> Result<bool, ChainError> {
        let raw = self
            .eth_call(abi::encode_balance_of(account, token_id))
            .await?;
        let owns = abi::decode_nonzero_uint(&raw).map_err(|reason| ChainError::Decode {
            method: ETH_CALL.into(),
            reason,
        })?;

        tracing::debug!(wallet = %account, token_id, owns, "book token balance read");
        Ok(owns)
    }

    /// Issue `eth_call` to the contract at the latest block and return the
    /// raw hex result.
    async fn eth_call(&self, data: String) -> Result<String, ChainError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: ETH_CALL,
            params: (
                CallObject {
                    to: &self.contract,
                    data,
                },
                "latest",
            ),
        };

        let resp = retry::retry_send(&self.retry, || {
            self.http.post(self.rpc_url.clone()).json(&request).send()
        })
        .await
        .map_err(|e| ChainError::Http {
            method: ETH_CALL.into(),
            source: e,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ChainError::Status {
                method: ETH_CALL.into(),
                status,
                body,
            });
        }

        let body: RpcResponse = resp.json().await.map_err(|e| ChainError::Decode {
            method: ETH_CALL.into(),
            reason: e.to_string(),
        })?;

        if let Some(err) = body.error {
            return Err(ChainError::Rpc {
                method: ETH_CALL.into(),
                code: err.code,
                message: err.message,
            });
        }
        body.result.ok_or_else(|| ChainError::Decode {
            method: ETH_CALL.into(),
            reason: "response has neither result nor error".into(),
        })
    }
}
