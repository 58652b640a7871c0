//! Chain reader error types.

/// Errors from JSON-RPC calls.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// HTTP transport error, after retries.
    #[error("HTTP error calling {method}: {source}")]
    Http {
        method: String,
        source: reqwest::Error,
    },
    /// The endpoint returned a non-2xx status.
    #[error("RPC endpoint returned {status} for {method}: {body}")]
    Status {
        method: String,
        status: u16,
        body: String,
    },
    /// The endpoint returned a JSON-RPC error object.
    #[error("RPC error {code} from {method}: {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },
    /// The response could not be decoded.
    #[error("malformed response from {method}: {reason}")]
    Decode { method: String, reason: String },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}
