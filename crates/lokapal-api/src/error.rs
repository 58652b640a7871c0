//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps catalog, ledger, validation and chain errors to HTTP status codes
//! with a JSON body of `{ "error": { "code", "message", "details"? } }`.
//!
//! Server-side kinds (`CORRUPT_DATA`, `STORAGE_UNAVAILABLE`) answer with a
//! fixed message; the underlying cause is logged and never sent to the
//! client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lokapal_chain_client::ChainError;
use lokapal_core::ValidationError;
use lokapal_polls::{CatalogError, LedgerError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "ALREADY_VOTED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional context for some client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// The poll does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// A poll definition or vote ledger is unreadable (500).
    #[error("corrupt data: {0}")]
    CorruptData(String),

    /// Missing field, unknown option, malformed wallet or identifier (400).
    #[error("{0}")]
    InvalidInput(String),

    /// The poll no longer accepts votes (400).
    #[error("{0}")]
    PollInactive(String),

    /// The wallet already voted on this poll (409).
    #[error("You have already voted in this poll")]
    AlreadyVoted {
        /// The option the wallet chose earlier.
        user_vote: String,
    },

    /// The poll is token-gated and the wallet holds no book token (403).
    #[error("{0}")]
    TokenRequired(String),

    /// A backing store or the chain reader failed or timed out (503).
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::CorruptData(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CORRUPT_DATA"),
            Self::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            Self::PollInactive(_) => (StatusCode::BAD_REQUEST, "POLL_INACTIVE"),
            Self::AlreadyVoted { .. } => (StatusCode::CONFLICT, "ALREADY_VOTED"),
            Self::TokenRequired(_) => (StatusCode::FORBIDDEN, "TOKEN_REQUIRED"),
            Self::StorageUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE"),
        }
    }

    /// Whether this is a rule rejection of a well-formed request, as
    /// opposed to a missing resource or a server fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::PollInactive(_)
                | Self::AlreadyVoted { .. }
                | Self::TokenRequired(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::CorruptData(_) => "Stored poll data is corrupt".to_string(),
            Self::StorageUnavailable(_) => "Storage is temporarily unavailable".to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, code, "server error");
        }

        let details = match &self {
            Self::AlreadyVoted { user_vote } => Some(serde_json::json!({ "userVote": user_vote })),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Corrupt { .. } | CatalogError::Unaddressable(_) => {
                Self::CorruptData(err.to_string())
            }
            CatalogError::Unavailable(_) | CatalogError::Timeout(_) => {
                Self::StorageUnavailable(err.to_string())
            }
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AlreadyVoted { existing, .. } => Self::AlreadyVoted {
                user_vote: existing.to_string(),
            },
            LedgerError::Corrupt { .. } => Self::CorruptData(err.to_string()),
            LedgerError::Unavailable(_) | LedgerError::Timeout(_) => {
                Self::StorageUnavailable(err.to_string())
            }
        }
    }
}

impl From<ChainError> for AppError {
    fn from(err: ChainError) -> Self {
        Self::StorageUnavailable(format!("book token check failed: {err}"))
    }
}
