//! Storage error types.

use std::time::Duration;

use lokapal_core::{OptionId, PollId};
use thiserror::Error;

/// Errors reading poll definitions.
///
/// A definition that simply does not exist is not an error; catalog lookups
/// return `Ok(None)` for it.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The definition exists but cannot be parsed or fails validation.
    #[error("poll definition {poll_id} is corrupt: {reason}")]
    Corrupt {
        /// The poll whose definition is bad.
        poll_id: PollId,
        /// Parser or validation message.
        reason: String,
    },

    /// A file in the content tree has a name that is not a content address.
    #[error("not a poll definition address: {0}")]
    Unaddressable(String),

    /// The content store could not be read.
    #[error("poll content store unavailable: {0}")]
    Unavailable(#[from] std::io::Error),

    /// A read did not finish within the I/O timeout.
    #[error("poll content store timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors reading or appending to a vote ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The wallet already has a vote on this poll.
    #[error("wallet has already voted on {poll_id} (chose {existing})")]
    AlreadyVoted {
        /// The poll.
        poll_id: PollId,
        /// The option the wallet chose earlier.
        existing: OptionId,
    },

    /// The stored ledger cannot be parsed.
    #[error("vote ledger for {poll_id} is corrupt: {reason}")]
    Corrupt {
        /// The poll whose ledger is bad.
        poll_id: PollId,
        /// Parser message.
        reason: String,
    },

    /// The backing store could not be read or written.
    #[error("vote store unavailable: {0}")]
    Unavailable(String),

    /// An operation did not finish within the I/O timeout.
    #[error("vote store timed out after {0:?}")]
    Timeout(Duration),
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}
