//! # Vote Store
//!
//! The configured vote ledger: the file ledger by default, or Postgres when
//! `DATABASE_URL` is set. Both enforce one vote per wallet atomically; the
//! orchestration layer does not care which one it talks to.

use lokapal_core::{OptionId, PollId, Vote, WalletAddress};
use lokapal_polls::{FileLedger, LedgerError, Recorded};

use crate::db::votes::PgLedger;

/// A vote ledger backend.
#[derive(Debug, Clone)]
pub enum VoteStore {
    /// One JSON file per poll, writes serialized per poll.
    File(FileLedger),
    /// `poll_votes` table with a unique constraint.
    Postgres(PgLedger),
}

impl VoteStore {
    /// Short backend name for logs.
    pub fn backend(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Postgres(_) => "postgres",
        }
    }

    /// All votes for a poll in insertion order.
    pub async fn list_votes(&self, poll_id: &PollId) -> Result<Vec<Vote>, LedgerError> {
        match self {
            Self::File(l) => l.list_votes(poll_id).await,
            Self::Postgres(l) => l.list_votes(poll_id).await,
        }
    }

    /// The option `wallet` chose on this poll, if any.
    pub async fn has_voted(
        &self,
        poll_id: &PollId,
        wallet: &WalletAddress,
    ) -> Result<Option<OptionId>, LedgerError> {
        match self {
            Self::File(l) => l.has_voted(poll_id, wallet).await,
            Self::Postgres(l) => l.has_voted(poll_id, wallet).await,
        }
    }

    /// Record a vote and return it with the updated ledger, or fail with
    /// [`LedgerError::AlreadyVoted`].
    pub async fn record_vote(
        &self,
        poll_id: &PollId,
        option_id: &OptionId,
        wallet: &WalletAddress,
    ) -> Result<Recorded, LedgerError> {
        match self {
            Self::File(l) => l.record_vote(poll_id, option_id, wallet).await,
            Self::Postgres(l) => l.record_vote(poll_id, option_id, wallet).await,
        }
    }

    /// Whether the backend can currently serve requests.
    pub async fn is_available(&self) -> bool {
        match self {
            Self::File(l) => l.is_available().await,
            Self::Postgres(l) => l.is_available().await,
        }
    }
}
