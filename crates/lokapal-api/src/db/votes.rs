//! Postgres vote ledger.
//!
//! Uniqueness is the table's `UNIQUE (poll_id, wallet_address)` constraint:
//! the insert uses `ON CONFLICT DO NOTHING`, and zero affected rows means the
//! wallet already voted. No application lock is needed, and the rule holds
//! across service replicas.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lokapal_core::{OptionId, PollId, Vote, WalletAddress};
use lokapal_polls::{LedgerError, Recorded};
use sqlx::PgPool;

const LIST_VOTES: &str = "SELECT poll_id, option_id, wallet_address, voted_at
     FROM poll_votes WHERE poll_id = $1 ORDER BY seq";

/// Vote ledger backed by the `poll_votes` table.
#[derive(Debug, Clone)]
pub struct PgLedger {
    pool: PgPool,
    io_timeout: Duration,
}

impl PgLedger {
    /// Wrap a migrated pool. Every query is bounded by `io_timeout`.
    pub fn new(pool: PgPool, io_timeout: Duration) -> Self {
        Self { pool, io_timeout }
    }

    /// All votes for a poll, in insertion order.
    pub async fn list_votes(&self, poll_id: &PollId) -> Result<Vec<Vote>, LedgerError> {
        let rows = self
            .bounded(
                sqlx::query_as::<_, VoteRow>(LIST_VOTES)
                    .bind(poll_id.to_string())
                    .fetch_all(&self.pool),
            )
            .await?;

        rows.into_iter().map(|row| row.into_vote(poll_id)).collect()
    }

    /// The option `wallet` chose on this poll, if it has voted.
    pub async fn has_voted(
        &self,
        poll_id: &PollId,
        wallet: &WalletAddress,
    ) -> Result<Option<OptionId>, LedgerError> {
        let option: Option<String> = self
            .bounded(
                sqlx::query_scalar(
                    "SELECT option_id FROM poll_votes
                     WHERE poll_id = $1 AND wallet_address = $2",
                )
                .bind(poll_id.to_string())
                .bind(wallet.as_str())
                .fetch_optional(&self.pool),
            )
            .await?;

        option
            .map(|id| OptionId::new(id).map_err(|e| corrupt(poll_id, e)))
            .transpose()
    }

    /// Insert a vote unless `wallet` already voted on this poll, and read
    /// back the poll's ledger in the same transaction.
    pub async fn record_vote(
        &self,
        poll_id: &PollId,
        option_id: &OptionId,
        wallet: &WalletAddress,
    ) -> Result<Recorded, LedgerError> {
        let vote = Vote::new(poll_id.clone(), option_id.clone(), wallet.clone());

        let rows = self
            .bounded(async {
                let mut tx = self.pool.begin().await?;
                let inserted = sqlx::query(
                    "INSERT INTO poll_votes (poll_id, option_id, wallet_address, voted_at)
                     VALUES ($1, $2, $3, $4)
                     ON CONFLICT (poll_id, wallet_address) DO NOTHING",
                )
                .bind(poll_id.to_string())
                .bind(option_id.as_str())
                .bind(wallet.as_str())
                .bind(vote.timestamp)
                .execute(&mut *tx)
                .await?;
                if inserted.rows_affected() == 0 {
                    return Ok::<_, sqlx::Error>(None);
                }

                let rows = sqlx::query_as::<_, VoteRow>(LIST_VOTES)
                    .bind(poll_id.to_string())
                    .fetch_all(&mut *tx)
                    .await?;
                tx.commit().await?;
                Ok(Some(rows))
            })
            .await?;

        let Some(rows) = rows else {
            let existing = self
                .has_voted(poll_id, wallet)
                .await?
                .unwrap_or_else(|| option_id.clone());
            return Err(LedgerError::AlreadyVoted {
                poll_id: poll_id.clone(),
                existing,
            });
        };

        let ledger = rows
            .into_iter()
            .map(|row| row.into_vote(poll_id))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(
            poll_id = %poll_id,
            option_id = %option_id,
            total = ledger.len(),
            "vote inserted"
        );
        Ok(Recorded { vote, ledger })
    }

    /// Whether the database answers a trivial query.
    pub async fn is_available(&self) -> bool {
        let ping = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool);
        matches!(tokio::time::timeout(self.io_timeout, ping).await, Ok(Ok(1)))
    }

    async fn bounded<T>(
        &self,
        query: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> Result<T, LedgerError> {
        match tokio::time::timeout(self.io_timeout, query).await {
            Err(_) => Err(LedgerError::Timeout(self.io_timeout)),
            Ok(Err(e)) => Err(LedgerError::Unavailable(e.to_string())),
            Ok(Ok(value)) => Ok(value),
        }
    }
}

fn corrupt(poll_id: &PollId, reason: impl std::fmt::Display) -> LedgerError {
    LedgerError::Corrupt {
        poll_id: poll_id.clone(),
        reason: reason.to_string(),
    }
}

#[derive(sqlx::FromRow)]
struct VoteRow {
    poll_id: String,
    option_id: String,
    wallet_address: String,
    voted_at: DateTime<Utc>,
}

impl VoteRow {
    fn into_vote(self, expected: &PollId) -> Result<Vote, LedgerError> {
        let poll_id = PollId::parse(&self.poll_id).map_err(|e| corrupt(expected, e))?;
        Ok(Vote {
            poll_id,
            option_id: OptionId::new(self.option_id).map_err(|e| corrupt(expected, e))?,
            wallet_address: WalletAddress::new(self.wallet_address)
                .map_err(|e| corrupt(expected, e))?,
            timestamp: self.voted_at,
        })
    }
}
