//! # File Vote Ledger
//!
//! One JSON array of [`Vote`]s per poll at `<root>/<pollId>.json`, in
//! insertion order. This is the same layout the site used before, so existing
//! ledgers load unchanged.
//!
//! ## Atomicity
//!
//! [`FileLedger::record_vote`] holds the poll's async mutex across
//! read → duplicate check → append → write. The new ledger is written to
//! `<pollId>.json.tmp`, flushed, then renamed over the old file. Readers
//! never lock. They see either the old or the new ledger, never a torn one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use lokapal_core::{find_vote, OptionId, PollId, Vote, WalletAddress};
use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;

use crate::error::LedgerError;

/// A vote just appended, with the poll's ledger as written.
#[derive(Debug, Clone)]
pub struct Recorded {
    /// The new vote.
    pub vote: Vote,
    /// Every vote on the poll, the new one last.
    pub ledger: Vec<Vote>,
}

type PollLocks = HashMap<PollId, Arc<tokio::sync::Mutex<()>>>;

/// File-backed vote ledger with per-poll serialized writes.
#[derive(Debug, Clone)]
pub struct FileLedger {
    root: PathBuf,
    io_timeout: Duration,
    // parking_lot guard is never held across an await; the per-poll tokio
    // mutex is.
    locks: Arc<Mutex<PollLocks>>,
}

impl FileLedger {
    /// Create a ledger rooted at `root`. The directory is created on first
    /// write. Every operation is bounded by `io_timeout`.
    pub fn new(root: impl Into<PathBuf>, io_timeout: Duration) -> Self {
        Self {
            root: root.into(),
            io_timeout,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The ledger directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where a poll's ledger is stored.
    pub fn ledger_path(&self, poll_id: &PollId) -> PathBuf {
        self.root.join(format!("{poll_id}.json"))
    }

    /// All votes for a poll in insertion order. Empty if never voted.
    pub async fn list_votes(&self, poll_id: &PollId) -> Result<Vec<Vote>, LedgerError> {
        self.bounded(self.read_ledger(poll_id)).await
    }

    /// The option `wallet` chose on this poll, if it has voted.
    pub async fn has_voted(
        &self,
        poll_id: &PollId,
        wallet: &WalletAddress,
    ) -> Result<Option<OptionId>, LedgerError> {
        let votes = self.list_votes(poll_id).await?;
        Ok(find_vote(&votes, wallet).map(|v| v.option_id.clone()))
    }

    /// Append a vote unless `wallet` already voted on this poll.
    ///
    /// The caller is responsible for checking that the poll exists and that
    /// `option_id` belongs to it.
    pub async fn record_vote(
        &self,
        poll_id: &PollId,
        option_id: &OptionId,
        wallet: &WalletAddress,
    ) -> Result<Recorded, LedgerError> {
        let lock = self.poll_lock(poll_id);
        self.bounded(async {
            let _guard = lock.lock().await;

            let mut votes = self.read_ledger(poll_id).await?;
            if let Some(existing) = find_vote(&votes, wallet) {
                return Err(LedgerError::AlreadyVoted {
                    poll_id: poll_id.clone(),
                    existing: existing.option_id.clone(),
                });
            }

            let vote = Vote::new(poll_id.clone(), option_id.clone(), wallet.clone());
            votes.push(vote.clone());
            self.write_ledger(poll_id, &votes).await?;

            tracing::debug!(
                poll_id = %poll_id,
                option_id = %option_id,
                total = votes.len(),
                "vote appended to ledger"
            );
            Ok(Recorded {
                vote,
                ledger: votes,
            })
        })
        .await
    }

    /// Whether the ledger directory exists, or could be created under an
    /// existing parent on first write. Touches nothing on disk.
    pub async fn is_available(&self) -> bool {
        let check = async {
            match tokio::fs::metadata(&self.root).await {
                Ok(meta) => meta.is_dir(),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    match self.root.parent().filter(|p| !p.as_os_str().is_empty()) {
                        Some(parent) => tokio::fs::metadata(parent)
                            .await
                            .is_ok_and(|meta| meta.is_dir()),
                        None => true,
                    }
                }
                Err(_) => false,
            }
        };
        tokio::time::timeout(self.io_timeout, check)
            .await
            .unwrap_or(false)
    }

    fn poll_lock(&self, poll_id: &PollId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(poll_id.clone()).or_default())
    }

    async fn bounded<T>(
        &self,
        op: impl std::future::Future<Output = Result<T, LedgerError>>,
    ) -> Result<T, LedgerError> {
        tokio::time::timeout(self.io_timeout, op)
            .await
            .map_err(|_| LedgerError::Timeout(self.io_timeout))?
    }

    async fn read_ledger(&self, poll_id: &PollId) -> Result<Vec<Vote>, LedgerError> {
        let bytes = match tokio::fs::read(self.ledger_path(poll_id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| LedgerError::Corrupt {
            poll_id: poll_id.clone(),
            reason: e.to_string(),
        })
    }

    async fn write_ledger(&self, poll_id: &PollId, votes: &[Vote]) -> Result<(), LedgerError> {
        let body = serde_json::to_vec_pretty(votes)
            .map_err(|e| LedgerError::Unavailable(format!("serialize ledger: {e}")))?;

        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.ledger_path(poll_id);
        let tmp = path.with_extension("json.tmp");

        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&body).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
