//! # Poll Orchestration
//!
//! The two operations the HTTP surface exposes, independent of axum types:
//!
//! - [`fetch_poll_state`]: catalog → ledger → aggregation for one chapter.
//! - [`submit_vote`]: precondition checks in a fixed order, then an atomic
//!   ledger append, then aggregation over the updated ledger.
//!
//! ## Vote preconditions
//!
//! Checked in this order; the first failure is returned and nothing is
//! written:
//!
//! 1. `optionId` and `walletAddress` present and non-empty (`INVALID_INPUT`)
//! 2. poll exists; an unparseable poll id is treated as absent (`NOT_FOUND`)
//! 3. poll active (`POLL_INACTIVE`)
//! 4. option belongs to the poll (`INVALID_INPUT`)
//! 5. wallet is `0x` + 40 hex digits (`INVALID_INPUT`)
//! 6. book token held, for gated polls (`TOKEN_REQUIRED`)
//! 7. wallet has not voted (`ALREADY_VOTED`)
//!
//! Step 7 is checked again inside the ledger's atomic append, so two
//! concurrent submissions that both pass the early check still produce
//! exactly one vote.

use lokapal_core::{
    compute_results, find_vote, BookId, ChapterId, OptionId, Poll, PollId, PollResults, Vote,
    WalletAddress,
};

use crate::error::AppError;
use crate::state::AppState;

pub const MISSING_FIELDS: &str = "Missing required fields: optionId and walletAddress";
pub const POLL_NOT_FOUND: &str = "Poll not found";
pub const POLL_INACTIVE: &str = "This poll is no longer active";
pub const INVALID_OPTION: &str = "Invalid option ID";
pub const INVALID_WALLET: &str = "Invalid wallet address format";
pub const TOKEN_REQUIRED: &str = "Book Token required to vote";

/// A chapter's poll as seen by one (possibly anonymous) reader.
#[derive(Debug, Clone)]
pub struct PollState {
    pub poll: Poll,
    /// The reader's earlier choice, if they voted.
    pub user_vote: Option<OptionId>,
    /// Present only when the reader has voted.
    pub results: Option<PollResults>,
}

impl PollState {
    /// Whether the reader has voted on this poll.
    pub fn has_voted(&self) -> bool {
        self.user_vote.is_some()
    }
}

/// A recorded vote and the results including it.
#[derive(Debug, Clone)]
pub struct VoteOutcome {
    pub vote: Vote,
    pub results: PollResults,
}

/// Load a chapter's poll and the reader's voting state.
///
/// Returns `Ok(None)` when the chapter has no poll. Results are withheld
/// until `wallet` has voted, and the ledger is not read at all without a
/// wallet.
pub async fn fetch_poll_state(
    state: &AppState,
    book: &BookId,
    chapter: &ChapterId,
    wallet: Option<&WalletAddress>,
) -> Result<Option<PollState>, AppError> {
    let Some(poll) = state.catalog.poll_for_chapter(book, chapter).await? else {
        return Ok(None);
    };

    let Some(wallet) = wallet else {
        return Ok(Some(PollState {
            poll,
            user_vote: None,
            results: None,
        }));
    };

    let votes = state.votes.list_votes(&poll.id).await?;
    let user_vote = find_vote(&votes, wallet).map(|v| v.option_id.clone());
    let results = user_vote
        .as_ref()
        .map(|_| compute_results(&votes, &poll.options));

    Ok(Some(PollState {
        poll,
        user_vote,
        results,
    }))
}

/// Validate and record one vote.
pub async fn submit_vote(
    state: &AppState,
    raw_poll_id: &str,
    raw_option_id: &str,
    raw_wallet: &str,
) -> Result<VoteOutcome, AppError> {
    if raw_option_id.trim().is_empty() || raw_wallet.trim().is_empty() {
        return Err(AppError::InvalidInput(MISSING_FIELDS.into()));
    }

    let poll_id = PollId::parse(raw_poll_id)
        .map_err(|_| AppError::NotFound(POLL_NOT_FOUND.into()))?;
    let poll = state
        .catalog
        .poll_by_id(&poll_id)
        .await?
        .ok_or_else(|| AppError::NotFound(POLL_NOT_FOUND.into()))?;

    if !poll.active {
        return Err(AppError::PollInactive(POLL_INACTIVE.into()));
    }

    let option_id = poll
        .option(raw_option_id)
        .map(|o| o.id.clone())
        .ok_or_else(|| AppError::InvalidInput(INVALID_OPTION.into()))?;

    let wallet = WalletAddress::new(raw_wallet)
        .map_err(|_| AppError::InvalidInput(INVALID_WALLET.into()))?;

    check_token_gate(state, &poll, &wallet).await?;

    if let Some(existing) = state.votes.has_voted(&poll.id, &wallet).await? {
        return Err(AppError::AlreadyVoted {
            user_vote: existing.to_string(),
        });
    }

    let recorded = state.votes.record_vote(&poll.id, &option_id, &wallet).await?;
    let results = compute_results(&recorded.ledger, &poll.options);

    tracing::info!(
        poll_id = %poll.id,
        option_id = %option_id,
        wallet = %wallet,
        total_votes = results.total_votes,
        "vote recorded"
    );

    Ok(VoteOutcome {
        vote: recorded.vote,
        results,
    })
}

/// Enforce book token ownership for gated polls.
///
/// Without a chain reader the gate is advisory: the vote is accepted and a
/// warning logged, matching deployments that gate only in the client.
async fn check_token_gate(
    state: &AppState,
    poll: &Poll,
    wallet: &WalletAddress,
) -> Result<(), AppError> {
    if !poll.requires_token {
        return Ok(());
    }

    let Some(chain) = &state.chain else {
        tracing::warn!(
            poll_id = %poll.id,
            wallet = %wallet,
            "token-gated poll accepted without ownership check: no chain reader configured"
        );
        return Ok(());
    };

    let token_id = poll.book_id.token_id().ok_or_else(|| {
        AppError::CorruptData(format!(
            "gated poll {} belongs to book {} which has no token id",
            poll.id, poll.book_id
        ))
    })?;

    if chain.owns_book_token(wallet, token_id).await? {
        Ok(())
    } else {
        tracing::info!(poll_id = %poll.id, wallet = %wallet, token_id, "vote refused: no book token");
        Err(AppError::TokenRequired(TOKEN_REQUIRED.into()))
    }
}
