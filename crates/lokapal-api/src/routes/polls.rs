//! # Chapter Poll Endpoints
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET` | `/api/books/:book_id/chapters/:chapter_id/poll` | `get_chapter_poll` |
//! | `POST` | `/api/polls/:poll_id/vote` | `submit_vote` |
//!
//! Response field names are camelCase to match the site's existing client.

use std::collections::BTreeMap;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use lokapal_core::{BookId, ChapterId, Poll, PollResults, WalletAddress};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;
use crate::extractors::{extract_query, extract_validated_json, Validate};
use crate::orchestration::{self, PollState, VoteOutcome, MISSING_FIELDS};
use crate::state::AppState;

const NO_POLL_MESSAGE: &str = "No poll available for this chapter";
const VOTE_RECORDED: &str = "Vote recorded successfully";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for the poll state endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PollQuery {
    /// Reader's wallet. When given and the wallet has voted, results are
    /// included.
    pub wallet: Option<String>,
}

/// Vote submission body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    /// One of the poll's option ids.
    pub option_id: Option<String>,
    /// `0x` followed by 40 hex digits, any case.
    pub wallet_address: Option<String>,
}

impl Validate for VoteRequest {
    fn validate(&self) -> Result<(), String> {
        let present = |f: &Option<String>| f.as_deref().is_some_and(|s| !s.trim().is_empty());
        if present(&self.option_id) && present(&self.wallet_address) {
            Ok(())
        } else {
            Err(MISSING_FIELDS.to_string())
        }
    }
}

/// One answer option.
#[derive(Debug, Serialize, ToSchema)]
pub struct PollOptionView {
    pub id: String,
    /// Label per locale.
    pub text: BTreeMap<String, String>,
}

/// Poll definition as served to readers.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PollView {
    pub id: String,
    pub book_id: String,
    pub chapter_id: String,
    pub requires_book_token: bool,
    /// conflict, philosophical, guardian-affinity or worldbuilding.
    pub poll_type: String,
    /// Question per locale.
    pub question: BTreeMap<String, String>,
    pub options: Vec<PollOptionView>,
    pub active: bool,
}

impl From<&Poll> for PollView {
    fn from(poll: &Poll) -> Self {
        Self {
            id: poll.id.to_string(),
            book_id: poll.book_id.to_string(),
            chapter_id: poll.chapter_id.to_string(),
            requires_book_token: poll.requires_token,
            poll_type: poll.category.to_string(),
            question: poll.question.as_map().clone(),
            options: poll
                .options
                .iter()
                .map(|o| PollOptionView {
                    id: o.id.to_string(),
                    text: o.text.as_map().clone(),
                })
                .collect(),
            active: poll.active,
        }
    }
}

/// Count and share for one option.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionResultView {
    pub option_id: String,
    pub count: u64,
    /// Share of all counted votes, one decimal place.
    pub percentage: f64,
}

fn result_views(results: &PollResults) -> Vec<OptionResultView> {
    results
        .options
        .iter()
        .map(|t| OptionResultView {
            option_id: t.option_id.to_string(),
            count: t.count,
            percentage: t.percentage,
        })
        .collect()
}

/// A chapter's poll with the reader's voting state.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PollStateResponse {
    pub poll: PollView,
    pub has_voted: bool,
    pub user_vote: Option<String>,
    /// Null until the reader has voted.
    pub results: Option<Vec<OptionResultView>>,
    /// Null until the reader has voted.
    pub total_votes: Option<u64>,
}

impl From<PollState> for PollStateResponse {
    fn from(state: PollState) -> Self {
        Self {
            poll: PollView::from(&state.poll),
            has_voted: state.has_voted(),
            user_vote: state.user_vote.map(String::from),
            results: state.results.as_ref().map(result_views),
            total_votes: state.results.as_ref().map(|r| r.total_votes),
        }
    }
}

/// Returned when the chapter has no poll.
#[derive(Debug, Serialize, ToSchema)]
pub struct NoPollResponse {
    /// Always null.
    #[schema(value_type = Option<Object>)]
    pub poll: Option<()>,
    pub message: String,
}

/// Body of `GET .../poll`: the poll state, or a null poll with a message.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ChapterPollResponse {
    Found(PollStateResponse),
    Missing(NoPollResponse),
}

/// Successful vote submission.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<OptionResultView>,
    pub total_votes: u64,
    pub user_vote: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the poll router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/books/:book_id/chapters/:chapter_id/poll",
            get(get_chapter_poll),
        )
        .route("/api/polls/:poll_id/vote", post(submit_vote))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/books/:book_id/chapters/:chapter_id/poll — Poll and reader state.
#[utoipa::path(
    get,
    path = "/api/books/{book_id}/chapters/{chapter_id}/poll",
    params(
        ("book_id" = String, Path, description = "Book identifier, e.g. book-0"),
        ("chapter_id" = String, Path, description = "Chapter identifier, e.g. shard-3"),
        PollQuery,
    ),
    responses(
        (status = 200, description = "Poll state, or a null poll when the chapter has none", body = ChapterPollResponse),
        (status = 400, description = "Malformed identifier or wallet", body = crate::error::ErrorBody),
        (status = 500, description = "Poll definition is corrupt", body = crate::error::ErrorBody),
        (status = 503, description = "Storage unavailable", body = crate::error::ErrorBody),
    ),
    tag = "polls"
)]
pub(crate) async fn get_chapter_poll(
    State(state): State<AppState>,
    Path((book_id, chapter_id)): Path<(String, String)>,
    query: Result<Query<PollQuery>, QueryRejection>,
) -> Result<Json<ChapterPollResponse>, AppError> {
    let query = extract_query(query)?;
    let book = BookId::new(book_id)?;
    let chapter = ChapterId::new(chapter_id)?;
    let wallet = query
        .wallet
        .filter(|w| !w.is_empty())
        .map(WalletAddress::new)
        .transpose()?;

    let response = match orchestration::fetch_poll_state(&state, &book, &chapter, wallet.as_ref())
        .await?
    {
        Some(found) => ChapterPollResponse::Found(found.into()),
        None => ChapterPollResponse::Missing(NoPollResponse {
            poll: None,
            message: NO_POLL_MESSAGE.to_string(),
        }),
    };
    Ok(Json(response))
}

/// POST /api/polls/:poll_id/vote — Record a reader's vote.
#[utoipa::path(
    post,
    path = "/api/polls/{poll_id}/vote",
    params(("poll_id" = String, Path, description = "poll_<bookId>_<chapterId>")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote recorded", body = VoteResponse),
        (status = 400, description = "Invalid input or inactive poll", body = crate::error::ErrorBody),
        (status = 403, description = "Book token required", body = crate::error::ErrorBody),
        (status = 404, description = "Poll not found", body = crate::error::ErrorBody),
        (status = 409, description = "Wallet already voted", body = crate::error::ErrorBody),
        (status = 503, description = "Storage unavailable", body = crate::error::ErrorBody),
    ),
    tag = "polls"
)]
pub(crate) async fn submit_vote(
    State(state): State<AppState>,
    Path(poll_id): Path<String>,
    body: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<VoteResponse>, AppError> {
    match vote(&state, &poll_id, body).await {
        Ok(outcome) => {
            state.metrics.record_vote();
            Ok(Json(VoteResponse {
                success: true,
                message: VOTE_RECORDED.to_string(),
                results: result_views(&outcome.results),
                total_votes: outcome.results.total_votes,
                user_vote: outcome.vote.option_id.to_string(),
            }))
        }
        Err(err) => {
            if err.is_rejection() {
                state.metrics.reject_vote();
            }
            Err(err)
        }
    }
}

async fn vote(
    state: &AppState,
    poll_id: &str,
    body: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<VoteOutcome, AppError> {
    let req = extract_validated_json(body)?;
    let option_id = req.option_id.unwrap_or_default();
    let wallet = req.wallet_address.unwrap_or_default();
    orchestration::submit_vote(state, poll_id, &option_id, &wallet).await
}
