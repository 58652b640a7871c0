//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into one OpenAPI document served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the poll API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lokapal Chapter Polls API",
        version = "0.1.0",
        description = "Reader polls attached to chapters: poll state, one vote per wallet, optional book token gating.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::polls::get_chapter_poll,
        crate::routes::polls::submit_vote,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::polls::VoteRequest,
        crate::routes::polls::VoteResponse,
        crate::routes::polls::PollView,
        crate::routes::polls::PollOptionView,
        crate::routes::polls::OptionResultView,
        crate::routes::polls::PollStateResponse,
        crate::routes::polls::NoPollResponse,
        crate::routes::polls::ChapterPollResponse,
        crate::middleware::metrics::MetricsSnapshot,
    )),
    tags(
        (name = "polls", description = "Chapter polls and voting"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
