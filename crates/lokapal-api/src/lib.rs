//! # lokapal-api — HTTP Service for Chapter Polls
//!
//! Serves reader polls attached to book chapters and records one vote per
//! wallet per poll.
//!
//! ## API Surface
//!
//! | Path | Module | Purpose |
//! |------|--------|---------|
//! | `GET /api/books/:book_id/chapters/:chapter_id/poll` | [`routes::polls`] | poll + reader state |
//! | `POST /api/polls/:poll_id/vote` | [`routes::polls`] | submit a vote |
//! | `GET /metrics` | [`middleware::metrics`] | JSON counters |
//! | `GET /openapi.json` | [`openapi`] | OpenAPI document |
//! | `GET /health/*` | here | liveness / readiness |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → CorsLayer → BodyLimit → Handler
//! ```

pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod orchestration;
pub mod routes;
pub mod state;
pub mod store;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, Method, StatusCode};
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::MetricsSnapshot;
use crate::state::AppState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes are mounted outside the metrics middleware so that
/// orchestrator polling does not inflate the request counters.
pub fn app(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let api = Router::new()
        .merge(routes::polls::router())
        .merge(openapi::router())
        .route("/metrics", get(metrics_json))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(metrics));

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api).with_state(state)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — 200 when the content root is readable and the vote
/// ledger answers, 503 otherwise.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let (content, votes) = tokio::join!(state.catalog.is_available(), state.votes.is_available());
    if content && votes {
        (StatusCode::OK, "ready")
    } else {
        tracing::warn!(content, votes, backend = state.votes.backend(), "not ready");
        (StatusCode::SERVICE_UNAVAILABLE, "not ready")
    }
}

/// GET /metrics — Current request and vote counters.
async fn metrics_json(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
