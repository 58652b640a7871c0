//! # Request Extraction & Validation
//!
//! Handlers take extractor results as `Result<_, Rejection>` and pass them
//! through these helpers, so a malformed body or query string gets the same
//! `INVALID_INPUT` envelope as any other bad input instead of axum's plain
//! text rejection.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::Json;

use crate::error::AppError;

/// Request types that check rules serde does not express.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON body or turn the rejection into [`AppError::InvalidInput`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match result {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Err(AppError::InvalidInput(
            "Expected a JSON body with Content-Type: application/json".into(),
        )),
        Err(JsonRejection::BytesRejection(_)) => Err(AppError::InvalidInput(format!(
            "Request body unreadable or larger than {} bytes",
            crate::MAX_BODY_BYTES
        ))),
        Err(other) => Err(AppError::InvalidInput(other.body_text())),
    }
}

/// [`extract_json`], then [`Validate::validate`].
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::InvalidInput)?;
    Ok(value)
}

/// Unwrap query parameters or turn the rejection into
/// [`AppError::InvalidInput`].
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::InvalidInput(err.body_text()))
}
