//! Error types for the REST API layer.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can
//! be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.
//! Validation failures carry the per-field detail; storage failures are
//! logged and reported opaquely.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crediario_db::{DbError, TrackError};

/// Errors that can occur in the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A request entity violated its declared constraints.
    #[error("validation failed")]
    Validation(#[from] validator::ValidationErrors),

    /// A change-tracking operation was misused.
    #[error("tracking conflict: {0}")]
    Tracking(#[from] TrackError),

    /// The request body could not be interpreted.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The persistence layer failed.
    #[error("storage error: {0}")]
    Store(DbError),
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        // Pre-statement rejections keep their client-facing status
        // instead of collapsing into an opaque 500.
        match e {
            DbError::Validation(errors) => Self::Validation(errors),
            DbError::Tracking(tracking) => Self::Tracking(tracking),
            other => Self::Store(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({
                    "error": msg,
                    "status": StatusCode::NOT_FOUND.as_u16(),
                }),
            ),
            Self::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({
                    "error": "validation failed",
                    "status": StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
                    "fields": errors,
                }),
            ),
            Self::Tracking(e) => (
                StatusCode::CONFLICT,
                serde_json::json!({
                    "error": e.to_string(),
                    "status": StatusCode::CONFLICT.as_u16(),
                }),
            ),
            Self::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": msg,
                    "status": StatusCode::BAD_REQUEST.as_u16(),
                }),
            ),
            Self::Store(e) => {
                tracing::error!(error = %e, "storage failure surfaced to the API");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({
                        "error": "internal storage error",
                        "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_detail_is_not_leaked_to_clients() {
        let err = ApiError::Store(DbError::Sql(sqlx::Error::PoolTimedOut));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn db_validation_maps_to_unprocessable_entity() {
        let err: ApiError = DbError::Validation(validator::ValidationErrors::new()).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn tracking_conflict_maps_to_conflict() {
        let err: ApiError = DbError::Tracking(TrackError::AlreadyTracked {
            kind: "cliente",
            id: 1,
        })
        .into();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}
