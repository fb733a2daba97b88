use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failure taxonomy of the persistence gateway. Both store variants map their
/// native failures onto these four cases so callers stay backend-agnostic.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness or range invariant was violated. Surfaced to the caller as
    /// a rejected request; never retried automatically.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A referenced user or medication does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backing medium (file or network) is unreachable. Surfaced, never
    /// swallowed into empty results.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::ConstraintViolation(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_check_violation() => {
                StoreError::ConstraintViolation(db.message().to_string())
            }
            sqlx::Error::RowNotFound => StoreError::NotFound("row not found".into()),
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Unavailable(e.to_string())
            }
            _ => StoreError::Other(e.into()),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            StoreError::Unavailable(e.to_string())
        } else {
            StoreError::Other(e.into())
        }
    }
}

/// HTTP-facing error so handlers can `?` a `StoreError` straight out.
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Store(StoreError::ConstraintViolation(msg)) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::Store(StoreError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg),
            ApiError::Store(StoreError::Unavailable(msg)) => {
                error!(error = %msg, "store unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, "store unavailable".to_string())
            }
            ApiError::Store(StoreError::Other(e)) => {
                error!(error = %e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_violation_maps_to_bad_request() {
        let resp =
            ApiError::from(StoreError::ConstraintViolation("severity out of range".into()))
                .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let resp = ApiError::from(StoreError::NotFound("medication".into())).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unavailable_maps_to_503() {
        let resp =
            ApiError::from(StoreError::Unavailable("connection refused".into())).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let resp = ApiError::unauthorized("Invalid email or password").into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
