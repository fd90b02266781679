use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Typed failure surface of the account service. Each variant maps to
/// exactly one HTTP status; internal details stay in the logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("email and password are required")]
    MissingField,
    #[error("user already registered")]
    AlreadyExists,
    #[error("user not found")]
    NotFound,
    #[error("invalid credentials")]
    InvalidCredential,
    #[error("invalid or expired token")]
    Unauthorized,
    #[error("user store unavailable")]
    StoreUnavailable,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField | ApiError::AlreadyExists => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidCredential | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "request failed");
                "something went wrong".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            // The unique constraint on email resolves the registration race:
            // the losing insert surfaces as AlreadyExists, not a 500.
            sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::AlreadyExists,
            sqlx::Error::PoolTimedOut => ApiError::StoreUnavailable,
            other => ApiError::Internal(other.into()),
        }
    }
}
