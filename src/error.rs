use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failure of a call to the external movie metadata provider
///
/// A missing resource is never reported here: by-id lookups answer `Ok(None)`
/// and list queries answer an empty list.
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("Movie provider rate limit exceeded")]
    RateLimited,

    #[error("Movie provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// True when the provider asked us to slow down; a later attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::RateLimited)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Unavailable(err.to_string())
    }
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Database(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Provider(ref err) if err.is_retryable() => {
                (StatusCode::TOO_MANY_REQUESTS, self.to_string())
            }
            AppError::Provider(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_is_retryable() {
        assert!(ProviderError::RateLimited.is_retryable());
        assert!(!ProviderError::Unavailable("boom".to_string()).is_retryable());
    }

    #[test]
    fn test_status_mapping() {
        let cases = vec![
            (AppError::NotFound("film".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidInput("q".into()), StatusCode::BAD_REQUEST),
            (AppError::Conflict("dup".into()), StatusCode::CONFLICT),
            (AppError::Unauthorized("token".into()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("member".into()), StatusCode::FORBIDDEN),
            (
                AppError::Provider(ProviderError::RateLimited),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                AppError::Provider(ProviderError::Unavailable("down".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Internal("oops".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
