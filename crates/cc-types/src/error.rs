//! Public error taxonomy — one variant per §7 error kind.
//!
//! `ApiError` is the only error type that ever reaches a client; every
//! internal error type in the other crates converts into one of these at the
//! handler boundary.

use serde::Serialize;
use thiserror::Error;

/// The wire error shape: `{"error": "...", "code": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("request exceeded the server timeout")]
    RequestTimeout,

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    Unavailable(String),
}

impl ApiError {
    /// HTTP status code per §7's indicative mapping.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Authentication(_) => 401,
            ApiError::Authorization(_) => 403,
            ApiError::Validation(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::RateLimited(_) => 429,
            ApiError::RequestTimeout => 408,
            ApiError::Internal(_) => 500,
            ApiError::Unavailable(_) => 503,
        }
    }

    /// Stable machine-readable error code for the wire shape.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Authentication(_) => "AUTHENTICATION_ERROR",
            ApiError::Authorization(_) => "FORBIDDEN",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::RateLimited(_) => "RATE_LIMITED",
            ApiError::RequestTimeout => "REQUEST_TIMEOUT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Unavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        // Internal errors never leak detail to the caller (§7): the full
        // message is logged server-side by the handler, not returned here.
        let message = match self {
            ApiError::Internal(_) => "an internal error occurred".to_string(),
            other => other.to_string(),
        };
        ErrorBody {
            error: message,
            code: self.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_redact_message() {
        let err = ApiError::Internal("db handle poisoned by thread 7".to_string());
        let body = err.to_body();
        assert_eq!(body.error, "an internal error occurred");
        assert_eq!(body.code, "INTERNAL_ERROR");
    }

    #[test]
    fn validation_error_keeps_message() {
        let err = ApiError::Validation("stat budget must equal 100".to_string());
        let body = err.to_body();
        assert_eq!(body.error, "stat budget must equal 100");
        assert_eq!(err.status_code(), 400);
    }
}
