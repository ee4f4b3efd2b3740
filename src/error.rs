//! Error types, one per layer.
//!
//! - `UpstreamError`: what the reqwest client reports about the generation/upload service.
//!   Connection refusals are kept apart from other transport failures.
//! - `ApiError`: failure of an HTTP handler, mapped onto a status code and an `{error}` body.
//! - `FormError`: outcome of a form action; its `Display` is the banner shown to the user.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::protocol::ErrorOut;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The service could not be reached at all (refused, DNS, unroutable).
    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    /// Timeouts, broken bodies and other transport failures.
    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    /// Non-2xx answer. `detail` is the server-supplied explanation when present.
    #[error("HTTP {status}")]
    Status { status: u16, detail: Option<String> },

    #[error("invalid response body: {0}")]
    Decode(String),
}

impl UpstreamError {
    pub fn is_connect(&self) -> bool {
        matches!(self, UpstreamError::Connect(_))
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            UpstreamError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            UpstreamError::Connect(e)
        } else if e.is_decode() {
            UpstreamError::Decode(e.to_string())
        } else {
            UpstreamError::Transport(e)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!(target: "quizgen_backend", status = status.as_u16(), error = %self, "Request failed");
        (status, Json(ErrorOut { error: self.to_string() })).into_response()
    }
}

/// Failed form action. The message is already localized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// Rejected locally, no network call was made.
    #[error("{0}")]
    Validation(String),

    /// The service answered with a non-2xx status.
    #[error("{0}")]
    Upstream(String),

    /// The service answered 2xx but reported `success: false`.
    #[error("{0}")]
    Rejected(String),

    /// The service could not be reached.
    #[error("{0}")]
    Connection(String),

    #[error("{0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_the_code() {
        let e = UpstreamError::Status { status: 503, detail: Some("busy".into()) };
        assert_eq!(e.to_string(), "HTTP 503");
        assert_eq!(e.detail(), Some("busy"));
        assert!(!e.is_connect());
    }

    #[test]
    fn proxy_errors_map_to_status_codes() {
        assert_eq!(ApiError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Upstream("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn form_error_displays_the_banner() {
        let e = FormError::Validation("Пожалуйста, введите текст".into());
        assert_eq!(e.to_string(), "Пожалуйста, введите текст");
    }
}
