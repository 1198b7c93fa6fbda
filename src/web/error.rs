//! HTTP error responses.
//!
//! Terminal failures are returned as JSON with a stable `code`. Internal
//! errors are logged server-side and answered with a generic message.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

/// A request that cannot be answered with a page.
#[derive(Debug)]
pub enum WebError {
    /// Signed in with the wrong role
    Forbidden,
    /// Unknown record or user
    NotFound(String),
    /// Anything else; details stay in the logs
    Internal(Error),
}

impl From<Error> for WebError {
    fn from(err: Error) -> Self {
        if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else {
            Self::Internal(err)
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "forbidden",
                    message: "You do not have permission to access this page.".to_string(),
                },
            ),
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "not_found",
                    message,
                },
            ),
            Self::Internal(err) => {
                error!(error = %err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "internal",
                        message: "Internal server error".to_string(),
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Handler result type
pub type WebResult<T> = std::result::Result<T, WebError>;
