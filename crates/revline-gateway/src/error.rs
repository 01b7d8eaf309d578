// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps [`RevlineError`] onto HTTP responses.
//!
//! Client errors carry their message; server-side failures are logged and
//! answered with a generic body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use revline_core::RevlineError;
use serde::Serialize;

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Wrapper so handlers can return `Result<_, ApiError>` and use `?`.
#[derive(Debug)]
pub struct ApiError(pub RevlineError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<RevlineError> for ApiError {
    fn from(err: RevlineError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RevlineError::Validation(_) => StatusCode::BAD_REQUEST,
            RevlineError::NotFound { .. } => StatusCode::NOT_FOUND,
            RevlineError::Unauthorized => StatusCode::UNAUTHORIZED,
            RevlineError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            RevlineError::Validation(message) => message.clone(),
            RevlineError::NotFound { entity, .. } => format!("{entity} not found"),
            RevlineError::Unauthorized => "Unauthorized".to_string(),
            RevlineError::RateLimited => "Rate limited".to_string(),
            other => {
                tracing::error!(error = %other, "request failed");
                "Internal server error".to_string()
            }
        };
        error_response(status, message)
    }
}

/// `{ "error": message }` with the given status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}
