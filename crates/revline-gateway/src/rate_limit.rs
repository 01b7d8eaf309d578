// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intake throttling middleware.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use revline_core::{RateLimiter, RevlineError};

use crate::error::ApiError;

/// Key used when the caller address is unknown.
pub const LOCAL_KEY: &str = "local";

/// First `X-Forwarded-For` entry, or [`LOCAL_KEY`].
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or(LOCAL_KEY)
        .to_string()
}

/// Rejects callers over their window with 429.
///
/// A limiter failure lets the request through; the intake handler will
/// surface any real storage outage itself.
pub async fn throttle(
    State(limiter): State<Arc<dyn RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(request.headers());
    let now_ms = chrono::Utc::now().timestamp_millis();

    match limiter.hit(&key, now_ms).await {
        Ok(decision) if !decision.allowed => {
            tracing::info!(client = %key, "intake request throttled");
            let mut response = ApiError(RevlineError::RateLimited).into_response();
            let retry_after = decision.reset_after_ms.div_ceil(1000).max(1);
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
        Ok(_) => next.run(request).await,
        Err(e) => {
            tracing::warn!(client = %key, error = %e, "rate limiter unavailable");
            next.run(request).await
        }
    }
}
