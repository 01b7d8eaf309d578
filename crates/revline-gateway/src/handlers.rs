// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP handlers for intake, the admin inbox, admin login and health.

use std::str::FromStr;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use revline_core::types::{LeadDetail, LeadFilter, Reply, ReplyChannel};
use revline_core::{HealthStatus, Lead, LeadCategory, RevlineError};
use revline_pipeline::service::parse_status;
use revline_pipeline::{ContactForm, LeadPage, PartnershipForm, Submission};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::SESSION_COOKIE;
use crate::error::{ApiError, ApiResult, error_response};
use crate::server::AppState;

/// Unwraps a JSON body, turning any extractor rejection into a 400.
fn json_body<T: DeserializeOwned>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value).map_err(|e| {
        tracing::debug!(error = %e, "request body rejected");
        ApiError(RevlineError::Validation("Invalid request body".into()))
    })
}

/// Body of a successful intake response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub ok: bool,
    pub message_id: String,
}

impl From<Submission> for SubmissionResponse {
    // Deliveries keep running after the handle is dropped.
    fn from(submission: Submission) -> Self {
        let Submission { lead, .. } = submission;
        Self {
            ok: true,
            message_id: lead.id,
        }
    }
}

/// POST /api/contact
pub async fn post_contact(
    State(state): State<AppState>,
    body: Result<Json<ContactForm>, JsonRejection>,
) -> ApiResult<Json<SubmissionResponse>> {
    let form = json_body(body)?;
    let submission = state.service.submit_contact(form).await?;
    Ok(Json(submission.into()))
}

/// POST /api/partnership
pub async fn post_partnership(
    State(state): State<AppState>,
    body: Result<Json<PartnershipForm>, JsonRejection>,
) -> ApiResult<Json<SubmissionResponse>> {
    let form = json_body(body)?;
    let submission = state.service.submit_partnership(form).await?;
    Ok(Json(submission.into()))
}

/// Query string of `GET /api/messages`. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_count(raw: Option<&str>, field: &str) -> Result<Option<u32>, RevlineError> {
    present(raw)
        .map(|v| {
            v.parse::<u32>()
                .map_err(|_| RevlineError::Validation(format!("Invalid {field}")))
        })
        .transpose()
}

impl ListQuery {
    pub fn to_filter(&self) -> Result<LeadFilter, RevlineError> {
        let status = present(self.status.as_deref()).map(parse_status).transpose()?;
        let category = present(self.category.as_deref())
            .map(|c| {
                LeadCategory::from_str(c)
                    .map_err(|_| RevlineError::Validation("Invalid category".into()))
            })
            .transpose()?;
        Ok(LeadFilter {
            status,
            category,
            limit: parse_count(self.limit.as_deref(), "limit")?,
            offset: parse_count(self.offset.as_deref(), "offset")?,
        })
    }
}

/// GET /api/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<LeadPage>> {
    let filter = query.to_filter()?;
    Ok(Json(state.service.list(&filter).await?))
}

/// GET /api/messages/{id}
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<LeadDetail>> {
    Ok(Json(state.service.detail(&id).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

/// PATCH /api/messages/{id}
pub async fn patch_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<StatusUpdate>, JsonRejection>,
) -> ApiResult<Json<Lead>> {
    let update = json_body(body)?;
    let Some(raw) = present(update.status.as_deref()) else {
        return Err(RevlineError::Validation("Status is required".into()).into());
    };
    let status = parse_status(raw)?;
    Ok(Json(state.service.set_status(&id, status).await?))
}

/// DELETE /api/messages/{id}
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.service.delete(&id).await?;
    Ok(Json(json!({ "ok": true })))
}

/// A reply as shown in the inbox.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyView {
    pub id: String,
    pub content: String,
    pub sent_at: String,
    pub sent_via: ReplyChannel,
}

impl From<Reply> for ReplyView {
    fn from(reply: Reply) -> Self {
        Self {
            id: reply.id,
            content: reply.content,
            sent_at: reply.created_at,
            sent_via: reply.sent_via,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub content: Option<String>,
    #[serde(default)]
    pub send_to_telegram: bool,
}

#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub ok: bool,
    pub reply: ReplyView,
    pub forwarded: bool,
}

/// POST /api/messages/{id}/reply
pub async fn post_reply(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ReplyRequest>, JsonRejection>,
) -> ApiResult<Json<ReplyResponse>> {
    let request = json_body(body)?;
    let outcome = state
        .service
        .reply(
            &id,
            request.content.as_deref().unwrap_or_default(),
            request.send_to_telegram,
        )
        .await?;
    Ok(Json(ReplyResponse {
        ok: true,
        reply: outcome.reply.into(),
        forwarded: outcome.forwarded,
    }))
}

#[derive(Debug, Serialize)]
pub struct RepliesResponse {
    pub replies: Vec<ReplyView>,
}

/// GET /api/messages/{id}/reply
pub async fn list_replies(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RepliesResponse>> {
    let replies = state.service.replies(&id).await?;
    Ok(Json(RepliesResponse {
        replies: replies.into_iter().map(ReplyView::from).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

/// POST /api/admin/auth
pub async fn post_login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let request = json_body(body)?;
    let password = request.password.unwrap_or_default();

    if !state.auth.password_matches(&password) {
        if state.auth.admin_password.is_none() {
            tracing::warn!("admin login attempted but no admin password is configured");
        } else {
            tracing::info!("admin login rejected");
        }
        return Ok(error_response(StatusCode::UNAUTHORIZED, "Invalid password"));
    }

    let Some(signer) = &state.auth.sessions else {
        return Err(RevlineError::Config("security.session_secret is not set".into()).into());
    };
    let token = signer
        .issue(chrono::Utc::now().timestamp_millis())
        .ok_or_else(|| RevlineError::Internal("failed to sign session token".into()))?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.secure_cookies)
        .max_age(time::Duration::seconds(signer.ttl_secs()))
        .build();

    tracing::info!("admin session issued");
    Ok((jar.add(cookie), Json(json!({ "success": true }))).into_response())
}

/// GET /api/admin/auth
pub async fn get_session(State(state): State<AppState>, headers: HeaderMap) -> Json<serde_json::Value> {
    let now_ms = chrono::Utc::now().timestamp_millis();
    Json(json!({ "authenticated": state.auth.has_session(&headers, now_ms) }))
}

/// DELETE /api/admin/auth
pub async fn delete_session(jar: CookieJar) -> impl IntoResponse {
    let expired = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .build();
    (jar.add(expired), Json(json!({ "success": true })))
}

/// GET /health
pub async fn get_health(State(state): State<AppState>) -> Response {
    let version = env!("CARGO_PKG_VERSION");
    match state.service.storage().health_check().await {
        Ok(HealthStatus::Healthy) => {
            Json(json!({ "status": "healthy", "version": version })).into_response()
        }
        Ok(HealthStatus::Degraded(detail)) => {
            Json(json!({ "status": "degraded", "detail": detail, "version": version }))
                .into_response()
        }
        Ok(HealthStatus::Unhealthy(detail)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unhealthy", "detail": detail, "version": version })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "storage health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "version": version })),
            )
                .into_response()
        }
    }
}

/// Fallback for paths no route claims.
pub async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}
