// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram-facing endpoints: the bot webhook, operator management, analytics
//! and the scheduled job trigger.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use revline_core::RevlineError;
use revline_pipeline::{
    AdminOutcome, AdminRequest, AnalyticsQuery, AnalyticsReport, CronReport, CronTask,
};
use revline_telegram::parse_update;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::server::AppState;

/// POST /api/telegram/webhook
///
/// Every update that passes the secret check is acknowledged with 200,
/// including malformed ones and ones whose handling failed.
pub async fn post_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !state.auth.webhook_allowed(&headers) {
        tracing::warn!("webhook call with invalid secret token");
        return ApiError(RevlineError::Unauthorized).into_response();
    }

    match parse_update(&body) {
        None => tracing::warn!(bytes = body.len(), "malformed webhook update ignored"),
        Some(update) => {
            let update_id = update.update_id;
            match (update.into_event(), &state.bot) {
                (Some(event), Some(bot)) => {
                    if let Err(e) = bot.handle(event).await {
                        tracing::error!(update_id, error = %e, "webhook update failed");
                    }
                }
                (Some(_), None) => {
                    tracing::debug!(update_id, "webhook update ignored: Telegram is not configured");
                }
                (None, _) => tracing::debug!(update_id, "webhook update has nothing to act on"),
            }
        }
    }

    Json(json!({ "ok": true })).into_response()
}

/// GET /api/telegram/admins
pub async fn get_admins(
    State(state): State<AppState>,
    Query(request): Query<AdminRequest>,
) -> ApiResult<Json<AdminOutcome>> {
    Ok(Json(state.operators.handle(&request).await?))
}

/// GET /api/telegram/analytics?period=day|week|month|all&type=basic|conversion|activity|response|sources|full
pub async fn get_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Json<AnalyticsReport>> {
    let (kind, period) = query.parse()?;
    Ok(Json(
        state.analytics.report(kind, period, chrono::Utc::now()).await?,
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct CronQuery {
    pub task: Option<String>,
}

/// GET|POST /api/telegram/cron
pub async fn run_cron(
    State(state): State<AppState>,
    Query(query): Query<CronQuery>,
) -> ApiResult<Json<CronReport>> {
    let task = CronTask::parse(query.task.as_deref())?;
    let report = state.jobs.run(task, chrono::Utc::now()).await?;
    tracing::info!(%task, "scheduled task finished");
    Ok(Json(report))
}
