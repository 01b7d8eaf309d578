// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use revline_config::model::{RevlineConfig, ServerConfig};
use revline_core::{RateLimiter, RevlineError};
use revline_pipeline::{Analytics, BotHandler, JobRunner, LeadService, OperatorDirectory};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, require_admin_secret, require_cron_secret, require_session};
use crate::handlers;
use crate::locale::{LocalePolicy, get_locale, locale_middleware};
use crate::rate_limit::throttle;
use crate::telegram;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LeadService>,
    pub operators: OperatorDirectory,
    pub analytics: Analytics,
    pub jobs: JobRunner,
    /// `None` when no bot token is configured.
    pub bot: Option<Arc<BotHandler>>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub auth: AuthConfig,
    pub locale: Arc<LocalePolicy>,
    /// Mark the session cookie `Secure` (public URL is https).
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(
        config: &RevlineConfig,
        service: Arc<LeadService>,
        jobs: JobRunner,
        bot: Option<Arc<BotHandler>>,
        rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            operators: OperatorDirectory::new(service.storage().clone()),
            analytics: Analytics::new(service.storage().clone()),
            service,
            jobs,
            bot,
            rate_limiter,
            auth: AuthConfig::from_config(config),
            locale: Arc::new(LocalePolicy {
                blocked_countries: config.locale.blocked_countries.clone(),
            }),
            secure_cookies: config.server.public_url.starts_with("https://"),
        }
    }
}

/// Builds the full application router.
///
/// - POST /api/contact, /api/partnership (rate limited)
/// - /api/messages/** (admin session)
/// - GET /api/telegram/admins, /api/telegram/analytics (operator management secret)
/// - GET|POST /api/telegram/cron (cron secret)
/// - POST /api/telegram/webhook, /api/admin/auth, GET /api/locale, GET /health
pub fn router(state: AppState) -> Router {
    let intake = Router::new()
        .route("/api/contact", post(handlers::post_contact))
        .route("/api/partnership", post(handlers::post_partnership))
        .route_layer(axum_middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            throttle,
        ));

    let inbox = Router::new()
        .route("/api/messages", get(handlers::list_messages))
        .route(
            "/api/messages/{id}",
            get(handlers::get_message)
                .patch(handlers::patch_message)
                .delete(handlers::delete_message),
        )
        .route(
            "/api/messages/{id}/reply",
            get(handlers::list_replies).post(handlers::post_reply),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            require_session,
        ));

    let operators = Router::new()
        .route("/api/telegram/admins", get(telegram::get_admins))
        .route("/api/telegram/analytics", get(telegram::get_analytics))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            require_admin_secret,
        ));

    let cron = Router::new()
        .route(
            "/api/telegram/cron",
            get(telegram::run_cron).post(telegram::run_cron),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            require_cron_secret,
        ));

    let public = Router::new()
        .route("/api/telegram/webhook", post(telegram::post_webhook))
        .route(
            "/api/admin/auth",
            get(handlers::get_session)
                .post(handlers::post_login)
                .delete(handlers::delete_session),
        )
        .route("/api/locale", get(get_locale))
        .route("/health", get(handlers::get_health));

    Router::new()
        .merge(public)
        .merge(intake)
        .merge(inbox)
        .merge(operators)
        .merge(cron)
        .fallback(handlers::not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.locale.clone(),
            locale_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the listener and serves until `shutdown` is cancelled.
pub async fn serve(
    config: &ServerConfig,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), RevlineError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RevlineError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| RevlineError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway stopped");
    Ok(())
}
