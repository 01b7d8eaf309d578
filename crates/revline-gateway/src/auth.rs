// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication middleware for the gateway.
//!
//! Three guards exist:
//! 1. admin session (cookie or `Authorization: Bearer <token>`) for the inbox API;
//! 2. the operator management shared secret;
//! 3. the cron shared secret.
//!
//! Shared secrets are read from `?secret=` or a bearer header. An unset
//! secret rejects every request (fail-closed).

use axum::extract::{Query, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use revline_config::model::RevlineConfig;
use revline_core::RevlineError;
use serde::Deserialize;

use crate::error::ApiError;
use crate::session::{SessionSigner, secrets_match};

/// Name of the admin session cookie.
pub const SESSION_COOKIE: &str = "revline-admin-session";

/// Secrets and signing key guarding the admin surfaces.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Inbox login password. `None` disables login.
    pub admin_password: Option<String>,
    /// Session signer. `None` means no session can ever be valid.
    pub sessions: Option<SessionSigner>,
    /// Operator management secret.
    pub admin_api_secret: Option<String>,
    /// Scheduled job trigger secret.
    pub cron_secret: Option<String>,
    /// Expected `X-Telegram-Bot-Api-Secret-Token`; `None` skips the check.
    pub webhook_secret: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |s: &Option<String>| s.as_ref().map(|_| "[redacted]");
        f.debug_struct("AuthConfig")
            .field("admin_password", &redact(&self.admin_password))
            .field("sessions", &self.sessions)
            .field("admin_api_secret", &redact(&self.admin_api_secret))
            .field("cron_secret", &redact(&self.cron_secret))
            .field("webhook_secret", &redact(&self.webhook_secret))
            .finish()
    }
}

impl AuthConfig {
    pub fn from_config(config: &RevlineConfig) -> Self {
        let security = &config.security;
        Self {
            admin_password: security.admin_password.clone(),
            sessions: security
                .session_secret
                .as_deref()
                .map(|secret| SessionSigner::new(secret, security.session_ttl_secs)),
            admin_api_secret: security.admin_api_secret.clone(),
            cron_secret: security.cron_secret.clone(),
            webhook_secret: config.telegram.webhook_secret.clone(),
        }
    }

    /// Constant-time password check; always false when login is disabled.
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.admin_password
            .as_deref()
            .is_some_and(|expected| secrets_match(candidate, expected))
    }

    /// Whether the request carries a valid session token.
    pub fn has_session(&self, headers: &HeaderMap, now_ms: i64) -> bool {
        let Some(signer) = &self.sessions else {
            return false;
        };
        let jar = CookieJar::from_headers(headers);
        let cookie = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
        cookie
            .as_deref()
            .into_iter()
            .chain(bearer_token(headers))
            .any(|token| signer.verify(token, now_ms))
    }

    /// Webhook header check. Passes when no webhook secret is configured.
    pub fn webhook_allowed(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.webhook_secret.as_deref() else {
            return true;
        };
        headers
            .get("x-telegram-bot-api-secret-token")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|provided| secrets_match(provided, expected))
    }
}

/// Token from an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[derive(Debug, Deserialize)]
struct SecretQuery {
    secret: Option<String>,
}

fn shared_secret_ok(expected: Option<&str>, request: &Request, guard: &'static str) -> bool {
    let Some(expected) = expected else {
        tracing::error!(guard, "no shared secret configured, rejecting request");
        return false;
    };
    let from_query = Query::<SecretQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(q)| q.secret);
    let ok = from_query
        .as_deref()
        .into_iter()
        .chain(bearer_token(request.headers()))
        .any(|provided| secrets_match(provided, expected));
    if !ok {
        tracing::warn!(guard, "shared secret rejected");
    }
    ok
}

fn unauthorized() -> Response {
    ApiError(RevlineError::Unauthorized).into_response()
}

/// Guards the inbox API with an admin session.
pub async fn require_session(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Response {
    let now_ms = chrono::Utc::now().timestamp_millis();
    if auth.has_session(request.headers(), now_ms) {
        next.run(request).await
    } else {
        unauthorized()
    }
}

/// Guards operator management with `security.admin_api_secret`.
pub async fn require_admin_secret(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Response {
    if shared_secret_ok(auth.admin_api_secret.as_deref(), &request, "admin_api") {
        next.run(request).await
    } else {
        unauthorized()
    }
}

/// Guards the job trigger with `security.cron_secret`.
pub async fn require_cron_secret(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Response {
    if shared_secret_ok(auth.cron_secret.as_deref(), &request, "cron") {
        next.run(request).await
    } else {
        unauthorized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const KEY: &str = "0123456789abcdef0123456789abcdef";
    const NOW: i64 = 1_760_000_000_000;

    fn config() -> AuthConfig {
        AuthConfig {
            admin_password: Some("hunter2".into()),
            sessions: Some(SessionSigner::new(KEY, 3600)),
            admin_api_secret: Some("admin-secret".into()),
            cron_secret: Some("cron-secret".into()),
            webhook_secret: None,
        }
    }

    fn headers(name: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn debug_redacts_secrets() {
        let debug = format!("{:?}", config());
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("cron-secret"));
        assert!(debug.contains("[redacted]"));
    }

    #[test]
    fn password_check() {
        assert!(config().password_matches("hunter2"));
        assert!(!config().password_matches("hunter3"));
        assert!(!AuthConfig::default().password_matches(""));
    }

    #[test]
    fn session_from_cookie_or_bearer() {
        let auth = config();
        let token = auth.sessions.as_ref().unwrap().issue(NOW).unwrap();

        let cookie = headers("cookie", &format!("{SESSION_COOKIE}={token}"));
        assert!(auth.has_session(&cookie, NOW));

        let bearer = headers("authorization", &format!("Bearer {token}"));
        assert!(auth.has_session(&bearer, NOW));

        assert!(!auth.has_session(&HeaderMap::new(), NOW));
        assert!(!AuthConfig::default().has_session(&bearer, NOW));
    }

    #[test]
    fn webhook_secret_is_optional() {
        assert!(config().webhook_allowed(&HeaderMap::new()));

        let auth = AuthConfig {
            webhook_secret: Some("hook".into()),
            ..config()
        };
        assert!(!auth.webhook_allowed(&HeaderMap::new()));
        assert!(!auth.webhook_allowed(&headers("x-telegram-bot-api-secret-token", "nope")));
        assert!(auth.webhook_allowed(&headers("x-telegram-bot-api-secret-token", "hook")));
    }

    #[test]
    fn bearer_requires_scheme() {
        assert_eq!(bearer_token(&headers("authorization", "Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("authorization", "Basic abc")), None);
        assert_eq!(bearer_token(&headers("authorization", "Bearer ")), None);
    }
}
