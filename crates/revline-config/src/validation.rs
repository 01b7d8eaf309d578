// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express. All problems are collected;
//! validation never stops at the first one.

use revline_core::types::normalize_chat_id;

use crate::diagnostic::ConfigError;
use crate::model::{EmailTransport, RevlineConfig};

/// Shortest accepted session signing key.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &RevlineConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        fail(format!(
            "server.host `{host}` is not a valid IP address or hostname"
        ));
    }

    if config.server.port == 0 {
        fail("server.port must be between 1 and 65535".to_string());
    }

    if !config.server.public_url.starts_with("http://")
        && !config.server.public_url.starts_with("https://")
    {
        fail(format!(
            "server.public_url `{}` must start with http:// or https://",
            config.server.public_url
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        fail(format!(
            "logging.level `{}` must be one of: {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.rate_limit.window_secs == 0 {
        fail("rate_limit.window_secs must be greater than 0".to_string());
    }
    if config.rate_limit.max_requests == 0 {
        fail("rate_limit.max_requests must be greater than 0".to_string());
    }

    for (key, value) in [
        ("telegram.auto_chat_id", &config.telegram.auto_chat_id),
        ("telegram.moto_chat_id", &config.telegram.moto_chat_id),
        ("telegram.general_chat_id", &config.telegram.general_chat_id),
    ] {
        if let Some(raw) = value
            && normalize_chat_id(raw).is_none()
        {
            fail(format!("{key} `{raw}` does not contain a numeric chat id"));
        }
    }

    if matches!(config.telegram.bot_token.as_deref(), Some(t) if t.trim().is_empty()) {
        fail("telegram.bot_token must not be empty when set".to_string());
    }

    let email = &config.email;
    if email.has_recipients() {
        if email.from.is_none() {
            fail("email.from is required when an email recipient is configured".to_string());
        }
        match email.transport {
            EmailTransport::Resend if email.resend_api_key.is_none() => {
                fail("email.resend_api_key is required for the resend transport".to_string());
            }
            EmailTransport::Smtp if email.smtp_host.is_none() => {
                fail("email.smtp_host is required for the smtp transport".to_string());
            }
            _ => {}
        }
    }

    let security = &config.security;
    if let Some(secret) = &security.session_secret
        && secret.len() < MIN_SESSION_SECRET_LEN
    {
        fail(format!(
            "security.session_secret must be at least {MIN_SESSION_SECRET_LEN} characters"
        ));
    }
    if security.admin_password.is_some() && security.session_secret.is_none() {
        fail("security.session_secret is required when security.admin_password is set".to_string());
    }
    if security.session_ttl_secs == 0 {
        fail("security.session_ttl_secs must be greater than 0".to_string());
    }

    for country in &config.locale.blocked_countries {
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            fail(format!(
                "locale.blocked_countries entry `{country}` is not a two-letter country code"
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &RevlineConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&RevlineConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = RevlineConfig::default();
        config.storage.database_path = " ".to_string();
        assert!(messages(&config).iter().any(|m| m.contains("database_path")));
    }

    #[test]
    fn zero_rate_limit_fails_validation() {
        let mut config = RevlineConfig::default();
        config.rate_limit.window_secs = 0;
        config.rate_limit.max_requests = 0;
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.contains("window_secs")));
        assert!(msgs.iter().any(|m| m.contains("max_requests")));
    }

    #[test]
    fn malformed_chat_id_fails_validation() {
        let mut config = RevlineConfig::default();
        config.telegram.moto_chat_id = Some("@moto-channel".to_string());
        assert!(messages(&config).iter().any(|m| m.contains("moto_chat_id")));
    }

    #[test]
    fn chat_id_with_noise_is_accepted() {
        let mut config = RevlineConfig::default();
        config.telegram.auto_chat_id = Some("chat -100123".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn resend_recipient_requires_key_and_sender() {
        let mut config = RevlineConfig::default();
        config.email.auto_to = Some("sales@example.com".to_string());
        let msgs = messages(&config);
        assert!(msgs.iter().any(|m| m.contains("email.from")));
        assert!(msgs.iter().any(|m| m.contains("resend_api_key")));
    }

    #[test]
    fn smtp_recipient_requires_host() {
        let mut config = RevlineConfig::default();
        config.email.transport = EmailTransport::Smtp;
        config.email.from = Some("noreply@example.com".to_string());
        config.email.moto_to = Some("moto@example.com".to_string());
        assert!(messages(&config).iter().any(|m| m.contains("smtp_host")));
    }

    #[test]
    fn password_without_session_secret_fails() {
        let mut config = RevlineConfig::default();
        config.security.admin_password = Some("hunter2".to_string());
        assert!(messages(&config).iter().any(|m| m.contains("session_secret")));
    }

    #[test]
    fn short_session_secret_fails() {
        let mut config = RevlineConfig::default();
        config.security.session_secret = Some("short".to_string());
        assert!(messages(&config).iter().any(|m| m.contains("at least 32")));
    }

    #[test]
    fn collects_every_error() {
        let mut config = RevlineConfig::default();
        config.server.host = String::new();
        config.server.port = 0;
        config.logging.level = "loud".to_string();
        assert_eq!(messages(&config).len(), 3);
    }

    #[test]
    fn bad_country_code_fails() {
        let mut config = RevlineConfig::default();
        config.locale.blocked_countries = vec!["RUS".to_string()];
        assert!(messages(&config).iter().any(|m| m.contains("RUS")));
    }
}
