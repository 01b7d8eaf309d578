// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Revline lead service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently falling back to a default.

use serde::{Deserialize, Serialize};

/// Top-level Revline configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RevlineConfig {
    /// HTTP listener and public URL.
    #[serde(default)]
    pub server: ServerConfig,

    /// SQLite database settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log filtering.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Telegram bot and per-category destination chats.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Email notification transport and recipients.
    #[serde(default)]
    pub email: EmailConfig,

    /// Admin password, session signing and shared secrets.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Intake throttling.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Locale routing.
    #[serde(default)]
    pub locale: LocaleConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the HTTP listener to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Public base URL of the site, used in links sent to operators.
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: default_public_url(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_public_url() -> String {
    "http://localhost:3000".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("revline").join("revline.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("revline.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot configuration.
///
/// Chat ids are kept as strings and normalized when used, so values such as
/// `"chat -100123"` copied from other tools still work.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` disables every Telegram feature.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Chat receiving AUTO leads (and GENERAL leads when no general chat is set).
    #[serde(default)]
    pub auto_chat_id: Option<String>,

    /// Chat receiving MOTO leads.
    #[serde(default)]
    pub moto_chat_id: Option<String>,

    /// Chat receiving GENERAL leads (partnerships).
    #[serde(default)]
    pub general_chat_id: Option<String>,

    /// Expected `X-Telegram-Bot-Api-Secret-Token` header on webhook calls.
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Bot API base URL override (self-hosted Bot API server).
    #[serde(default)]
    pub api_url: Option<String>,
}

/// Which backend sends notification email.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailTransport {
    /// Resend HTTP API.
    #[default]
    Resend,
    /// Plain SMTP relay.
    Smtp,
}

/// Email notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmailConfig {
    /// Transport used to send mail.
    #[serde(default)]
    pub transport: EmailTransport,

    /// Sender address. `None` disables email notifications.
    #[serde(default)]
    pub from: Option<String>,

    /// Display name shown with the sender address.
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Recipient for AUTO leads (and GENERAL leads when no general recipient is set).
    #[serde(default)]
    pub auto_to: Option<String>,

    /// Recipient for MOTO leads.
    #[serde(default)]
    pub moto_to: Option<String>,

    /// Recipient for GENERAL leads.
    #[serde(default)]
    pub general_to: Option<String>,

    /// Resend API key.
    #[serde(default)]
    pub resend_api_key: Option<String>,

    /// Resend API base URL.
    #[serde(default = "default_resend_api_url")]
    pub resend_api_url: String,

    /// SMTP relay host.
    #[serde(default)]
    pub smtp_host: Option<String>,

    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username.
    #[serde(default)]
    pub smtp_username: Option<String>,

    /// SMTP password.
    #[serde(default)]
    pub smtp_password: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            transport: EmailTransport::default(),
            from: None,
            from_name: default_from_name(),
            auto_to: None,
            moto_to: None,
            general_to: None,
            resend_api_key: None,
            resend_api_url: default_resend_api_url(),
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
        }
    }
}

impl EmailConfig {
    /// Whether any recipient is configured.
    pub fn has_recipients(&self) -> bool {
        self.auto_to.is_some() || self.moto_to.is_some() || self.general_to.is_some()
    }
}

fn default_from_name() -> String {
    "Revline".to_string()
}

fn default_resend_api_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

/// Secrets guarding the admin surfaces.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Password for the admin inbox login. `None` disables login.
    #[serde(default)]
    pub admin_password: Option<String>,

    /// Key for signing admin session tokens (at least 32 characters).
    #[serde(default)]
    pub session_secret: Option<String>,

    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Shared secret for operator management. `None` rejects every call.
    #[serde(default)]
    pub admin_api_secret: Option<String>,

    /// Shared secret for scheduled task triggers. `None` rejects every call.
    #[serde(default)]
    pub cron_secret: Option<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            admin_password: None,
            session_secret: None,
            session_ttl_secs: default_session_ttl_secs(),
            admin_api_secret: None,
            cron_secret: None,
        }
    }
}

fn default_session_ttl_secs() -> u64 {
    12 * 60 * 60
}

/// Fixed-window intake throttling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Requests allowed per caller per window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
        }
    }
}

fn default_window_secs() -> u64 {
    60
}

fn default_max_requests() -> u32 {
    10
}

/// Locale routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LocaleConfig {
    /// Country codes refused with 403 on page routes.
    #[serde(default = "default_blocked_countries")]
    pub blocked_countries: Vec<String>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            blocked_countries: default_blocked_countries(),
        }
    }
}

fn default_blocked_countries() -> Vec<String> {
    vec!["RU".to_string()]
}
