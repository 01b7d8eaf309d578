// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Lookup order, later wins: compiled defaults, `/etc/revline/revline.toml`,
//! `~/.config/revline/revline.toml`, `./revline.toml`, then `REVLINE_*`
//! environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RevlineConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/revline/revline.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "revline.toml";

/// Top-level sections, used to map `REVLINE_SECTION_KEY` onto `section.key`.
const SECTIONS: &[&str] = &[
    "rate_limit",
    "server",
    "storage",
    "logging",
    "telegram",
    "email",
    "security",
    "locale",
];

/// Per-user config file under the XDG config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("revline").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<RevlineConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<RevlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RevlineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RevlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RevlineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment behind [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RevlineConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `REVLINE_TELEGRAM_BOT_TOKEN` to `telegram.bot_token`.
///
/// Only the first underscore after a known section name becomes a dot;
/// `Env::split("_")` would turn `bot_token` into `bot.token`.
fn env_provider() -> Env {
    Env::prefixed("REVLINE_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a prefix-stripped env var name onto a dotted, lowercase config path.
///
/// Figment hands keys over as they appear in the environment, usually upper case.
pub fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}
