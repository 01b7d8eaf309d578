// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Revline lead service.

use thiserror::Error;

/// The primary error type used across all Revline adapters and pipeline operations.
#[derive(Debug, Error)]
pub enum RevlineError {
    /// Configuration errors (missing destination, invalid value, bad secret).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Notification channel errors (Telegram API failure, email transport failure).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Client input rejected before any side effect took place.
    #[error("{0}")]
    Validation(String),

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Missing or invalid session or shared secret.
    #[error("unauthorized")]
    Unauthorized,

    /// The caller exceeded its request window.
    #[error("rate limited")]
    RateLimited,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RevlineError {
    /// Shorthand for a channel error without an underlying source.
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
            source: None,
        }
    }

    /// Returns `true` for errors caused by the caller rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound { .. } | Self::Unauthorized | Self::RateLimited
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_displayed_verbatim() {
        let err = RevlineError::Validation("Missing required auto fields".into());
        assert_eq!(err.to_string(), "Missing required auto fields");
    }

    #[test]
    fn not_found_names_entity_and_id() {
        let err = RevlineError::NotFound {
            entity: "lead",
            id: "abc".into(),
        };
        assert_eq!(err.to_string(), "lead not found: abc");
        assert!(err.is_client_error());
    }

    #[test]
    fn storage_is_not_a_client_error() {
        let err = RevlineError::Storage {
            source: Box::new(std::io::Error::other("disk full")),
        };
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("disk full"));
    }
}
