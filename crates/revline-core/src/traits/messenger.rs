// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Direct chat messaging used by the bot, the reply loop and scheduled jobs.

use async_trait::async_trait;

use crate::error::RevlineError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Keyboard;

/// A chat platform client able to send HTML messages to arbitrary chats.
#[async_trait]
pub trait ChatMessenger: PluginAdapter {
    /// Sends an HTML-formatted message, optionally with an inline keyboard.
    async fn send_html(
        &self,
        chat_id: i64,
        html: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), RevlineError>;

    /// Acknowledges an inline button press, optionally showing a short toast.
    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), RevlineError>;
}
