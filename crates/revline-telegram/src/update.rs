// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook update parsing.
//!
//! Telegram posts one update per request. Only private and group text
//! messages and inline button presses are turned into [`BotEvent`]s;
//! everything else is ignored.

use revline_core::types::{BotEvent, ChatUser};
use serde::Deserialize;
use teloxide::types::{ChatKind, Message, User};

/// The parts of a Bot API `Update` the webhook acts on.
#[derive(Debug, Deserialize)]
pub struct WebhookUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackPayload>,
}

/// An inline button press.
#[derive(Debug, Deserialize)]
pub struct CallbackPayload {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<CallbackOrigin>,
}

/// The message the pressed button was attached to.
#[derive(Debug, Deserialize)]
pub struct CallbackOrigin {
    pub chat: ChatRef,
}

#[derive(Debug, Deserialize)]
pub struct ChatRef {
    pub id: i64,
}

/// Parses a raw webhook body. Returns `None` for malformed JSON.
pub fn parse_update(body: &[u8]) -> Option<WebhookUpdate> {
    serde_json::from_slice(body).ok()
}

fn chat_user(user: &User) -> ChatUser {
    ChatUser {
        id: i64::try_from(user.id.0).unwrap_or(i64::MAX),
        first_name: user.first_name.clone(),
        username: user.username.clone(),
    }
}

/// Splits `/name@bot args` into `("name", "args")`.
pub fn split_command(text: &str) -> Option<(String, String)> {
    let rest = text.strip_prefix('/')?;
    let (head, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let name = head.split('@').next().unwrap_or(head);
    if name.is_empty() {
        return None;
    }
    Some((name.to_ascii_lowercase(), args.trim().to_string()))
}

impl WebhookUpdate {
    /// Reduces the update to an event, or `None` when there is nothing to act on.
    pub fn into_event(self) -> Option<BotEvent> {
        if let Some(callback) = self.callback_query {
            return Some(BotEvent::Callback {
                callback_id: callback.id,
                chat_id: callback.message.map(|m| m.chat.id),
                from: chat_user(&callback.from),
                data: callback.data.unwrap_or_default(),
            });
        }

        let message = self.message?;
        let from = chat_user(message.from.as_ref()?);
        let text = message.text()?.trim().to_string();
        if text.is_empty() {
            return None;
        }
        let chat_id = message.chat.id.0;
        let private = matches!(message.chat.kind, ChatKind::Private(_));

        Some(match split_command(&text) {
            Some((name, args)) => BotEvent::Command {
                chat_id,
                private,
                from,
                name,
                args,
            },
            None => BotEvent::Text {
                chat_id,
                private,
                from,
                text,
            },
        })
    }
}
