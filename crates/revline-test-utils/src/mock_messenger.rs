// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat messenger that records what it is asked to send.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use revline_core::types::{AdapterType, HealthStatus, Keyboard};
use revline_core::{ChatMessenger, PluginAdapter, RevlineError};

/// One captured `send_html` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub html: String,
    pub keyboard: Option<Keyboard>,
}

/// One captured `answer_callback` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredCallback {
    pub callback_id: String,
    pub text: Option<String>,
}

/// A [`ChatMessenger`] for tests.
///
/// Every call is captured. With [`MockMessenger::set_failing`] sends return a
/// channel error instead, as a Telegram outage would.
#[derive(Default)]
pub struct MockMessenger {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    answered: Arc<Mutex<Vec<AnsweredCallback>>>,
    failing: AtomicBool,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Messages sent to one chat, oldest first.
    pub async fn sent_to(&self, chat_id: i64) -> Vec<SentMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect()
    }

    pub async fn answered_callbacks(&self) -> Vec<AnsweredCallback> {
        self.answered.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
        self.answered.lock().await.clear();
    }
}

#[async_trait]
impl PluginAdapter for MockMessenger {
    fn name(&self) -> &str {
        "mock-messenger"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Messenger
    }

    async fn health_check(&self) -> Result<HealthStatus, RevlineError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RevlineError> {
        Ok(())
    }
}

#[async_trait]
impl ChatMessenger for MockMessenger {
    async fn send_html(
        &self,
        chat_id: i64,
        html: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), RevlineError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RevlineError::channel("mock messenger is offline"));
        }
        self.sent.lock().await.push(SentMessage {
            chat_id,
            html: html.to_string(),
            keyboard,
        });
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), RevlineError> {
        self.answered.lock().await.push(AnsweredCallback {
            callback_id: callback_id.to_string(),
            text: text.map(str::to_string),
        });
        Ok(())
    }
}
