// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort delivery of a persisted lead to every notification channel.
//!
//! Each channel gets its own task and a single attempt. Failures are logged
//! inside the task, so dropping the returned [`FanoutHandle`] loses nothing
//! but the ability to wait for the results.

use std::sync::Arc;

use revline_core::{Lead, NotificationChannel, RevlineError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Outcome of one channel's delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub channel: String,
    /// `None` when the channel accepted the lead.
    pub error: Option<String>,
}

impl DeliveryReport {
    pub fn delivered(&self) -> bool {
        self.error.is_none()
    }
}

/// In-flight deliveries for one lead.
#[must_use = "drop the handle explicitly if delivery results are not needed"]
pub struct FanoutHandle {
    tasks: Vec<(String, JoinHandle<Result<(), RevlineError>>)>,
}

impl FanoutHandle {
    /// Waits for every channel and reports what happened, in channel order.
    pub async fn join(self) -> Vec<DeliveryReport> {
        let mut reports = Vec::with_capacity(self.tasks.len());
        for (channel, task) in self.tasks {
            let error = match task.await {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(e) => Some(format!("delivery task failed: {e}")),
            };
            reports.push(DeliveryReport { channel, error });
        }
        reports
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// The set of channels every new lead is announced on.
#[derive(Clone, Default)]
pub struct Fanout {
    channels: Vec<Arc<dyn NotificationChannel>>,
}

impl Fanout {
    pub fn new(channels: Vec<Arc<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    pub fn channel_names(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.name().to_string()).collect()
    }

    /// Starts one delivery task per channel and returns immediately.
    pub fn dispatch(&self, lead: &Lead) -> FanoutHandle {
        let lead = Arc::new(lead.clone());
        let tasks = self
            .channels
            .iter()
            .map(|channel| {
                let name = channel.name().to_string();
                let channel = Arc::clone(channel);
                let lead = Arc::clone(&lead);
                let task_name = name.clone();
                let task = tokio::spawn(async move {
                    let result = channel.deliver(&lead).await;
                    match &result {
                        Ok(()) => debug!(lead_id = %lead.id, channel = %task_name, "lead delivered"),
                        Err(e @ RevlineError::Config(_)) => warn!(
                            lead_id = %lead.id,
                            channel = %task_name,
                            error = %e,
                            "notification skipped: channel not configured"
                        ),
                        Err(e) => warn!(
                            lead_id = %lead.id,
                            channel = %task_name,
                            error = %e,
                            "notification delivery failed"
                        ),
                    }
                    result
                });
                (name, task)
            })
            .collect();
        FanoutHandle { tasks }
    }
}
