// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification channels for fan-out tests.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use revline_core::types::{AdapterType, HealthStatus};
use revline_core::{Lead, NotificationChannel, PluginAdapter, RevlineError};

/// Records every lead it is given.
pub struct RecordingChannel {
    name: String,
    delivered: Mutex<Vec<Lead>>,
    notify: Notify,
}

impl RecordingChannel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            delivered: Mutex::new(Vec::new()),
            notify: Notify::new(),
        }
    }

    pub async fn delivered(&self) -> Vec<Lead> {
        self.delivered.lock().await.clone()
    }

    /// Waits until at least `count` leads arrived or `timeout` passes.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Lead> {
        let wait = async {
            loop {
                let notified = self.notify.notified();
                {
                    let delivered = self.delivered.lock().await;
                    if delivered.len() >= count {
                        return delivered.clone();
                    }
                }
                notified.await;
            }
        };
        match tokio::time::timeout(timeout, wait).await {
            Ok(leads) => leads,
            Err(_) => self.delivered().await,
        }
    }
}

/// How a [`FailingChannel`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Destination missing from config.
    Unconfigured,
    /// Downstream provider error.
    Outage,
}

/// Fails every delivery.
pub struct FailingChannel {
    name: String,
    mode: FailureMode,
}

impl FailingChannel {
    pub fn new(name: &str, mode: FailureMode) -> Self {
        Self {
            name: name.to_string(),
            mode,
        }
    }
}

macro_rules! plugin_adapter {
    ($ty:ty) => {
        #[async_trait]
        impl PluginAdapter for $ty {
            fn name(&self) -> &str {
                &self.name
            }

            fn version(&self) -> semver::Version {
                semver::Version::new(0, 1, 0)
            }

            fn adapter_type(&self) -> AdapterType {
                AdapterType::Notifier
            }

            async fn health_check(&self) -> Result<HealthStatus, RevlineError> {
                Ok(HealthStatus::Healthy)
            }

            async fn shutdown(&self) -> Result<(), RevlineError> {
                Ok(())
            }
        }
    };
}

plugin_adapter!(RecordingChannel);
plugin_adapter!(FailingChannel);

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn deliver(&self, lead: &Lead) -> Result<(), RevlineError> {
        self.delivered.lock().await.push(lead.clone());
        self.notify.notify_waiters();
        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for FailingChannel {
    async fn deliver(&self, lead: &Lead) -> Result<(), RevlineError> {
        Err(match self.mode {
            FailureMode::Unconfigured => RevlineError::Config(format!(
                "no {} destination configured for {} leads",
                self.name, lead.category
            )),
            FailureMode::Outage => RevlineError::channel(format!("{} is unavailable", self.name)),
        })
    }
}
