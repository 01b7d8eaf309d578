// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Email delivery of new leads to the per-category sales inboxes.

use async_trait::async_trait;
use revline_config::model::EmailConfig;
use revline_core::types::{AdapterType, HealthStatus};
use revline_core::{Lead, LeadCategory, NotificationChannel, PluginAdapter, RevlineError};
use tracing::debug;

use crate::message::{self, OutgoingEmail};
use crate::transport::{self, MailTransport};

/// Recipient address per lead category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipients {
    pub auto: Option<String>,
    pub moto: Option<String>,
    pub general: Option<String>,
}

impl Recipients {
    pub fn from_config(config: &EmailConfig) -> Self {
        Self {
            auto: config.auto_to.clone(),
            moto: config.moto_to.clone(),
            general: config.general_to.clone(),
        }
    }

    /// Address for `category`. GENERAL falls back to the AUTO inbox.
    pub fn recipient_for(&self, category: LeadCategory) -> Option<&str> {
        match category {
            LeadCategory::Auto => self.auto.as_deref(),
            LeadCategory::Moto => self.moto.as_deref(),
            LeadCategory::General => self.general.as_deref().or(self.auto.as_deref()),
        }
    }
}

/// Sends one email per lead through the configured [`MailTransport`].
pub struct EmailNotifier {
    transport: Box<dyn MailTransport>,
    recipients: Recipients,
    from: String,
}

impl EmailNotifier {
    pub fn new(transport: Box<dyn MailTransport>, recipients: Recipients, from: &str) -> Self {
        Self {
            transport,
            recipients,
            from: from.to_string(),
        }
    }

    /// Builds the notifier from config, or `None` when email is not configured.
    pub fn from_config(config: &EmailConfig) -> Result<Option<Self>, RevlineError> {
        let Some(transport) = transport::from_config(config)? else {
            return Ok(None);
        };
        let Some(address) = config.from.as_deref() else {
            return Ok(None);
        };
        Ok(Some(Self::new(
            transport,
            Recipients::from_config(config),
            &sender(&config.from_name, address),
        )))
    }
}

/// `Name <address>`, or the bare address when the name is blank.
fn sender(name: &str, address: &str) -> String {
    let name = name.trim();
    if name.is_empty() || address.contains('<') {
        address.to_string()
    } else {
        format!("{name} <{address}>")
    }
}

#[async_trait]
impl PluginAdapter for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, RevlineError> {
        if self.recipients == Recipients::default() {
            return Ok(HealthStatus::Degraded("no email recipient configured".into()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RevlineError> {
        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for EmailNotifier {
    async fn deliver(&self, lead: &Lead) -> Result<(), RevlineError> {
        let to = self.recipients.recipient_for(lead.category).ok_or_else(|| {
            RevlineError::Config(format!(
                "no email recipient configured for {} leads",
                lead.category
            ))
        })?;

        let email = OutgoingEmail {
            from: self.from.clone(),
            to: to.to_string(),
            subject: message::subject(lead),
            html: message::html_body(lead),
            reply_to: lead.email.clone(),
        };
        self.transport.send(&email).await?;
        debug!(lead_id = %lead.id, transport = self.transport.name(), "lead email sent");
        Ok(())
    }
}
