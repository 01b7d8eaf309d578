// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead lifecycle: intake, inbox queries, status changes and the reply loop.

use std::str::FromStr;
use std::sync::Arc;

use revline_core::types::{LeadDetail, LeadFilter, LeadStats, NewLead, ReplyChannel};
use revline_core::{ChatMessenger, Lead, LeadStatus, Reply, RevlineError, StorageAdapter};
use revline_telegram::format;
use serde::Serialize;
use tracing::{info, warn};

use crate::fanout::{Fanout, FanoutHandle};
use crate::intake::{ContactForm, PartnershipForm};

/// A persisted lead and its in-flight notifications.
pub struct Submission {
    pub lead: Lead,
    pub deliveries: FanoutHandle,
}

/// One page of the inbox plus counters.
#[derive(Debug, Clone, Serialize)]
pub struct LeadPage {
    pub messages: Vec<Lead>,
    pub stats: LeadStats,
}

/// Result of the reply loop.
#[derive(Debug, Clone)]
pub struct ReplyOutcome {
    pub reply: Reply,
    /// Whether the reply reached the submitter's Telegram chat.
    pub forwarded: bool,
}

fn message_not_found(id: &str) -> RevlineError {
    RevlineError::NotFound {
        entity: "Message",
        id: id.to_string(),
    }
}

/// Parses a status as sent by clients.
pub fn parse_status(raw: &str) -> Result<LeadStatus, RevlineError> {
    LeadStatus::from_str(raw.trim()).map_err(|_| RevlineError::Validation("Invalid status".into()))
}

/// Entry point for everything that creates or changes leads.
pub struct LeadService {
    storage: Arc<dyn StorageAdapter>,
    fanout: Fanout,
    messenger: Option<Arc<dyn ChatMessenger>>,
}

impl LeadService {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        fanout: Fanout,
        messenger: Option<Arc<dyn ChatMessenger>>,
    ) -> Self {
        Self {
            storage,
            fanout,
            messenger,
        }
    }

    pub fn storage(&self) -> &Arc<dyn StorageAdapter> {
        &self.storage
    }

    pub fn messenger(&self) -> Option<&Arc<dyn ChatMessenger>> {
        self.messenger.as_ref()
    }

    pub async fn submit_contact(&self, form: ContactForm) -> Result<Submission, RevlineError> {
        self.submit(form.into_new_lead()?).await
    }

    pub async fn submit_partnership(
        &self,
        form: PartnershipForm,
    ) -> Result<Submission, RevlineError> {
        self.submit(form.into_new_lead()?).await
    }

    /// Persists a validated lead, then starts notifications.
    ///
    /// Nothing is sent unless the insert succeeded.
    pub async fn submit(&self, new: NewLead) -> Result<Submission, RevlineError> {
        let lead = Lead::create(new);
        self.storage.insert_lead(&lead).await?;
        info!(lead_id = %lead.id, category = %lead.category, "lead stored");
        let deliveries = self.fanout.dispatch(&lead);
        Ok(Submission { lead, deliveries })
    }

    pub async fn list(&self, filter: &LeadFilter) -> Result<LeadPage, RevlineError> {
        Ok(LeadPage {
            messages: self.storage.list_leads(filter).await?,
            stats: self.storage.lead_stats().await?,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Lead, RevlineError> {
        self.storage
            .get_lead(id)
            .await?
            .ok_or_else(|| message_not_found(id))
    }

    pub async fn detail(&self, id: &str) -> Result<LeadDetail, RevlineError> {
        let lead = self.get(id).await?;
        let replies = self.storage.list_replies(id).await?;
        Ok(LeadDetail { lead, replies })
    }

    /// Sets a lead's status and returns the updated lead.
    pub async fn set_status(&self, id: &str, status: LeadStatus) -> Result<Lead, RevlineError> {
        if !self.storage.update_lead_status(id, status).await? {
            return Err(message_not_found(id));
        }
        info!(lead_id = %id, status = %status, "lead status changed");
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), RevlineError> {
        if !self.storage.delete_lead(id).await? {
            return Err(message_not_found(id));
        }
        info!(lead_id = %id, "lead deleted");
        Ok(())
    }

    /// Replies newest first. Unknown leads are reported as not found.
    pub async fn replies(&self, id: &str) -> Result<Vec<Reply>, RevlineError> {
        self.get(id).await?;
        self.storage.list_replies(id).await
    }

    /// Records an operator reply and optionally forwards it to the submitter.
    ///
    /// The lead becomes REPLIED together with the insert. A forward failure
    /// is logged and reported through [`ReplyOutcome::forwarded`] only.
    pub async fn reply(
        &self,
        id: &str,
        content: &str,
        send_to_telegram: bool,
    ) -> Result<ReplyOutcome, RevlineError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(RevlineError::Validation("Reply content is required".into()));
        }
        let lead = self.get(id).await?;

        let via = if send_to_telegram {
            ReplyChannel::Telegram
        } else {
            ReplyChannel::Email
        };
        let reply = Reply::create(id, content, via);
        if !self.storage.record_reply(&reply).await? {
            return Err(message_not_found(id));
        }
        info!(lead_id = %id, reply_id = %reply.id, sent_via = %via, "reply recorded");

        let forwarded = send_to_telegram && self.forward(&lead, content).await;
        Ok(ReplyOutcome { reply, forwarded })
    }

    async fn forward(&self, lead: &Lead, content: &str) -> bool {
        let Some(chat_id) = lead.telegram_id() else {
            return false;
        };
        let Some(messenger) = &self.messenger else {
            warn!(lead_id = %lead.id, "reply not forwarded: Telegram is not configured");
            return false;
        };
        let html = format::reply_message(Some(&lead.body), content);
        match messenger.send_html(chat_id, &html, None).await {
            Ok(()) => true,
            Err(e) => {
                warn!(lead_id = %lead.id, chat_id, error = %e, "failed to forward reply");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_parse_loosely_but_reject_unknowns() {
        assert_eq!(parse_status("REPLIED").unwrap(), LeadStatus::Replied);
        assert_eq!(parse_status(" in_progress ").unwrap(), LeadStatus::InProgress);
        assert_eq!(parse_status("DONE").unwrap_err().to_string(), "Invalid status");
    }
}
