// SPDX-FileCopyrightText: 2026 Revline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator management and broadcasts to active operators.

use std::sync::Arc;

use revline_core::types::{Keyboard, Operator, OperatorRole, Permission, normalize_chat_id};
use revline_core::{ChatMessenger, RevlineError, StorageAdapter};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Shown when no recognised action is given.
pub const USAGE: &str = "?action=list | ?action=add&id=<telegram id>&name=<name>&role=<admin|superadmin> | ?action=remove&id=<telegram id>";

const DEFAULT_NAME: &str = "Admin";

/// Query parameters of the operator management endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminRequest {
    pub action: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
}

/// Result of an operator management request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AdminOutcome {
    List { ok: bool, operators: Vec<Operator> },
    Added { ok: bool, operator: Operator },
    Removed { ok: bool, removed: i64 },
    Usage { usage: &'static str },
}

/// Role from a loose string: `superadmin` (any case), otherwise admin.
pub fn parse_role(raw: Option<&str>) -> OperatorRole {
    match raw.map(str::trim) {
        Some(r) if r.eq_ignore_ascii_case("superadmin") => OperatorRole::Superadmin,
        _ => OperatorRole::Admin,
    }
}

fn parse_id(raw: Option<&str>) -> Result<i64, RevlineError> {
    raw.and_then(normalize_chat_id)
        .ok_or_else(|| RevlineError::Validation("Missing or invalid id".into()))
}

/// Adds, lists and deactivates operators.
#[derive(Clone)]
pub struct OperatorDirectory {
    storage: Arc<dyn StorageAdapter>,
}

impl OperatorDirectory {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    pub async fn handle(&self, request: &AdminRequest) -> Result<AdminOutcome, RevlineError> {
        match request.action.as_deref().map(str::trim) {
            Some("list") => Ok(AdminOutcome::List {
                ok: true,
                operators: self.storage.list_active_operators().await?,
            }),
            Some("add") => {
                let id = parse_id(request.id.as_deref())?;
                let name = request
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .unwrap_or(DEFAULT_NAME);
                let role = parse_role(request.role.as_deref());
                let operator = self.add(id, name, role).await?;
                Ok(AdminOutcome::Added { ok: true, operator })
            }
            Some("remove") => {
                let id = parse_id(request.id.as_deref())?;
                self.remove(id).await?;
                Ok(AdminOutcome::Removed {
                    ok: true,
                    removed: id,
                })
            }
            _ => Ok(AdminOutcome::Usage { usage: USAGE }),
        }
    }

    /// Upserts an operator, reactivating it if it was removed.
    pub async fn add(
        &self,
        telegram_id: i64,
        name: &str,
        role: OperatorRole,
    ) -> Result<Operator, RevlineError> {
        self.storage
            .upsert_operator(&Operator::new(telegram_id, name, role))
            .await?;
        let stored = self
            .storage
            .get_operator(telegram_id)
            .await?
            .ok_or_else(|| RevlineError::Internal("operator vanished after upsert".into()))?;
        info!(telegram_id, role = %stored.role, "operator saved");
        Ok(stored)
    }

    pub async fn remove(&self, telegram_id: i64) -> Result<(), RevlineError> {
        if !self.storage.deactivate_operator(telegram_id).await? {
            return Err(RevlineError::NotFound {
                entity: "Operator",
                id: telegram_id.to_string(),
            });
        }
        info!(telegram_id, "operator deactivated");
        Ok(())
    }

    /// Whether `telegram_id` belongs to an active operator.
    pub async fn is_operator(&self, telegram_id: i64) -> Result<bool, RevlineError> {
        Ok(self
            .storage
            .get_operator(telegram_id)
            .await?
            .is_some_and(|op| op.is_active))
    }

    /// Whether `telegram_id` is an active operator holding `permission`.
    pub async fn has_permission(
        &self,
        telegram_id: i64,
        permission: Permission,
    ) -> Result<bool, RevlineError> {
        Ok(self
            .storage
            .get_operator(telegram_id)
            .await?
            .is_some_and(|op| op.is_active && op.permissions.contains(&permission)))
    }
}

/// Sends one message to every active operator except `skip`.
///
/// Individual send failures are logged and skipped. Returns the names of the
/// operators the message reached.
pub async fn broadcast(
    storage: &dyn StorageAdapter,
    messenger: &dyn ChatMessenger,
    html: &str,
    keyboard: Option<&Keyboard>,
    skip: Option<i64>,
) -> Result<Vec<String>, RevlineError> {
    let mut reached = Vec::new();
    for operator in storage.list_active_operators().await? {
        if Some(operator.telegram_id) == skip {
            continue;
        }
        match messenger
            .send_html(operator.telegram_id, html, keyboard.cloned())
            .await
        {
            Ok(()) => reached.push(operator.name),
            Err(e) => warn!(
                telegram_id = operator.telegram_id,
                error = %e,
                "failed to message operator"
            ),
        }
    }
    Ok(reached)
}
