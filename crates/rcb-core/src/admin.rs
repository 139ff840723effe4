//! Super-admin operations on the allow-list.
//!
//! Callers that are not super-admins get no reply at all (`Ok(None)`), unlike the
//! explicit denial used by relay commands.

use std::sync::Arc;

use crate::{
    access::AccessStore,
    domain::UserId,
    messaging::types::OutgoingReply,
    Result,
};

pub const INVALID_ID_TEXT: &str = "ID must be a number.";
pub const EMPTY_LIST_TEXT: &str = "List is empty.";

pub struct Admin {
    access: Arc<AccessStore>,
}

impl Admin {
    pub fn new(access: Arc<AccessStore>) -> Self {
        Self { access }
    }

    /// `/adduser <id>`. A failed persist is returned as `Err`; nothing is committed.
    pub async fn add_user(&self, caller: UserId, arg: Option<&str>) -> Result<Option<OutgoingReply>> {
        if !self.access.is_super_admin(caller) {
            return Ok(None);
        }
        let target = match parse_target(arg, "adduser") {
            Ok(id) => id,
            Err(reply) => return Ok(Some(reply)),
        };

        self.access.add(target).await?;
        tracing::info!(user_id = caller.0, target = target.0, "allow-list: added");
        Ok(Some(OutgoingReply::plain(format!("✅ {target} added."))))
    }

    /// `/deluser <id>`. Removing an absent id still succeeds.
    pub async fn remove_user(
        &self,
        caller: UserId,
        arg: Option<&str>,
    ) -> Result<Option<OutgoingReply>> {
        if !self.access.is_super_admin(caller) {
            return Ok(None);
        }
        let target = match parse_target(arg, "deluser") {
            Ok(id) => id,
            Err(reply) => return Ok(Some(reply)),
        };

        self.access.remove(target).await?;
        tracing::info!(user_id = caller.0, target = target.0, "allow-list: removed");
        Ok(Some(OutgoingReply::plain(format!("✅ {target} removed."))))
    }

    /// `/listusers`.
    pub async fn list_users(&self, caller: UserId) -> Option<OutgoingReply> {
        if !self.access.is_super_admin(caller) {
            return None;
        }

        let users = self.access.list().await;
        if users.is_empty() {
            return Some(OutgoingReply::plain(EMPTY_LIST_TEXT));
        }

        let lines = users
            .iter()
            .map(|u| format!("• {u}"))
            .collect::<Vec<_>>()
            .join("\n");
        Some(OutgoingReply::html(format!("<b>Allowed users:</b>\n{lines}")))
    }
}

fn parse_target(arg: Option<&str>, command: &str) -> std::result::Result<UserId, OutgoingReply> {
    let Some(raw) = arg.map(str::trim).filter(|s| !s.is_empty()) else {
        return Err(OutgoingReply::plain(format!(
            "Usage: /{command} <TelegramID>"
        )));
    };
    raw.parse::<UserId>()
        .map_err(|_| OutgoingReply::plain(INVALID_ID_TEXT))
}
