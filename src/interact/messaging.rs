//! Messaging between connected accounts
//!
//! A message is written only after the full gate sequence passes:
//! capability, structural eligibility, then the edge-scoped `message`
//! grant. Denial at any gate leaves the store untouched.

use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::auth::capability::Capability;
use crate::auth::claims::IdentityClaim;
use crate::auth::resolver::PermissionResolver;
use crate::db::schemas::{InteractionPermission, MessageDoc, MessageType};
use crate::db::store::DirectoryStore;
use crate::error::{PorterError, Result};
use crate::graph::ConnectionGraph;

/// Request to send a message
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub to_account_id: String,
    pub body: String,
    #[serde(default)]
    pub message_type: MessageType,
    #[serde(default)]
    pub related_task_id: Option<String>,
}

/// Messaging operations
pub struct MessagingService {
    store: Arc<dyn DirectoryStore>,
    graph: Arc<ConnectionGraph>,
    resolver: Arc<PermissionResolver>,
}

impl MessagingService {
    pub fn new(
        store: Arc<dyn DirectoryStore>,
        graph: Arc<ConnectionGraph>,
        resolver: Arc<PermissionResolver>,
    ) -> Self {
        Self {
            store,
            graph,
            resolver,
        }
    }

    /// Send a message from the claim's account along the stored edge
    pub async fn send_message(
        &self,
        claim: &IdentityClaim,
        request: SendMessageRequest,
    ) -> Result<MessageDoc> {
        self.resolver.require(Some(claim), Capability::SendMessages)?;

        let (from, _to) = self
            .graph
            .authorize_interaction(
                &claim.account_id,
                &request.to_account_id,
                InteractionPermission::Message,
            )
            .await?;

        let message = MessageDoc::new(
            from.company_id.clone(),
            from.account_id.clone(),
            request.to_account_id.clone(),
            request.body,
            request.message_type,
            request.related_task_id,
        );
        let message = self.store.insert_message(message).await?;
        self.store
            .touch_connection(&message.from_account_id, &message.to_account_id)
            .await?;

        info!(
            message_id = %message.message_id,
            from = %message.from_account_id,
            to = %message.to_account_id,
            "message sent"
        );
        Ok(message)
    }

    /// Mark a message read; recipients only
    pub async fn mark_read(&self, claim: &IdentityClaim, message_id: &str) -> Result<()> {
        let message = self
            .store
            .find_message(message_id)
            .await?
            .ok_or_else(|| PorterError::NotFound(format!("message '{message_id}'")))?;

        if message.to_account_id != claim.account_id {
            return Err(PorterError::Forbidden {
                reason: "only the recipient may mark a message read".into(),
            });
        }

        self.store.mark_message_read(message_id).await
    }

    /// Messages exchanged with another account, oldest first
    pub async fn conversation(
        &self,
        claim: &IdentityClaim,
        other_account_id: &str,
    ) -> Result<Vec<MessageDoc>> {
        self.store
            .list_messages_between(&claim.account_id, other_account_id)
            .await
    }

    /// Unread messages addressed to the caller
    pub async fn unread_count(&self, claim: &IdentityClaim) -> Result<u64> {
        self.store.count_unread(&claim.account_id).await
    }
}
