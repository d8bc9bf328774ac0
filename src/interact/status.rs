//! Status synchronization between connected accounts
//!
//! The gates are fixed; the effect is not. What "applying a status
//! update" means is resource-specific and owned by the deployment, so
//! the write is delegated to an injected [`StatusSink`]. No status
//! vocabulary is imposed — the payload is an opaque document.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::auth::capability::Capability;
use crate::auth::claims::IdentityClaim;
use crate::auth::resolver::PermissionResolver;
use crate::db::schemas::InteractionPermission;
use crate::db::store::DirectoryStore;
use crate::error::Result;
use crate::graph::ConnectionGraph;

/// A gated status update ready to be applied
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub from_account_id: String,
    pub to_account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    /// Resource the update concerns, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    /// Opaque consumer-defined payload
    pub payload: serde_json::Value,
}

/// Applies status updates after the gates pass
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn apply(&self, update: &StatusUpdate) -> Result<()>;
}

/// Default sink: record the update in the log stream
pub struct LogStatusSink;

#[async_trait]
impl StatusSink for LogStatusSink {
    async fn apply(&self, update: &StatusUpdate) -> Result<()> {
        info!(
            from = %update.from_account_id,
            to = %update.to_account_id,
            resource = update.resource_id.as_deref().unwrap_or("-"),
            "status update applied"
        );
        Ok(())
    }
}

/// Request to push a status update
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusRequest {
    pub to_account_id: String,
    #[serde(default)]
    pub resource_id: Option<String>,
    pub payload: serde_json::Value,
}

/// Status synchronization operations
pub struct StatusSyncService {
    store: Arc<dyn DirectoryStore>,
    graph: Arc<ConnectionGraph>,
    resolver: Arc<PermissionResolver>,
    sink: Arc<dyn StatusSink>,
}

impl StatusSyncService {
    pub fn new(
        store: Arc<dyn DirectoryStore>,
        graph: Arc<ConnectionGraph>,
        resolver: Arc<PermissionResolver>,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            store,
            graph,
            resolver,
            sink,
        }
    }

    /// Push a status update from the claim's account along the stored
    /// edge. The sink runs only after every gate passes.
    pub async fn sync_status(
        &self,
        claim: &IdentityClaim,
        request: SyncStatusRequest,
    ) -> Result<()> {
        self.resolver.require(Some(claim), Capability::SyncStatus)?;

        let (from, _to) = self
            .graph
            .authorize_interaction(
                &claim.account_id,
                &request.to_account_id,
                InteractionPermission::StatusSync,
            )
            .await?;

        let update = StatusUpdate {
            from_account_id: from.account_id.clone(),
            to_account_id: request.to_account_id.clone(),
            company_id: from.company_id.clone(),
            resource_id: request.resource_id,
            payload: request.payload,
        };
        self.sink.apply(&update).await?;

        self.store
            .touch_connection(&update.from_account_id, &update.to_account_id)
            .await?;
        Ok(())
    }
}
