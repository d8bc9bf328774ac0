//! The persistence seam for the authorization core
//!
//! Every service depends on [`DirectoryStore`] rather than a concrete
//! database, so deployments can swap the MongoDB implementation for the
//! in-memory one (dev, tests) or a future relational backend without
//! touching the core. Implementations must filter soft-deleted rows out
//! of every read and count.

use async_trait::async_trait;

use crate::db::schemas::{
    AccountDoc, AccountKind, ConnectionDoc, ConnectionStatus, MessageDoc, SubscriptionDoc,
    TaskDoc, TaskStatus,
};
use crate::error::Result;

/// Storage operations required by the core services
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    // --- accounts ---

    /// Insert an account row, returning it with stamped metadata
    async fn insert_account(&self, account: AccountDoc) -> Result<AccountDoc>;

    /// Find a live account by logical id
    async fn find_account(&self, account_id: &str) -> Result<Option<AccountDoc>>;

    /// List a company's live accounts, optionally restricted to one kind
    async fn list_accounts(
        &self,
        company_id: &str,
        kind: Option<AccountKind>,
    ) -> Result<Vec<AccountDoc>>;

    /// Count a company's live rows of one kind (the quota ledger's input)
    async fn count_accounts(&self, company_id: &str, kind: AccountKind) -> Result<u64>;

    /// Find the active main account of a company, if any
    async fn find_main_account(&self, company_id: &str) -> Result<Option<AccountDoc>>;

    /// Count active child accounts of the given parent
    async fn count_active_children(&self, account_id: &str) -> Result<u64>;

    /// Flip the active flag on an account
    async fn set_account_active(&self, account_id: &str, active: bool) -> Result<()>;

    /// Soft-delete an account
    async fn delete_account(&self, account_id: &str) -> Result<()>;

    // --- subscriptions ---

    /// Insert a subscription row (billing integration and tests)
    async fn insert_subscription(&self, subscription: SubscriptionDoc) -> Result<SubscriptionDoc>;

    /// The company's active subscription: most recent by creation time
    async fn latest_subscription(&self, company_id: &str) -> Result<Option<SubscriptionDoc>>;

    // --- connection edges ---

    /// Find the edge for the ordered pair, active or not
    async fn find_connection(&self, from: &str, to: &str) -> Result<Option<ConnectionDoc>>;

    /// Insert the edge, or replace permissions/type/status of the
    /// existing one; idempotent and atomic per row
    async fn upsert_connection(&self, edge: ConnectionDoc) -> Result<ConnectionDoc>;

    /// Set edge status; returns false when no such edge exists
    async fn set_connection_status(
        &self,
        from: &str,
        to: &str,
        status: ConnectionStatus,
    ) -> Result<bool>;

    /// Bump the edge's `last_interaction_at`
    async fn touch_connection(&self, from: &str, to: &str) -> Result<()>;

    /// List outbound edges of an account
    async fn list_connections_from(&self, from: &str) -> Result<Vec<ConnectionDoc>>;

    // --- messages ---

    async fn insert_message(&self, message: MessageDoc) -> Result<MessageDoc>;

    async fn find_message(&self, message_id: &str) -> Result<Option<MessageDoc>>;

    async fn mark_message_read(&self, message_id: &str) -> Result<()>;

    /// Messages exchanged between two accounts in either direction,
    /// oldest first
    async fn list_messages_between(&self, a: &str, b: &str) -> Result<Vec<MessageDoc>>;

    /// Unread messages addressed to the account
    async fn count_unread(&self, account_id: &str) -> Result<u64>;

    // --- task assignments ---

    async fn insert_task(&self, task: TaskDoc) -> Result<TaskDoc>;

    async fn find_task(&self, task_id: &str) -> Result<Option<TaskDoc>>;

    /// Record a status transition with optional assignee feedback
    async fn set_task_status(
        &self,
        task_id: &str,
        status: TaskStatus,
        feedback: Option<String>,
    ) -> Result<()>;

    /// Tasks assigned to the account, newest first
    async fn list_tasks_for(&self, assignee: &str) -> Result<Vec<TaskDoc>>;
}
