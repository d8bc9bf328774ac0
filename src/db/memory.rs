//! In-memory directory store
//!
//! Backs development and the test suite. Mirrors the MongoDB
//! implementation's semantics: soft deletes, live-row filtering, and
//! per-row atomic edge upserts (each edge lives under one map entry).

use bson::DateTime;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use async_trait::async_trait;

use crate::db::schemas::{
    AccountDoc, AccountKind, ConnectionDoc, ConnectionStatus, MessageDoc, Metadata,
    SubscriptionDoc, TaskDoc, TaskStatus,
};
use crate::db::store::DirectoryStore;
use crate::error::Result;

/// Thread-safe in-memory store
#[derive(Default)]
pub struct MemoryDirectory {
    accounts: DashMap<String, AccountDoc>,
    subscriptions: DashMap<String, SubscriptionDoc>,
    connections: DashMap<(String, String), ConnectionDoc>,
    messages: DashMap<String, MessageDoc>,
    tasks: DashMap<String, TaskDoc>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

fn stamp(metadata: &mut Metadata) {
    *metadata = Metadata::new();
}

#[async_trait]
impl DirectoryStore for MemoryDirectory {
    async fn insert_account(&self, mut account: AccountDoc) -> Result<AccountDoc> {
        stamp(&mut account.metadata);
        self.accounts
            .insert(account.account_id.clone(), account.clone());
        Ok(account)
    }

    async fn find_account(&self, account_id: &str) -> Result<Option<AccountDoc>> {
        Ok(self
            .accounts
            .get(account_id)
            .filter(|a| !a.metadata.is_deleted)
            .map(|a| a.clone()))
    }

    async fn list_accounts(
        &self,
        company_id: &str,
        kind: Option<AccountKind>,
    ) -> Result<Vec<AccountDoc>> {
        let mut rows: Vec<AccountDoc> = self
            .accounts
            .iter()
            .filter(|a| !a.metadata.is_deleted)
            .filter(|a| a.company_id.as_deref() == Some(company_id))
            .filter(|a| kind.map(|k| a.kind == k).unwrap_or(true))
            .map(|a| a.clone())
            .collect();
        rows.sort_by_key(|a| a.metadata.created_at);
        Ok(rows)
    }

    async fn count_accounts(&self, company_id: &str, kind: AccountKind) -> Result<u64> {
        Ok(self
            .accounts
            .iter()
            .filter(|a| !a.metadata.is_deleted)
            .filter(|a| a.company_id.as_deref() == Some(company_id) && a.kind == kind)
            .count() as u64)
    }

    async fn find_main_account(&self, company_id: &str) -> Result<Option<AccountDoc>> {
        Ok(self
            .accounts
            .iter()
            .filter(|a| a.is_live())
            .find(|a| {
                a.kind == AccountKind::MainAccount && a.company_id.as_deref() == Some(company_id)
            })
            .map(|a| a.clone()))
    }

    async fn count_active_children(&self, account_id: &str) -> Result<u64> {
        Ok(self
            .accounts
            .iter()
            .filter(|a| a.is_live())
            .filter(|a| a.parent_account_id.as_deref() == Some(account_id))
            .count() as u64)
    }

    async fn set_account_active(&self, account_id: &str, active: bool) -> Result<()> {
        if let Some(mut account) = self.accounts.get_mut(account_id) {
            account.is_active = active;
            account.metadata.touch();
        }
        Ok(())
    }

    async fn delete_account(&self, account_id: &str) -> Result<()> {
        if let Some(mut account) = self.accounts.get_mut(account_id) {
            account.metadata.mark_deleted();
        }
        Ok(())
    }

    async fn insert_subscription(
        &self,
        mut subscription: SubscriptionDoc,
    ) -> Result<SubscriptionDoc> {
        stamp(&mut subscription.metadata);
        self.subscriptions
            .insert(subscription.subscription_id.clone(), subscription.clone());
        Ok(subscription)
    }

    async fn latest_subscription(&self, company_id: &str) -> Result<Option<SubscriptionDoc>> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|s| !s.metadata.is_deleted && s.company_id == company_id)
            .max_by_key(|s| s.metadata.created_at)
            .map(|s| s.clone()))
    }

    async fn find_connection(&self, from: &str, to: &str) -> Result<Option<ConnectionDoc>> {
        Ok(self
            .connections
            .get(&(from.to_string(), to.to_string()))
            .filter(|c| !c.metadata.is_deleted)
            .map(|c| c.clone()))
    }

    async fn upsert_connection(&self, mut edge: ConnectionDoc) -> Result<ConnectionDoc> {
        let key = (edge.from_account_id.clone(), edge.to_account_id.clone());
        let entry = self.connections.entry(key);
        let updated = match entry {
            Entry::Occupied(mut existing) => {
                let stored = existing.get_mut();
                stored.connection_type = edge.connection_type;
                stored.relationship_type = edge.relationship_type;
                stored.permissions = edge.permissions.clone();
                stored.status = edge.status;
                stored.metadata.touch();
                stored.clone()
            }
            Entry::Vacant(slot) => {
                stamp(&mut edge.metadata);
                slot.insert(edge.clone());
                edge
            }
        };
        Ok(updated)
    }

    async fn set_connection_status(
        &self,
        from: &str,
        to: &str,
        status: ConnectionStatus,
    ) -> Result<bool> {
        match self
            .connections
            .get_mut(&(from.to_string(), to.to_string()))
        {
            Some(mut edge) if !edge.metadata.is_deleted => {
                edge.status = status;
                edge.metadata.touch();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn touch_connection(&self, from: &str, to: &str) -> Result<()> {
        if let Some(mut edge) = self
            .connections
            .get_mut(&(from.to_string(), to.to_string()))
        {
            edge.last_interaction_at = Some(DateTime::now());
            edge.metadata.touch();
        }
        Ok(())
    }

    async fn list_connections_from(&self, from: &str) -> Result<Vec<ConnectionDoc>> {
        let mut rows: Vec<ConnectionDoc> = self
            .connections
            .iter()
            .filter(|c| !c.metadata.is_deleted && c.from_account_id == from)
            .map(|c| c.clone())
            .collect();
        rows.sort_by(|a, b| a.to_account_id.cmp(&b.to_account_id));
        Ok(rows)
    }

    async fn insert_message(&self, mut message: MessageDoc) -> Result<MessageDoc> {
        stamp(&mut message.metadata);
        self.messages
            .insert(message.message_id.clone(), message.clone());
        Ok(message)
    }

    async fn find_message(&self, message_id: &str) -> Result<Option<MessageDoc>> {
        Ok(self
            .messages
            .get(message_id)
            .filter(|m| !m.metadata.is_deleted)
            .map(|m| m.clone()))
    }

    async fn mark_message_read(&self, message_id: &str) -> Result<()> {
        if let Some(mut message) = self.messages.get_mut(message_id) {
            message.read = true;
            message.metadata.touch();
        }
        Ok(())
    }

    async fn list_messages_between(&self, a: &str, b: &str) -> Result<Vec<MessageDoc>> {
        let mut rows: Vec<MessageDoc> = self
            .messages
            .iter()
            .filter(|m| !m.metadata.is_deleted)
            .filter(|m| {
                (m.from_account_id == a && m.to_account_id == b)
                    || (m.from_account_id == b && m.to_account_id == a)
            })
            .map(|m| m.clone())
            .collect();
        rows.sort_by_key(|m| m.metadata.created_at);
        Ok(rows)
    }

    async fn count_unread(&self, account_id: &str) -> Result<u64> {
        Ok(self
            .messages
            .iter()
            .filter(|m| !m.metadata.is_deleted)
            .filter(|m| m.to_account_id == account_id && !m.read)
            .count() as u64)
    }

    async fn insert_task(&self, mut task: TaskDoc) -> Result<TaskDoc> {
        stamp(&mut task.metadata);
        self.tasks.insert(task.task_id.clone(), task.clone());
        Ok(task)
    }

    async fn find_task(&self, task_id: &str) -> Result<Option<TaskDoc>> {
        Ok(self
            .tasks
            .get(task_id)
            .filter(|t| !t.metadata.is_deleted)
            .map(|t| t.clone()))
    }

    async fn set_task_status(
        &self,
        task_id: &str,
        status: TaskStatus,
        feedback: Option<String>,
    ) -> Result<()> {
        if let Some(mut task) = self.tasks.get_mut(task_id) {
            task.status = status;
            if feedback.is_some() {
                task.feedback = feedback;
            }
            task.metadata.touch();
        }
        Ok(())
    }

    async fn list_tasks_for(&self, assignee: &str) -> Result<Vec<TaskDoc>> {
        let mut rows: Vec<TaskDoc> = self
            .tasks
            .iter()
            .filter(|t| !t.metadata.is_deleted && t.to_account_id == assignee)
            .map(|t| t.clone())
            .collect();
        rows.sort_by_key(|t| std::cmp::Reverse(t.metadata.created_at));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::{ConnectionType, InteractionPermission, RelationshipType};

    #[tokio::test]
    async fn test_soft_deleted_accounts_invisible() {
        let store = MemoryDirectory::new();
        let account = store
            .insert_account(AccountDoc::new(
                AccountKind::Employee,
                Some("c1".into()),
                "Dana".into(),
            ))
            .await
            .unwrap();

        assert!(store.find_account(&account.account_id).await.unwrap().is_some());
        store.delete_account(&account.account_id).await.unwrap();
        assert!(store.find_account(&account.account_id).await.unwrap().is_none());
        assert_eq!(
            store
                .count_accounts("c1", AccountKind::Employee)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_latest_subscription_wins() {
        let store = MemoryDirectory::new();
        let old = store
            .insert_subscription(SubscriptionDoc::new("c1".into(), "starter".into(), 2, 10))
            .await
            .unwrap();
        // Force a strictly older creation time on the first row
        if let Some(mut row) = store.subscriptions.get_mut(&old.subscription_id) {
            row.metadata.created_at =
                Some(bson::DateTime::from_millis(DateTime::now().timestamp_millis() - 60_000));
        }
        store
            .insert_subscription(SubscriptionDoc::new("c1".into(), "growth".into(), 5, 50))
            .await
            .unwrap();

        let latest = store.latest_subscription("c1").await.unwrap().unwrap();
        assert_eq!(latest.plan, "growth");
        assert_eq!(latest.max_sub_accounts, 5);
    }

    #[tokio::test]
    async fn test_upsert_connection_replaces_in_place() {
        let store = MemoryDirectory::new();
        let first = ConnectionDoc::new(
            Some("c1".into()),
            "a".into(),
            "b".into(),
            ConnectionType::Direct,
            RelationshipType::Hierarchy,
            InteractionPermission::full_set(),
        );
        store.upsert_connection(first).await.unwrap();

        let mut second = ConnectionDoc::new(
            Some("c1".into()),
            "a".into(),
            "b".into(),
            ConnectionType::Direct,
            RelationshipType::Peer,
            std::collections::BTreeSet::from([InteractionPermission::Message]),
        );
        second.status = ConnectionStatus::Inactive;
        store.upsert_connection(second).await.unwrap();

        let stored = store.find_connection("a", "b").await.unwrap().unwrap();
        assert_eq!(stored.status, ConnectionStatus::Inactive);
        assert_eq!(stored.permissions.len(), 1);
        assert_eq!(store.connections.len(), 1);
    }

    #[tokio::test]
    async fn test_messages_between_is_bidirectional() {
        let store = MemoryDirectory::new();
        for (from, to) in [("a", "b"), ("b", "a"), ("a", "c")] {
            store
                .insert_message(MessageDoc::new(
                    Some("c1".into()),
                    from.into(),
                    to.into(),
                    "hi".into(),
                    Default::default(),
                    None,
                ))
                .await
                .unwrap();
        }
        assert_eq!(store.list_messages_between("a", "b").await.unwrap().len(), 2);
        assert_eq!(store.count_unread("a").await.unwrap(), 1);
        assert_eq!(store.count_unread("b").await.unwrap(), 1);
    }
}
