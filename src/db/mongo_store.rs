//! MongoDB-backed directory store
//!
//! Collections are created (and indexed) once at connect time. Edge
//! upserts go through a single `update_one(upsert)` so concurrent writers
//! of the same ordered pair resolve last-writer-wins on one row.

use async_trait::async_trait;
use bson::{doc, Bson, DateTime};

use crate::db::mongo::{MongoClient, MongoCollection};
use crate::db::schemas::{
    AccountDoc, AccountKind, ConnectionDoc, ConnectionStatus, MessageDoc, SubscriptionDoc,
    TaskDoc, TaskStatus, ACCOUNT_COLLECTION, CONNECTION_COLLECTION, MESSAGE_COLLECTION,
    SUBSCRIPTION_COLLECTION, TASK_COLLECTION,
};
use crate::db::store::DirectoryStore;
use crate::error::{PorterError, Result};

fn to_bson<T: serde::Serialize>(value: &T) -> Result<Bson> {
    bson::to_bson(value).map_err(|e| PorterError::Database(format!("BSON encode failed: {e}")))
}

/// MongoDB implementation of [`DirectoryStore`]
#[derive(Clone)]
pub struct MongoDirectory {
    accounts: MongoCollection<AccountDoc>,
    subscriptions: MongoCollection<SubscriptionDoc>,
    connections: MongoCollection<ConnectionDoc>,
    messages: MongoCollection<MessageDoc>,
    tasks: MongoCollection<TaskDoc>,
}

impl MongoDirectory {
    /// Open all collections and apply their indexes
    pub async fn connect(client: &MongoClient) -> Result<Self> {
        Ok(Self {
            accounts: client.collection(ACCOUNT_COLLECTION).await?,
            subscriptions: client.collection(SUBSCRIPTION_COLLECTION).await?,
            connections: client.collection(CONNECTION_COLLECTION).await?,
            messages: client.collection(MESSAGE_COLLECTION).await?,
            tasks: client.collection(TASK_COLLECTION).await?,
        })
    }
}

#[async_trait]
impl DirectoryStore for MongoDirectory {
    async fn insert_account(&self, account: AccountDoc) -> Result<AccountDoc> {
        self.accounts.insert_one(account).await
    }

    async fn find_account(&self, account_id: &str) -> Result<Option<AccountDoc>> {
        self.accounts
            .find_one(doc! { "account_id": account_id })
            .await
    }

    async fn list_accounts(
        &self,
        company_id: &str,
        kind: Option<AccountKind>,
    ) -> Result<Vec<AccountDoc>> {
        let mut filter = doc! { "company_id": company_id };
        if let Some(kind) = kind {
            filter.insert("kind", kind.as_str());
        }
        self.accounts
            .find_many(filter, Some(doc! { "metadata.created_at": 1 }))
            .await
    }

    async fn count_accounts(&self, company_id: &str, kind: AccountKind) -> Result<u64> {
        self.accounts
            .count(doc! { "company_id": company_id, "kind": kind.as_str() })
            .await
    }

    async fn find_main_account(&self, company_id: &str) -> Result<Option<AccountDoc>> {
        self.accounts
            .find_one(doc! {
                "company_id": company_id,
                "kind": AccountKind::MainAccount.as_str(),
                "is_active": true,
            })
            .await
    }

    async fn count_active_children(&self, account_id: &str) -> Result<u64> {
        self.accounts
            .count(doc! { "parent_account_id": account_id, "is_active": true })
            .await
    }

    async fn set_account_active(&self, account_id: &str, active: bool) -> Result<()> {
        self.accounts
            .update_one(
                doc! { "account_id": account_id },
                doc! { "$set": { "is_active": active, "metadata.updated_at": DateTime::now() } },
            )
            .await?;
        Ok(())
    }

    async fn delete_account(&self, account_id: &str) -> Result<()> {
        self.accounts
            .soft_delete(doc! { "account_id": account_id })
            .await?;
        Ok(())
    }

    async fn insert_subscription(&self, subscription: SubscriptionDoc) -> Result<SubscriptionDoc> {
        self.subscriptions.insert_one(subscription).await
    }

    async fn latest_subscription(&self, company_id: &str) -> Result<Option<SubscriptionDoc>> {
        self.subscriptions
            .find_one_sorted(
                doc! { "company_id": company_id },
                doc! { "metadata.created_at": -1 },
            )
            .await
    }

    async fn find_connection(&self, from: &str, to: &str) -> Result<Option<ConnectionDoc>> {
        self.connections
            .find_one(doc! { "from_account_id": from, "to_account_id": to })
            .await
    }

    async fn upsert_connection(&self, edge: ConnectionDoc) -> Result<ConnectionDoc> {
        let filter = doc! {
            "from_account_id": &edge.from_account_id,
            "to_account_id": &edge.to_account_id,
        };

        let mut set_on_insert = doc! { "metadata.created_at": DateTime::now() };
        if let Some(company_id) = &edge.company_id {
            set_on_insert.insert("company_id", company_id);
        }

        let update = doc! {
            "$set": {
                "connection_type": to_bson(&edge.connection_type)?,
                "relationship_type": to_bson(&edge.relationship_type)?,
                "permissions": to_bson(&edge.permissions)?,
                "status": to_bson(&edge.status)?,
                "metadata.is_deleted": false,
                "metadata.updated_at": DateTime::now(),
            },
            "$setOnInsert": set_on_insert,
        };

        self.connections.upsert_one(filter, update).await?;

        self.find_connection(&edge.from_account_id, &edge.to_account_id)
            .await?
            .ok_or_else(|| PorterError::Database("upserted connection not readable".into()))
    }

    async fn set_connection_status(
        &self,
        from: &str,
        to: &str,
        status: ConnectionStatus,
    ) -> Result<bool> {
        let result = self
            .connections
            .update_one(
                doc! { "from_account_id": from, "to_account_id": to },
                doc! { "$set": {
                    "status": to_bson(&status)?,
                    "metadata.updated_at": DateTime::now(),
                } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn touch_connection(&self, from: &str, to: &str) -> Result<()> {
        self.connections
            .update_one(
                doc! { "from_account_id": from, "to_account_id": to },
                doc! { "$set": {
                    "last_interaction_at": DateTime::now(),
                    "metadata.updated_at": DateTime::now(),
                } },
            )
            .await?;
        Ok(())
    }

    async fn list_connections_from(&self, from: &str) -> Result<Vec<ConnectionDoc>> {
        self.connections
            .find_many(doc! { "from_account_id": from }, None)
            .await
    }

    async fn insert_message(&self, message: MessageDoc) -> Result<MessageDoc> {
        self.messages.insert_one(message).await
    }

    async fn find_message(&self, message_id: &str) -> Result<Option<MessageDoc>> {
        self.messages
            .find_one(doc! { "message_id": message_id })
            .await
    }

    async fn mark_message_read(&self, message_id: &str) -> Result<()> {
        self.messages
            .update_one(
                doc! { "message_id": message_id },
                doc! { "$set": { "read": true, "metadata.updated_at": DateTime::now() } },
            )
            .await?;
        Ok(())
    }

    async fn list_messages_between(&self, a: &str, b: &str) -> Result<Vec<MessageDoc>> {
        self.messages
            .find_many(
                doc! { "$or": [
                    { "from_account_id": a, "to_account_id": b },
                    { "from_account_id": b, "to_account_id": a },
                ] },
                Some(doc! { "metadata.created_at": 1 }),
            )
            .await
    }

    async fn count_unread(&self, account_id: &str) -> Result<u64> {
        self.messages
            .count(doc! { "to_account_id": account_id, "read": false })
            .await
    }

    async fn insert_task(&self, task: TaskDoc) -> Result<TaskDoc> {
        self.tasks.insert_one(task).await
    }

    async fn find_task(&self, task_id: &str) -> Result<Option<TaskDoc>> {
        self.tasks.find_one(doc! { "task_id": task_id }).await
    }

    async fn set_task_status(
        &self,
        task_id: &str,
        status: TaskStatus,
        feedback: Option<String>,
    ) -> Result<()> {
        let mut set = doc! {
            "status": to_bson(&status)?,
            "metadata.updated_at": DateTime::now(),
        };
        if let Some(feedback) = feedback {
            set.insert("feedback", feedback);
        }
        self.tasks
            .update_one(doc! { "task_id": task_id }, doc! { "$set": set })
            .await?;
        Ok(())
    }

    async fn list_tasks_for(&self, assignee: &str) -> Result<Vec<TaskDoc>> {
        self.tasks
            .find_many(
                doc! { "to_account_id": assignee },
                Some(doc! { "metadata.created_at": -1 }),
            )
            .await
    }
}
