//! Message document schema
//!
//! A message conceptually belongs to the connection edge it crossed; the
//! edge gates are checked before any row is written.

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for messages
pub const MESSAGE_COLLECTION: &str = "messages";

/// Message payload kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Text,
    /// Accompanies a task assignment
    Task,
    /// Platform-generated notice
    System,
}

/// Message document
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MessageDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<bson::oid::ObjectId>,

    /// Common metadata; `created_at` is the send time
    #[serde(default)]
    pub metadata: Metadata,

    /// Stable logical identifier (UUID string)
    pub message_id: String,

    /// Sender's company; absent for developer-to-developer traffic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    /// Sending account
    pub from_account_id: String,

    /// Receiving account
    pub to_account_id: String,

    pub body: String,

    #[serde(default)]
    pub message_type: MessageType,

    /// Task this message accompanies, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_task_id: Option<String>,

    /// Whether the recipient has marked the message read
    #[serde(default)]
    pub read: bool,
}

impl MessageDoc {
    /// Create an unread message
    pub fn new(
        company_id: Option<String>,
        from_account_id: String,
        to_account_id: String,
        body: String,
        message_type: MessageType,
        related_task_id: Option<String>,
    ) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            message_id: uuid::Uuid::new_v4().to_string(),
            company_id,
            from_account_id,
            to_account_id,
            body,
            message_type,
            related_task_id,
            read: false,
        }
    }
}

impl IntoIndexes for MessageDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "message_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("message_id_unique".to_string())
                        .build(),
                ),
            ),
            // Unread-count lookups
            (
                doc! { "to_account_id": 1, "read": 1 },
                Some(
                    IndexOptions::builder()
                        .name("recipient_read_index".to_string())
                        .build(),
                ),
            ),
            // Conversation listings
            (
                doc! { "from_account_id": 1, "to_account_id": 1, "metadata.created_at": 1 },
                Some(
                    IndexOptions::builder()
                        .name("conversation_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for MessageDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
