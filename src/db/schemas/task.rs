//! Task assignment document schema
//!
//! `requirements` and `attachments` are opaque consumer-defined payloads;
//! the core stores them without interpreting their shape.

use bson::{doc, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for task assignments
pub const TASK_COLLECTION: &str = "tasks";

/// HR workflow category of the task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Recruitment,
    Performance,
    Training,
    Administrative,
}

/// Assignment priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Assignment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Rejected,
}

impl TaskStatus {
    /// Whether the status admits further assignee transitions
    pub fn is_open(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Task assignment document
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TaskDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<bson::oid::ObjectId>,

    /// Common metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Stable logical identifier (UUID string)
    pub task_id: String,

    /// Assigner's company; absent for developer pairs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    /// Assigning account
    pub from_account_id: String,

    /// Assignee account; only this account may transition the status
    pub to_account_id: String,

    pub task_type: TaskType,

    pub title: String,

    pub description: String,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime>,

    /// Reference to an external resource (candidate, review cycle, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_resource_id: Option<String>,

    /// Opaque consumer-defined requirements payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<serde_json::Value>,

    /// Opaque consumer-defined attachments payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<serde_json::Value>,

    pub status: TaskStatus,

    /// Assignee feedback recorded alongside status transitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl IntoIndexes for TaskDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "task_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("task_id_unique".to_string())
                        .build(),
                ),
            ),
            // Assignee work queues
            (
                doc! { "to_account_id": 1, "status": 1 },
                Some(
                    IndexOptions::builder()
                        .name("assignee_status_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for TaskDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_statuses() {
        assert!(TaskStatus::Pending.is_open());
        assert!(TaskStatus::InProgress.is_open());
        assert!(!TaskStatus::Completed.is_open());
        assert!(!TaskStatus::Cancelled.is_open());
        assert!(!TaskStatus::Rejected.is_open());
    }
}
