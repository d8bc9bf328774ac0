//! Task assignment between connected accounts
//!
//! Assignments pass the same gate sequence as messages, against the
//! `task_assign` grant. Status transitions are deliberately loose: the
//! assignee may move an open task to any of the four non-pending
//! statuses; closed tasks stay closed. Callers needing a stricter
//! workflow layer it above this service.

use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::auth::capability::Capability;
use crate::auth::claims::IdentityClaim;
use crate::auth::resolver::PermissionResolver;
use crate::db::schemas::{
    InteractionPermission, Metadata, TaskDoc, TaskPriority, TaskStatus, TaskType,
};
use crate::db::store::DirectoryStore;
use crate::error::{PorterError, Result};
use crate::graph::ConnectionGraph;

/// Request to assign a task
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTaskRequest {
    pub to_account_id: String,
    pub task_type: TaskType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<bson::DateTime>,
    #[serde(default)]
    pub linked_resource_id: Option<String>,
    /// Opaque consumer-defined payload
    #[serde(default)]
    pub requirements: Option<serde_json::Value>,
    /// Opaque consumer-defined payload
    #[serde(default)]
    pub attachments: Option<serde_json::Value>,
}

/// Task assignment operations
pub struct TaskService {
    store: Arc<dyn DirectoryStore>,
    graph: Arc<ConnectionGraph>,
    resolver: Arc<PermissionResolver>,
}

impl TaskService {
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

    /// Assign a task from the claim's account; lands as `pending`
    pub async fn assign_task(
        &self,
        claim: &IdentityClaim,
        request: AssignTaskRequest,
    ) -> Result<TaskDoc> {
        self.resolver.require(Some(claim), Capability::AssignTasks)?;

        let (from, _to) = self
            .graph
            .authorize_interaction(
                &claim.account_id,
                &request.to_account_id,
                InteractionPermission::TaskAssign,
            )
            .await?;

        let task = TaskDoc {
            _id: None,
            metadata: Metadata::new(),
            task_id: uuid::Uuid::new_v4().to_string(),
            company_id: from.company_id.clone(),
            from_account_id: from.account_id.clone(),
            to_account_id: request.to_account_id.clone(),
            task_type: request.task_type,
            title: request.title,
            description: request.description,
            priority: request.priority,
            due_date: request.due_date,
            linked_resource_id: request.linked_resource_id,
            requirements: request.requirements,
            attachments: request.attachments,
            status: TaskStatus::Pending,
            feedback: None,
        };
        let task = self.store.insert_task(task).await?;
        self.store
            .touch_connection(&task.from_account_id, &task.to_account_id)
            .await?;

        info!(
            task_id = %task.task_id,
            from = %task.from_account_id,
            to = %task.to_account_id,
            "task assigned"
        );
        Ok(task)
    }

    /// Transition a task's status; assignees only. Open tasks accept any
    /// non-pending target; closed tasks reject further transitions.
    pub async fn update_task_status(
        &self,
        claim: &IdentityClaim,
        task_id: &str,
        new_status: TaskStatus,
        feedback: Option<String>,
    ) -> Result<TaskDoc> {
        let mut task = self
            .store
            .find_task(task_id)
            .await?
            .ok_or_else(|| PorterError::NotFound(format!("task '{task_id}'")))?;

        if task.to_account_id != claim.account_id {
            return Err(PorterError::Forbidden {
                reason: "only the assignee may update a task's status".into(),
            });
        }
        if new_status == TaskStatus::Pending {
            return Err(PorterError::InvalidRequest(
                "tasks cannot transition back to pending".into(),
            ));
        }
        if !task.status.is_open() {
            return Err(PorterError::InvalidRequest(format!(
                "task is already {}",
                task.status
            )));
        }

        self.store
            .set_task_status(task_id, new_status, feedback.clone())
            .await?;

        task.status = new_status;
        if feedback.is_some() {
            task.feedback = feedback;
        }
        info!(task_id = %task.task_id, status = %task.status, "task status updated");
        Ok(task)
    }

    /// Tasks assigned to the caller, newest first
    pub async fn tasks_for(&self, claim: &IdentityClaim) -> Result<Vec<TaskDoc>> {
        self.store.list_tasks_for(&claim.account_id).await
    }
}
