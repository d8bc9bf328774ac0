//! Connection edge schema
//!
//! A connection is a directed, permission-scoped edge between two
//! accounts. Granting `A -> B` says nothing about `B -> A`; every
//! interaction check reads the edge in the initiator's direction. Edges
//! are deactivated, never hard-deleted.

use bson::{doc, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for connection edges
pub const CONNECTION_COLLECTION: &str = "connections";

/// How the edge came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    /// Provisioned or explicitly created between the two accounts
    Direct,
    /// Derived through an intermediary
    Indirect,
}

/// Organizational shape of the relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// Parent/child provisioning link
    Hierarchy,
    /// Same-level accounts
    Peer,
    /// Accounts in different departments
    CrossDepartment,
}

/// Edge lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Active,
    Inactive,
}

/// The closed set of edge-scoped interaction grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionPermission {
    /// May send messages along this edge
    Message,
    /// May assign tasks along this edge
    TaskAssign,
    /// May push status updates along this edge
    StatusSync,
}

impl InteractionPermission {
    /// Wire name, used in permission-denied messages
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionPermission::Message => "message",
            InteractionPermission::TaskAssign => "task_assign",
            InteractionPermission::StatusSync => "status_sync",
        }
    }

    /// All three grants, used when provisioning hierarchy edges
    pub fn full_set() -> BTreeSet<InteractionPermission> {
        BTreeSet::from([
            InteractionPermission::Message,
            InteractionPermission::TaskAssign,
            InteractionPermission::StatusSync,
        ])
    }
}

impl fmt::Display for InteractionPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection edge document, unique per ordered `(from, to)` pair
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ConnectionDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<bson::oid::ObjectId>,

    /// Common metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Company shared by both endpoints; absent for developer pairs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    /// Initiating endpoint
    pub from_account_id: String,

    /// Receiving endpoint
    pub to_account_id: String,

    pub connection_type: ConnectionType,

    pub relationship_type: RelationshipType,

    /// Edge-scoped grants; checked per interaction, never inferred
    pub permissions: BTreeSet<InteractionPermission>,

    pub status: ConnectionStatus,

    /// Last time a gated interaction crossed this edge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_interaction_at: Option<DateTime>,
}

impl ConnectionDoc {
    /// Create an active edge between two accounts
    pub fn new(
        company_id: Option<String>,
        from_account_id: String,
        to_account_id: String,
        connection_type: ConnectionType,
        relationship_type: RelationshipType,
        permissions: BTreeSet<InteractionPermission>,
    ) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            company_id,
            from_account_id,
            to_account_id,
            connection_type,
            relationship_type,
            permissions,
            status: ConnectionStatus::Active,
            last_interaction_at: None,
        }
    }

    /// Whether this edge currently grants the permission
    pub fn grants(&self, permission: InteractionPermission) -> bool {
        self.status == ConnectionStatus::Active
            && !self.metadata.is_deleted
            && self.permissions.contains(&permission)
    }
}

impl IntoIndexes for ConnectionDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // One edge per ordered pair
            (
                doc! { "from_account_id": 1, "to_account_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("edge_unique".to_string())
                        .build(),
                ),
            ),
            // Per-company edge listings
            (
                doc! { "company_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("company_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for ConnectionDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_set_has_all_three() {
        let set = InteractionPermission::full_set();
        assert_eq!(set.len(), 3);
        assert!(set.contains(&InteractionPermission::Message));
        assert!(set.contains(&InteractionPermission::TaskAssign));
        assert!(set.contains(&InteractionPermission::StatusSync));
    }

    #[test]
    fn test_inactive_edge_grants_nothing() {
        let mut edge = ConnectionDoc::new(
            Some("c1".into()),
            "a".into(),
            "b".into(),
            ConnectionType::Direct,
            RelationshipType::Hierarchy,
            InteractionPermission::full_set(),
        );
        assert!(edge.grants(InteractionPermission::Message));

        edge.status = ConnectionStatus::Inactive;
        assert!(!edge.grants(InteractionPermission::Message));
    }

    #[test]
    fn test_partial_grant() {
        let edge = ConnectionDoc::new(
            Some("c1".into()),
            "a".into(),
            "b".into(),
            ConnectionType::Direct,
            RelationshipType::Peer,
            BTreeSet::from([InteractionPermission::Message]),
        );
        assert!(edge.grants(InteractionPermission::Message));
        assert!(!edge.grants(InteractionPermission::TaskAssign));
    }
}
