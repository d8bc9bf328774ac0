//! Connection graph manager
//!
//! Structural eligibility (which account kinds may connect at all) and
//! edge-scoped grants (what a specific stored edge permits) are separate
//! questions; interactions must pass both. Edges are directed: the check
//! always reads `initiator -> recipient`, and granting one direction
//! implies nothing about the other.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::capability::Capability;
use crate::auth::claims::IdentityClaim;
use crate::auth::resolver::PermissionResolver;
use crate::db::schemas::{
    AccountDoc, AccountKind, ConnectionDoc, ConnectionStatus, ConnectionType,
    InteractionPermission, RelationshipType,
};
use crate::db::store::DirectoryStore;
use crate::error::{PorterError, Result};

/// Request to create or refresh an edge
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertConnectionRequest {
    pub from_account_id: String,
    pub to_account_id: String,
    pub connection_type: ConnectionType,
    pub relationship_type: RelationshipType,
    pub permissions: BTreeSet<InteractionPermission>,
}

/// Directed, permission-scoped edges between accounts
pub struct ConnectionGraph {
    store: Arc<dyn DirectoryStore>,
    resolver: Arc<PermissionResolver>,
}

impl ConnectionGraph {
    pub fn new(store: Arc<dyn DirectoryStore>, resolver: Arc<PermissionResolver>) -> Self {
        Self { store, resolver }
    }

    /// The eligibility matrix, independent of any stored edge:
    /// developer pairs connect, developers never connect to company
    /// accounts, employees never connect to each other, and everything
    /// else requires a shared company.
    pub fn eligible(a: &AccountDoc, b: &AccountDoc) -> bool {
        match (a.kind, b.kind) {
            (AccountKind::Developer, AccountKind::Developer) => true,
            (AccountKind::Developer, _) | (_, AccountKind::Developer) => false,
            (AccountKind::Employee, AccountKind::Employee) => false,
            _ => match (&a.company_id, &b.company_id) {
                (Some(left), Some(right)) => left == right,
                _ => false,
            },
        }
    }

    /// Whether the two accounts are structurally eligible to connect
    pub async fn can_connect(&self, from_id: &str, to_id: &str) -> Result<bool> {
        if from_id == to_id {
            return Ok(false);
        }
        let (from, to) = self.load_pair(from_id, to_id).await?;
        Ok(from.is_live() && to.is_live() && Self::eligible(&from, &to))
    }

    /// Whether the stored, active edge `from -> to` grants the
    /// permission. No edge, or an inactive one, denies unconditionally.
    pub async fn has_permission(
        &self,
        from_id: &str,
        to_id: &str,
        permission: InteractionPermission,
    ) -> Result<bool> {
        Ok(self
            .store
            .find_connection(from_id, to_id)
            .await?
            .map(|edge| edge.grants(permission))
            .unwrap_or(false))
    }

    /// Create or refresh an edge on behalf of an authorized account
    pub async fn upsert(
        &self,
        claim: &IdentityClaim,
        request: UpsertConnectionRequest,
    ) -> Result<ConnectionDoc> {
        self.resolver
            .require(Some(claim), Capability::ManageConnections)?;

        let (from, _to) = self
            .check_connectable(&request.from_account_id, &request.to_account_id)
            .await?;

        // Company callers may only manage edges inside their own company
        if claim.is_company_scoped() && !claim.company_matches(from.company_id.as_deref()) {
            return Err(PorterError::NotFound(format!(
                "account '{}'",
                request.from_account_id
            )));
        }

        let edge = ConnectionDoc::new(
            from.company_id.clone(),
            request.from_account_id,
            request.to_account_id,
            request.connection_type,
            request.relationship_type,
            request.permissions,
        );
        let edge = self.store.upsert_connection(edge).await?;
        debug!(
            from = %edge.from_account_id,
            to = %edge.to_account_id,
            "connection upserted"
        );
        Ok(edge)
    }

    /// Revoke an edge. Edges are deactivated, never removed.
    pub async fn deactivate(
        &self,
        claim: &IdentityClaim,
        from_id: &str,
        to_id: &str,
    ) -> Result<()> {
        self.resolver
            .require(Some(claim), Capability::ManageConnections)?;

        let (from, _to) = self.load_pair(from_id, to_id).await?;
        if claim.is_company_scoped() && !claim.company_matches(from.company_id.as_deref()) {
            return Err(PorterError::NotFound(format!("account '{from_id}'")));
        }

        let found = self
            .store
            .set_connection_status(from_id, to_id, ConnectionStatus::Inactive)
            .await?;
        if !found {
            return Err(PorterError::NotFound(format!(
                "connection '{from_id}' -> '{to_id}'"
            )));
        }
        Ok(())
    }

    /// Outbound edges of an account: callers see their own; managing
    /// someone else's requires the connection capability and tenancy
    pub async fn connections_from(
        &self,
        claim: &IdentityClaim,
        account_id: &str,
    ) -> Result<Vec<ConnectionDoc>> {
        if claim.account_id != account_id {
            self.resolver
                .require(Some(claim), Capability::ManageConnections)?;
            let account = self
                .store
                .find_account(account_id)
                .await?
                .ok_or_else(|| PorterError::NotFound(format!("account '{account_id}'")))?;
            if claim.is_company_scoped() && !claim.company_matches(account.company_id.as_deref()) {
                return Err(PorterError::NotFound(format!("account '{account_id}'")));
            }
        }
        self.store.list_connections_from(account_id).await
    }

    /// Provisioning path: parent -> child hierarchy edge carrying all
    /// three interaction grants
    pub(crate) async fn link_hierarchy(
        &self,
        parent: &AccountDoc,
        child: &AccountDoc,
    ) -> Result<ConnectionDoc> {
        let edge = ConnectionDoc::new(
            child.company_id.clone(),
            parent.account_id.clone(),
            child.account_id.clone(),
            ConnectionType::Direct,
            RelationshipType::Hierarchy,
            InteractionPermission::full_set(),
        );
        self.store.upsert_connection(edge).await
    }

    /// The full interaction gate: structural eligibility, then the
    /// edge-scoped grant. Returns the loaded endpoints so callers can
    /// stamp company and sender fields without re-reading.
    pub(crate) async fn authorize_interaction(
        &self,
        from_id: &str,
        to_id: &str,
        permission: InteractionPermission,
    ) -> Result<(AccountDoc, AccountDoc)> {
        let pair = self.check_connectable(from_id, to_id).await?;

        if !self.has_permission(from_id, to_id, permission).await? {
            warn!(
                from = %from_id,
                to = %to_id,
                permission = %permission,
                "interaction denied by edge grant"
            );
            return Err(PorterError::PermissionDenied {
                capability: permission.as_str().to_string(),
            });
        }

        Ok(pair)
    }

    async fn check_connectable(
        &self,
        from_id: &str,
        to_id: &str,
    ) -> Result<(AccountDoc, AccountDoc)> {
        if from_id == to_id {
            return Err(PorterError::InvalidRequest(
                "an account cannot connect to itself".into(),
            ));
        }

        let (from, to) = self.load_pair(from_id, to_id).await?;
        if !from.is_live() || !to.is_live() || !Self::eligible(&from, &to) {
            return Err(PorterError::NotConnectable {
                from: from_id.to_string(),
                to: to_id.to_string(),
            });
        }
        Ok((from, to))
    }

    async fn load_pair(&self, from_id: &str, to_id: &str) -> Result<(AccountDoc, AccountDoc)> {
        let from = self
            .store
            .find_account(from_id)
            .await?
            .ok_or_else(|| PorterError::NotFound(format!("account '{from_id}'")))?;
        let to = self
            .store
            .find_account(to_id)
            .await?
            .ok_or_else(|| PorterError::NotFound(format!("account '{to_id}'")))?;
        Ok((from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryDirectory;

    fn account(kind: AccountKind, company: Option<&str>, name: &str) -> AccountDoc {
        AccountDoc::new(kind, company.map(str::to_string), name.to_string())
    }

    async fn graph_with_store() -> (Arc<dyn DirectoryStore>, ConnectionGraph) {
        let store = Arc::new(MemoryDirectory::new()) as Arc<dyn DirectoryStore>;
        let graph = ConnectionGraph::new(store.clone(), Arc::new(PermissionResolver::builtin()));
        (store, graph)
    }

    #[test]
    fn test_eligibility_matrix() {
        let main = account(AccountKind::MainAccount, Some("c1"), "main");
        let sub = account(AccountKind::SubAccount, Some("c1"), "sub");
        let emp1 = account(AccountKind::Employee, Some("c1"), "e1");
        let emp2 = account(AccountKind::Employee, Some("c1"), "e2");
        let other_sub = account(AccountKind::SubAccount, Some("c2"), "sub2");
        let dev1 = account(AccountKind::Developer, None, "d1");
        let dev2 = account(AccountKind::Developer, None, "d2");

        // same-company pairings
        assert!(ConnectionGraph::eligible(&main, &sub));
        assert!(ConnectionGraph::eligible(&main, &emp1));
        assert!(ConnectionGraph::eligible(&sub, &emp1));
        assert!(ConnectionGraph::eligible(&sub, &sub));

        // employees never interact peer-to-peer
        assert!(!ConnectionGraph::eligible(&emp1, &emp2));

        // cross-company
        assert!(!ConnectionGraph::eligible(&sub, &other_sub));

        // developer pairings
        assert!(ConnectionGraph::eligible(&dev1, &dev2));
        assert!(!ConnectionGraph::eligible(&dev1, &main));
        assert!(!ConnectionGraph::eligible(&emp1, &dev1));
    }

    #[tokio::test]
    async fn test_edge_is_directional() {
        let (store, graph) = graph_with_store().await;
        let main = store
            .insert_account(account(AccountKind::MainAccount, Some("c1"), "main"))
            .await
            .unwrap();
        let emp = store
            .insert_account(account(AccountKind::Employee, Some("c1"), "emp"))
            .await
            .unwrap();

        graph.link_hierarchy(&main, &emp).await.unwrap();

        assert!(graph
            .has_permission(
                &main.account_id,
                &emp.account_id,
                InteractionPermission::Message
            )
            .await
            .unwrap());
        // the reverse direction has no edge until separately created
        assert!(!graph
            .has_permission(
                &emp.account_id,
                &main.account_id,
                InteractionPermission::Message
            )
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_deactivated_edge_denies() {
        let (store, graph) = graph_with_store().await;
        let main = store
            .insert_account(account(AccountKind::MainAccount, Some("c1"), "main"))
            .await
            .unwrap();
        let sub = store
            .insert_account(account(AccountKind::SubAccount, Some("c1"), "sub"))
            .await
            .unwrap();
        graph.link_hierarchy(&main, &sub).await.unwrap();

        let claim = IdentityClaim {
            account_id: main.account_id.clone(),
            company_id: Some("c1".into()),
            role: "main_account".into(),
            account_kind: AccountKind::MainAccount,
            is_super_admin: false,
        };
        graph
            .deactivate(&claim, &main.account_id, &sub.account_id)
            .await
            .unwrap();

        assert!(!graph
            .has_permission(
                &main.account_id,
                &sub.account_id,
                InteractionPermission::TaskAssign
            )
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_upsert_scoped_to_claim_company() {
        let (store, graph) = graph_with_store().await;
        let sub_a = store
            .insert_account(account(AccountKind::SubAccount, Some("c1"), "a"))
            .await
            .unwrap();
        let sub_b = store
            .insert_account(account(AccountKind::SubAccount, Some("c1"), "b"))
            .await
            .unwrap();

        let outsider = IdentityClaim {
            account_id: "other-main".into(),
            company_id: Some("c2".into()),
            role: "main_account".into(),
            account_kind: AccountKind::MainAccount,
            is_super_admin: false,
        };
        let request = UpsertConnectionRequest {
            from_account_id: sub_a.account_id.clone(),
            to_account_id: sub_b.account_id.clone(),
            connection_type: ConnectionType::Direct,
            relationship_type: RelationshipType::Peer,
            permissions: BTreeSet::from([InteractionPermission::Message]),
        };
        assert!(matches!(
            graph.upsert(&outsider, request.clone()).await,
            Err(PorterError::NotFound(_))
        ));

        let insider = IdentityClaim {
            account_id: "c1-main".into(),
            company_id: Some("c1".into()),
            role: "main_account".into(),
            account_kind: AccountKind::MainAccount,
            is_super_admin: false,
        };
        let edge = graph.upsert(&insider, request).await.unwrap();
        assert_eq!(edge.status, ConnectionStatus::Active);
        assert!(edge.permissions.contains(&InteractionPermission::Message));
    }

    #[tokio::test]
    async fn test_self_edge_rejected() {
        let (store, graph) = graph_with_store().await;
        let sub = store
            .insert_account(account(AccountKind::SubAccount, Some("c1"), "sub"))
            .await
            .unwrap();

        assert!(!graph
            .can_connect(&sub.account_id, &sub.account_id)
            .await
            .unwrap());
        assert!(matches!(
            graph
                .authorize_interaction(
                    &sub.account_id,
                    &sub.account_id,
                    InteractionPermission::Message
                )
                .await,
            Err(PorterError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_eligible_without_edge_still_lacks_grant() {
        let (store, graph) = graph_with_store().await;
        let main = store
            .insert_account(account(AccountKind::MainAccount, Some("c1"), "main"))
            .await
            .unwrap();
        let emp = store
            .insert_account(account(AccountKind::Employee, Some("c1"), "emp"))
            .await
            .unwrap();

        assert!(graph
            .can_connect(&emp.account_id, &main.account_id)
            .await
            .unwrap());
        assert!(matches!(
            graph
                .authorize_interaction(
                    &emp.account_id,
                    &main.account_id,
                    InteractionPermission::Message
                )
                .await,
            Err(PorterError::PermissionDenied { .. })
        ));
    }
}
