//! Account hierarchy service
//!
//! Owns the create/delete invariants of the four-kind account model:
//! one active main account per company, parents in the same company,
//! quota-gated sub-account and employee creation, no deletion with
//! active children, and main accounts never deletable.
//!
//! Quota check-and-insert is serialized per company through an advisory
//! lock registry; cross-company creations never contend.

pub mod quota;

use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::auth::boundary::{AccessBoundary, ResourceScope};
use crate::auth::capability::Capability;
use crate::auth::claims::IdentityClaim;
use crate::auth::password::hash_password;
use crate::auth::resolver::{PermissionResolver, SUPER_ADMIN_ROLE};
use crate::db::schemas::{AccountDoc, AccountKind};
use crate::db::store::DirectoryStore;
use crate::error::{PorterError, Result, StructuralViolation};
use crate::graph::ConnectionGraph;

pub use quota::{KindQuota, QuotaLedger, QuotaSnapshot, MAX_MAIN_ACCOUNTS};

/// Per-company advisory locks serializing account creation
#[derive(Clone, Default)]
pub struct CompanyLocks {
    inner: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl CompanyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock handle for a company; created on first use
    pub fn acquire(&self, company_id: &str) -> Arc<Mutex<()>> {
        self.inner
            .entry(company_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Request to provision an account
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub kind: AccountKind,

    /// Honored only for platform-issued (non-company) claims; company
    /// callers always provision into their own company
    #[serde(default)]
    pub company_id: Option<String>,

    /// Required for sub-accounts and employees
    #[serde(default)]
    pub parent_account_id: Option<String>,

    /// Legacy role label; defaults to the kind's wire name
    #[serde(default)]
    pub role: Option<String>,

    pub name: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    /// Login credential; hashed before storage, never stored raw
    #[serde(default)]
    pub password: Option<String>,
}

/// Account hierarchy and lifecycle operations
pub struct AccountService {
    store: Arc<dyn DirectoryStore>,
    resolver: Arc<PermissionResolver>,
    boundary: Arc<AccessBoundary>,
    graph: Arc<ConnectionGraph>,
    ledger: QuotaLedger,
    locks: CompanyLocks,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn DirectoryStore>,
        resolver: Arc<PermissionResolver>,
        boundary: Arc<AccessBoundary>,
        graph: Arc<ConnectionGraph>,
    ) -> Self {
        let ledger = QuotaLedger::new(store.clone());
        Self {
            store,
            resolver,
            boundary,
            graph,
            ledger,
            locks: CompanyLocks::new(),
        }
    }

    /// Provision an account of any kind, enforcing capability, quota,
    /// and hierarchy invariants. Sub-accounts and employees get a
    /// hierarchy connection edge from their parent with all three
    /// interaction grants.
    pub async fn create_account(
        &self,
        claim: &IdentityClaim,
        request: CreateAccountRequest,
    ) -> Result<AccountDoc> {
        let kind = request.kind;
        let capability = match kind {
            AccountKind::MainAccount => Capability::CreateMainAccount,
            AccountKind::SubAccount => Capability::CreateSubAccount,
            AccountKind::Employee => Capability::CreateEmployee,
            AccountKind::Developer => Capability::CreateDeveloperAccount,
        };
        self.resolver.require(Some(claim), capability)?;

        // Developer accounts are platform-level: no company, no parent,
        // no quota
        if kind == AccountKind::Developer {
            if request.company_id.is_some() || request.parent_account_id.is_some() {
                return Err(PorterError::InvalidRequest(
                    "developer accounts carry no company or parent".into(),
                ));
            }
            let account = self
                .store
                .insert_account(build_account(kind, None, &request)?)
                .await?;
            info!(account_id = %account.account_id, "developer account created");
            return Ok(account);
        }

        let company_id = resolve_company(claim, &request)?;
        let parent = self.validate_parent(kind, &company_id, &request).await?;

        // Quota check-then-insert must not interleave with another
        // creation for the same company
        let lock = self.locks.acquire(&company_id);
        let _guard = lock.lock().await;

        if kind == AccountKind::MainAccount {
            if self.store.find_main_account(&company_id).await?.is_some() {
                return Err(StructuralViolation::MainAccountExists { company_id }.into());
            }
        } else {
            self.ledger.admits(&company_id, kind).await?;
        }

        let mut account = build_account(kind, Some(company_id.clone()), &request)?;
        account.parent_account_id = parent.as_ref().map(|p| p.account_id.clone());
        let account = self.store.insert_account(account).await?;

        if let Some(parent) = parent {
            self.graph.link_hierarchy(&parent, &account).await?;
        }

        info!(
            account_id = %account.account_id,
            company_id = %company_id,
            kind = %kind,
            "account created"
        );
        Ok(account)
    }

    /// Delete an account. Main accounts are never deletable; accounts
    /// with active children are not deletable regardless of caller.
    pub async fn delete_account(&self, claim: &IdentityClaim, account_id: &str) -> Result<()> {
        let account = self.load_scoped(claim, account_id).await?;

        let capability = match account.kind {
            AccountKind::MainAccount => {
                return Err(StructuralViolation::MainAccountNotDeletable.into());
            }
            AccountKind::SubAccount => Capability::DeleteSubAccount,
            AccountKind::Employee => Capability::DeleteEmployee,
            AccountKind::Developer => Capability::DeleteDeveloperAccount,
        };
        self.resolver.require(Some(claim), capability)?;

        let children = self.store.count_active_children(&account.account_id).await?;
        if children > 0 {
            return Err(StructuralViolation::HasDependents { count: children }.into());
        }

        self.store.delete_account(&account.account_id).await?;
        info!(account_id = %account.account_id, kind = %account.kind, "account deleted");
        Ok(())
    }

    /// Activate or deactivate an account. Main accounts stay active:
    /// the one-active-main invariant is not togglable through this path.
    pub async fn set_account_active(
        &self,
        claim: &IdentityClaim,
        account_id: &str,
        active: bool,
    ) -> Result<()> {
        let account = self.load_scoped(claim, account_id).await?;

        let capability = match account.kind {
            AccountKind::MainAccount => {
                return Err(PorterError::InvalidRequest(
                    "main account status cannot be changed".into(),
                ));
            }
            AccountKind::SubAccount => Capability::DeleteSubAccount,
            AccountKind::Employee => Capability::DeleteEmployee,
            AccountKind::Developer => Capability::DeleteDeveloperAccount,
        };
        self.resolver.require(Some(claim), capability)?;

        self.store.set_account_active(&account.account_id, active).await?;
        info!(account_id = %account.account_id, active, "account status changed");
        Ok(())
    }

    /// Fetch one account, subject to the data access boundary
    pub async fn get_account(&self, claim: &IdentityClaim, account_id: &str) -> Result<AccountDoc> {
        let account = self
            .store
            .find_account(account_id)
            .await?
            .ok_or_else(|| PorterError::NotFound(format!("account '{account_id}'")))?;

        if is_super_admin(claim) {
            return Ok(account);
        }

        let visible = match &account.company_id {
            Some(company_id) => self.boundary.can_access(
                claim,
                &ResourceScope::owned(company_id.clone(), account.account_id.clone()),
            ),
            // Platform rows are visible to platform accounts only
            None => claim.account_kind == AccountKind::Developer,
        };

        if visible {
            Ok(account)
        } else {
            Err(PorterError::NotFound(format!("account '{account_id}'")))
        }
    }

    /// List a company's accounts, optionally restricted to one kind
    pub async fn list_accounts(
        &self,
        claim: &IdentityClaim,
        company_id: Option<&str>,
        kind: Option<AccountKind>,
    ) -> Result<Vec<AccountDoc>> {
        self.resolver
            .require(Some(claim), Capability::ViewEmployeeRecords)?;
        let company_id = effective_company(claim, company_id)?;
        self.store.list_accounts(&company_id, kind).await
    }

    /// Read-only quota state, same computation the create path enforces
    pub async fn quota_snapshot(
        &self,
        claim: &IdentityClaim,
        company_id: Option<&str>,
    ) -> Result<QuotaSnapshot> {
        self.resolver.require(Some(claim), Capability::ViewQuota)?;
        let company_id = effective_company(claim, company_id)?;
        self.ledger.snapshot(&company_id).await
    }

    /// Parent validation for sub-accounts and employees: must exist, be
    /// live, sit in the same company, and be a main or sub-account
    async fn validate_parent(
        &self,
        kind: AccountKind,
        company_id: &str,
        request: &CreateAccountRequest,
    ) -> Result<Option<AccountDoc>> {
        if !kind.requires_parent() {
            return Ok(None);
        }

        let parent_id = request.parent_account_id.as_deref().ok_or_else(|| {
            StructuralViolation::InvalidParent {
                reason: format!("{kind} accounts require a parent_account_id"),
            }
        })?;

        let parent = self.store.find_account(parent_id).await?.ok_or_else(|| {
            StructuralViolation::InvalidParent {
                reason: format!("parent account '{parent_id}' not found"),
            }
        })?;

        if !parent.is_live() {
            return Err(StructuralViolation::InvalidParent {
                reason: "parent account is inactive".into(),
            }
            .into());
        }
        if parent.company_id.as_deref() != Some(company_id) {
            return Err(StructuralViolation::InvalidParent {
                reason: "parent account belongs to a different company".into(),
            }
            .into());
        }
        if !matches!(
            parent.kind,
            AccountKind::MainAccount | AccountKind::SubAccount
        ) {
            return Err(StructuralViolation::InvalidParent {
                reason: format!("{} accounts cannot hold children", parent.kind),
            }
            .into());
        }

        Ok(Some(parent))
    }

    /// Load an account visible to the claim; cross-tenant rows read as
    /// absent rather than forbidden
    async fn load_scoped(&self, claim: &IdentityClaim, account_id: &str) -> Result<AccountDoc> {
        let account = self
            .store
            .find_account(account_id)
            .await?
            .ok_or_else(|| PorterError::NotFound(format!("account '{account_id}'")))?;

        if is_super_admin(claim) {
            return Ok(account);
        }

        let visible = match (&claim.company_id, &account.company_id) {
            (Some(claim_company), Some(account_company)) => claim_company == account_company,
            (None, None) => true,
            _ => false,
        };

        if visible {
            Ok(account)
        } else {
            Err(PorterError::NotFound(format!("account '{account_id}'")))
        }
    }
}

fn is_super_admin(claim: &IdentityClaim) -> bool {
    claim.is_super_admin || claim.role == SUPER_ADMIN_ROLE
}

/// Company scoping: company claims always act on their own company;
/// platform claims must say which company they mean
fn resolve_company(claim: &IdentityClaim, request: &CreateAccountRequest) -> Result<String> {
    if let Some(company_id) = &claim.company_id {
        return Ok(company_id.clone());
    }
    request
        .company_id
        .clone()
        .ok_or_else(|| PorterError::InvalidRequest("company_id is required".into()))
}

fn effective_company(claim: &IdentityClaim, requested: Option<&str>) -> Result<String> {
    if let Some(company_id) = &claim.company_id {
        return Ok(company_id.clone());
    }
    requested
        .map(str::to_string)
        .ok_or_else(|| PorterError::InvalidRequest("company_id is required".into()))
}

fn build_account(
    kind: AccountKind,
    company_id: Option<String>,
    request: &CreateAccountRequest,
) -> Result<AccountDoc> {
    let mut account = AccountDoc::new(kind, company_id, request.name.clone());
    if let Some(role) = &request.role {
        account.role = role.clone();
    }
    account.email = request.email.clone();
    account.phone = request.phone.clone();
    if let Some(password) = &request.password {
        account.password_hash = Some(hash_password(password)?);
    }
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryDirectory;
    use crate::db::schemas::SubscriptionDoc;

    struct Fixture {
        store: Arc<dyn DirectoryStore>,
        service: AccountService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryDirectory::new()) as Arc<dyn DirectoryStore>;
        let resolver = Arc::new(PermissionResolver::builtin());
        let boundary = Arc::new(AccessBoundary::default());
        let graph = Arc::new(ConnectionGraph::new(store.clone(), resolver.clone()));
        let service = AccountService::new(store.clone(), resolver, boundary, graph);
        Fixture { store, service }
    }

    fn platform_admin() -> IdentityClaim {
        IdentityClaim {
            account_id: "root".into(),
            company_id: None,
            role: SUPER_ADMIN_ROLE.into(),
            account_kind: AccountKind::Developer,
            is_super_admin: true,
        }
    }

    fn claim_for(account: &AccountDoc) -> IdentityClaim {
        IdentityClaim {
            account_id: account.account_id.clone(),
            company_id: account.company_id.clone(),
            role: account.role.clone(),
            account_kind: account.kind,
            is_super_admin: false,
        }
    }

    fn create_request(kind: AccountKind, name: &str) -> CreateAccountRequest {
        CreateAccountRequest {
            kind,
            company_id: None,
            parent_account_id: None,
            role: None,
            name: name.into(),
            email: None,
            phone: None,
            password: None,
        }
    }

    async fn seed_company(fx: &Fixture, company_id: &str, max_subs: i64, max_emps: i64) -> AccountDoc {
        fx.store
            .insert_subscription(SubscriptionDoc::new(
                company_id.into(),
                "growth".into(),
                max_subs,
                max_emps,
            ))
            .await
            .unwrap();

        let mut request = create_request(AccountKind::MainAccount, "Owner");
        request.company_id = Some(company_id.into());
        fx.service
            .create_account(&platform_admin(), request)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_second_main_account_is_structural_error() {
        let fx = fixture();
        seed_company(&fx, "c1", 3, 10).await;

        let mut request = create_request(AccountKind::MainAccount, "Second Owner");
        request.company_id = Some("c1".into());
        let err = fx
            .service
            .create_account(&platform_admin(), request)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PorterError::Structural(StructuralViolation::MainAccountExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_main_creates_employee_with_hierarchy_edge() {
        let fx = fixture();
        let main = seed_company(&fx, "c1", 3, 10).await;
        let claim = claim_for(&main);

        let mut request = create_request(AccountKind::Employee, "Dana");
        request.parent_account_id = Some(main.account_id.clone());
        let employee = fx.service.create_account(&claim, request).await.unwrap();

        assert_eq!(employee.company_id.as_deref(), Some("c1"));
        assert_eq!(
            employee.parent_account_id.as_deref(),
            Some(main.account_id.as_str())
        );

        let edge = fx
            .store
            .find_connection(&main.account_id, &employee.account_id)
            .await
            .unwrap()
            .expect("hierarchy edge should exist");
        assert_eq!(edge.permissions.len(), 3);

        // the reverse direction was not granted
        assert!(fx
            .store
            .find_connection(&employee.account_id, &main.account_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_quota_exceeded_reports_limit() {
        let fx = fixture();
        let main = seed_company(&fx, "c1", 3, 10).await;
        let claim = claim_for(&main);

        for i in 0..3 {
            let mut request = create_request(AccountKind::SubAccount, &format!("Sub {i}"));
            request.parent_account_id = Some(main.account_id.clone());
            fx.service.create_account(&claim, request).await.unwrap();
        }

        let mut request = create_request(AccountKind::SubAccount, "One Too Many");
        request.parent_account_id = Some(main.account_id.clone());
        match fx.service.create_account(&claim, request).await {
            Err(PorterError::QuotaExceeded { kind, limit }) => {
                assert_eq!(kind, AccountKind::SubAccount);
                assert_eq!(limit, 3);
            }
            other => panic!("expected QuotaExceeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_company_scoping_comes_from_claim() {
        let fx = fixture();
        let main = seed_company(&fx, "c1", 3, 10).await;
        seed_company(&fx, "c2", 3, 10).await;
        let claim = claim_for(&main);

        // a company caller cannot provision into another company; the
        // request's company_id is ignored in favor of the claim's
        let mut request = create_request(AccountKind::Employee, "Dana");
        request.company_id = Some("c2".into());
        request.parent_account_id = Some(main.account_id.clone());
        let employee = fx.service.create_account(&claim, request).await.unwrap();
        assert_eq!(employee.company_id.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_parent_validation() {
        let fx = fixture();
        let main = seed_company(&fx, "c1", 3, 10).await;
        let claim = claim_for(&main);

        // missing parent
        let request = create_request(AccountKind::Employee, "No Parent");
        assert!(matches!(
            fx.service.create_account(&claim, request).await,
            Err(PorterError::Structural(StructuralViolation::InvalidParent { .. }))
        ));

        // employee cannot hold children
        let mut request = create_request(AccountKind::Employee, "Dana");
        request.parent_account_id = Some(main.account_id.clone());
        let employee = fx.service.create_account(&claim, request).await.unwrap();

        let mut request = create_request(AccountKind::Employee, "Grandchild");
        request.parent_account_id = Some(employee.account_id.clone());
        assert!(matches!(
            fx.service.create_account(&claim, request).await,
            Err(PorterError::Structural(StructuralViolation::InvalidParent { .. }))
        ));

        // parent in another company
        let other_main = seed_company(&fx, "c2", 3, 10).await;
        let mut request = create_request(AccountKind::Employee, "Stray");
        request.parent_account_id = Some(other_main.account_id.clone());
        assert!(matches!(
            fx.service.create_account(&claim, request).await,
            Err(PorterError::Structural(StructuralViolation::InvalidParent { .. }))
        ));
    }

    #[tokio::test]
    async fn test_sub_account_cannot_provision_subs() {
        let fx = fixture();
        let main = seed_company(&fx, "c1", 3, 10).await;
        let main_claim = claim_for(&main);

        let mut request = create_request(AccountKind::SubAccount, "HR Lead");
        request.parent_account_id = Some(main.account_id.clone());
        let sub = fx.service.create_account(&main_claim, request).await.unwrap();
        let sub_claim = claim_for(&sub);

        // subs may create employees
        let mut request = create_request(AccountKind::Employee, "Dana");
        request.parent_account_id = Some(sub.account_id.clone());
        fx.service.create_account(&sub_claim, request).await.unwrap();

        // but never other sub-accounts
        let mut request = create_request(AccountKind::SubAccount, "Another Sub");
        request.parent_account_id = Some(sub.account_id.clone());
        assert!(matches!(
            fx.service.create_account(&sub_claim, request).await,
            Err(PorterError::PermissionDenied { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_guards() {
        let fx = fixture();
        let main = seed_company(&fx, "c1", 3, 10).await;
        let main_claim = claim_for(&main);

        let mut request = create_request(AccountKind::SubAccount, "HR Lead");
        request.parent_account_id = Some(main.account_id.clone());
        let sub = fx.service.create_account(&main_claim, request).await.unwrap();

        let mut request = create_request(AccountKind::Employee, "Dana");
        request.parent_account_id = Some(sub.account_id.clone());
        let employee = fx.service.create_account(&main_claim, request).await.unwrap();

        // main account never deletable, regardless of the caller
        let sub_claim = claim_for(&sub);
        assert!(matches!(
            fx.service.delete_account(&sub_claim, &main.account_id).await,
            Err(PorterError::Structural(StructuralViolation::MainAccountNotDeletable))
        ));
        assert!(matches!(
            fx.service.delete_account(&main_claim, &main.account_id).await,
            Err(PorterError::Structural(StructuralViolation::MainAccountNotDeletable))
        ));

        // parent with an active child is not deletable
        assert!(matches!(
            fx.service.delete_account(&main_claim, &sub.account_id).await,
            Err(PorterError::Structural(StructuralViolation::HasDependents { count: 1 }))
        ));

        // leaf first, then the parent goes through
        fx.service
            .delete_account(&main_claim, &employee.account_id)
            .await
            .unwrap();
        fx.service
            .delete_account(&main_claim, &sub.account_id)
            .await
            .unwrap();
        assert!(fx.store.find_account(&sub.account_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deactivated_children_do_not_block_deletion() {
        let fx = fixture();
        let main = seed_company(&fx, "c1", 3, 10).await;
        let main_claim = claim_for(&main);

        let mut request = create_request(AccountKind::SubAccount, "HR Lead");
        request.parent_account_id = Some(main.account_id.clone());
        let sub = fx.service.create_account(&main_claim, request).await.unwrap();

        let mut request = create_request(AccountKind::Employee, "Dana");
        request.parent_account_id = Some(sub.account_id.clone());
        let employee = fx.service.create_account(&main_claim, request).await.unwrap();

        assert!(matches!(
            fx.service.delete_account(&main_claim, &sub.account_id).await,
            Err(PorterError::Structural(StructuralViolation::HasDependents { .. }))
        ));

        // only *active* children hold their parent in place
        fx.service
            .set_account_active(&main_claim, &employee.account_id, false)
            .await
            .unwrap();
        fx.service
            .delete_account(&main_claim, &sub.account_id)
            .await
            .unwrap();

        // the deactivated employee still occupies a quota seat
        let snapshot = fx.service.quota_snapshot(&main_claim, None).await.unwrap();
        assert_eq!(snapshot.employees.current, 1);
    }

    #[tokio::test]
    async fn test_cross_company_rows_read_as_absent() {
        let fx = fixture();
        let main1 = seed_company(&fx, "c1", 3, 10).await;
        let main2 = seed_company(&fx, "c2", 3, 10).await;

        let claim = claim_for(&main1);
        let mut request = create_request(AccountKind::Employee, "Theirs");
        request.parent_account_id = Some(main2.account_id.clone());
        let other_employee = fx
            .service
            .create_account(&claim_for(&main2), request)
            .await
            .unwrap();

        assert!(matches!(
            fx.service
                .delete_account(&claim, &other_employee.account_id)
                .await,
            Err(PorterError::NotFound(_))
        ));
        assert!(matches!(
            fx.service.get_account(&claim, &other_employee.account_id).await,
            Err(PorterError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_quota_snapshot_requires_capability() {
        let fx = fixture();
        let main = seed_company(&fx, "c1", 3, 10).await;
        let main_claim = claim_for(&main);

        let snapshot = fx.service.quota_snapshot(&main_claim, None).await.unwrap();
        assert_eq!(snapshot.main_accounts.current, 1);
        assert_eq!(snapshot.main_accounts.max, MAX_MAIN_ACCOUNTS);
        assert_eq!(snapshot.sub_accounts.max, 3);

        let mut request = create_request(AccountKind::Employee, "Dana");
        request.parent_account_id = Some(main.account_id.clone());
        let employee = fx.service.create_account(&main_claim, request).await.unwrap();

        // sub-accounts and employees never view quota
        assert!(matches!(
            fx.service.quota_snapshot(&claim_for(&employee), None).await,
            Err(PorterError::PermissionDenied { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creation_respects_quota() {
        let fx = fixture();
        let main = seed_company(&fx, "c1", 10, 3).await;
        let claim = claim_for(&main);

        let service = Arc::new(fx.service);
        let mut handles = Vec::new();
        for i in 0..8 {
            let service = service.clone();
            let claim = claim.clone();
            let parent_id = main.account_id.clone();
            handles.push(tokio::spawn(async move {
                let mut request = create_request(AccountKind::Employee, &format!("Emp {i}"));
                request.parent_account_id = Some(parent_id);
                service.create_account(&claim, request).await
            }));
        }

        let mut created = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(PorterError::QuotaExceeded { limit, .. }) => {
                    assert_eq!(limit, 3);
                    rejected += 1;
                }
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(created, 3);
        assert_eq!(rejected, 5);
        assert_eq!(
            fx.store
                .count_accounts("c1", AccountKind::Employee)
                .await
                .unwrap(),
            3
        );
    }
}
