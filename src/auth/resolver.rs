//! Layered permission resolution
//!
//! `authorize` is a pure function of the claim, the capability, and the
//! injected tables — no store reads, deterministic for identical inputs,
//! safe to cache and to replay for audit.
//!
//! Resolution order, first decisive strategy wins:
//! 1. super-admin override (flag or `super_admin` role label)
//! 2. developer kind — allow iff in the developer set, otherwise a
//!    terminal deny: developer accounts never fall through to role
//!    strategies, so a privileged legacy role label on a developer
//!    account grants nothing
//! 3. the account kind's capability set
//! 4. the built-in legacy role table
//! 5. the injected legacy role store (custom roles), else deny

use std::sync::Arc;
use tracing::warn;

use crate::auth::capability::{Capability, CapabilityTables};
use crate::auth::claims::IdentityClaim;
use crate::db::schemas::AccountKind;
use crate::error::{PorterError, Result};

/// Role label that short-circuits resolution to allow
pub const SUPER_ADMIN_ROLE: &str = "super_admin";

/// Final-fallback lookup for roles defined outside the four account
/// kinds. Implementations should answer from a snapshot so resolution
/// stays deterministic within a request.
pub trait LegacyRoleStore: Send + Sync {
    fn role_allows(&self, role: &str, capability: Capability) -> bool;
}

/// Default fallback: no custom roles exist
pub struct NoLegacyRoles;

impl LegacyRoleStore for NoLegacyRoles {
    fn role_allows(&self, _role: &str, _capability: Capability) -> bool {
        false
    }
}

/// The permission resolution engine
pub struct PermissionResolver {
    tables: CapabilityTables,
    legacy: Arc<dyn LegacyRoleStore>,
}

impl PermissionResolver {
    pub fn new(tables: CapabilityTables, legacy: Arc<dyn LegacyRoleStore>) -> Self {
        Self { tables, legacy }
    }

    /// Resolver with the built-in tables and no custom roles
    pub fn builtin() -> Self {
        Self::new(CapabilityTables::builtin(), Arc::new(NoLegacyRoles))
    }

    /// Decide whether the claim may exercise the capability
    pub fn authorize(&self, claim: &IdentityClaim, capability: Capability) -> bool {
        // 1. super-admin override
        if claim.is_super_admin || claim.role == SUPER_ADMIN_ROLE {
            return true;
        }

        // 2. developers are structurally barred from everything outside
        //    their fixed operational set
        if claim.account_kind == AccountKind::Developer {
            return self
                .tables
                .kind_allows(AccountKind::Developer, capability);
        }

        // 3. the kind's own capability set
        if self.tables.kind_allows(claim.account_kind, capability) {
            return true;
        }

        // 4. built-in legacy role table
        if self.tables.role_allows(&claim.role, capability) {
            return true;
        }

        // 5. custom roles from the injected store
        self.legacy.role_allows(&claim.role, capability)
    }

    /// Authorize with 401/403 semantics: a missing claim is
    /// `Unauthenticated`, a resolved-but-denied claim is
    /// `PermissionDenied`
    pub fn require(
        &self,
        claim: Option<&IdentityClaim>,
        capability: Capability,
    ) -> Result<()> {
        let claim = claim.ok_or(PorterError::Unauthenticated)?;
        if self.authorize(claim, capability) {
            Ok(())
        } else {
            warn!(
                account_id = %claim.account_id,
                kind = %claim.account_kind,
                capability = %capability,
                "capability denied"
            );
            Err(PorterError::PermissionDenied {
                capability: capability.as_str().to_string(),
            })
        }
    }
}

impl Default for PermissionResolver {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(kind: AccountKind, role: &str) -> IdentityClaim {
        IdentityClaim {
            account_id: "a1".into(),
            company_id: kind.is_company_scoped().then(|| "c1".to_string()),
            role: role.into(),
            account_kind: kind,
            is_super_admin: false,
        }
    }

    #[test]
    fn test_super_admin_allows_everything() {
        let resolver = PermissionResolver::builtin();
        let mut c = claim(AccountKind::Employee, "employee");
        c.is_super_admin = true;

        for capability in [
            Capability::CreateMainAccount,
            Capability::DeleteSubAccount,
            Capability::ProcessRefunds,
            Capability::ViewQuota,
        ] {
            assert!(resolver.authorize(&c, capability));
        }
    }

    #[test]
    fn test_super_admin_role_label_also_overrides() {
        let resolver = PermissionResolver::builtin();
        let c = claim(AccountKind::MainAccount, SUPER_ADMIN_ROLE);
        assert!(resolver.authorize(&c, Capability::CreateMainAccount));
    }

    #[test]
    fn test_kind_set_decides_for_company_kinds() {
        let resolver = PermissionResolver::builtin();
        assert!(resolver.authorize(
            &claim(AccountKind::MainAccount, "main_account"),
            Capability::CreateSubAccount
        ));
        assert!(!resolver.authorize(
            &claim(AccountKind::SubAccount, "sub_account"),
            Capability::CreateSubAccount
        ));
        assert!(!resolver.authorize(
            &claim(AccountKind::Employee, "employee"),
            Capability::AssignTasks
        ));
    }

    #[test]
    fn test_developer_denied_hr_even_with_privileged_role() {
        let resolver = PermissionResolver::builtin();
        // A developer claim whose role label collides with a privileged
        // legacy role must still be denied all HR capabilities.
        let c = claim(AccountKind::Developer, "hr_manager");
        assert!(!resolver.authorize(&c, Capability::ViewEmployeeRecords));
        assert!(!resolver.authorize(&c, Capability::EditEmployeeRecords));
        assert!(!resolver.authorize(&c, Capability::ReviewPerformance));
        assert!(resolver.authorize(&c, Capability::ViewPlatformLogs));
    }

    #[test]
    fn test_legacy_table_extends_employee() {
        let resolver = PermissionResolver::builtin();
        // An employee-kind account carrying a legacy hr_manager role
        // label picks up the table's extra grants.
        let c = claim(AccountKind::Employee, "hr_manager");
        assert!(resolver.authorize(&c, Capability::ReviewPerformance));
        assert!(!resolver.authorize(&c, Capability::ViewQuota));
    }

    #[test]
    fn test_custom_role_store_is_final_fallback() {
        struct OneCustomRole;
        impl LegacyRoleStore for OneCustomRole {
            fn role_allows(&self, role: &str, capability: Capability) -> bool {
                role == "payroll_clerk" && capability == Capability::ViewReports
            }
        }

        let resolver =
            PermissionResolver::new(CapabilityTables::builtin(), Arc::new(OneCustomRole));
        let c = claim(AccountKind::Employee, "payroll_clerk");
        assert!(resolver.authorize(&c, Capability::ViewReports));
        assert!(!resolver.authorize(&c, Capability::EditEmployeeRecords));
    }

    #[test]
    fn test_require_distinguishes_401_from_403() {
        let resolver = PermissionResolver::builtin();
        assert!(matches!(
            resolver.require(None, Capability::SendMessages),
            Err(PorterError::Unauthenticated)
        ));

        let c = claim(AccountKind::Employee, "employee");
        assert!(matches!(
            resolver.require(Some(&c), Capability::ViewQuota),
            Err(PorterError::PermissionDenied { .. })
        ));
        assert!(resolver.require(Some(&c), Capability::SendMessages).is_ok());
    }
}
