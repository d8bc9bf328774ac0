//! Resource-instance visibility
//!
//! Distinct from the permission resolver: the resolver decides whether an
//! account kind may perform a *kind* of operation at all, this boundary
//! decides whether the claim can see *this specific* resource. Both must
//! pass before an operation proceeds.

use std::sync::Arc;

use crate::auth::claims::IdentityClaim;
use crate::db::schemas::AccountKind;

/// Department membership lookup, owned outside this crate.
///
/// The concrete visibility rule is deployment policy; the boundary only
/// consults it for sub-account claims on department-tagged resources.
pub trait DepartmentPolicy: Send + Sync {
    fn can_view_department(&self, viewer_account_id: &str, department_id: &str) -> bool;
}

/// Policy that makes every department visible to every sub-account
pub struct PermitAllDepartments;

impl DepartmentPolicy for PermitAllDepartments {
    fn can_view_department(&self, _viewer_account_id: &str, _department_id: &str) -> bool {
        true
    }
}

/// Company/owner/department coordinates of a resource instance
#[derive(Debug, Clone)]
pub struct ResourceScope {
    pub company_id: String,
    pub owner_id: Option<String>,
    pub department_id: Option<String>,
}

impl ResourceScope {
    /// Scope for a resource owned by a single account
    pub fn owned(company_id: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            owner_id: Some(owner_id.into()),
            department_id: None,
        }
    }

    /// Scope for a company-wide resource with no individual owner
    pub fn company_wide(company_id: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            owner_id: None,
            department_id: None,
        }
    }

    pub fn in_department(mut self, department_id: impl Into<String>) -> Self {
        self.department_id = Some(department_id.into());
        self
    }
}

/// Data access boundary calculator
pub struct AccessBoundary {
    departments: Arc<dyn DepartmentPolicy>,
}

impl AccessBoundary {
    pub fn new(departments: Arc<dyn DepartmentPolicy>) -> Self {
        Self { departments }
    }

    /// Whether the claim has visibility into the resource instance
    pub fn can_access(&self, claim: &IdentityClaim, scope: &ResourceScope) -> bool {
        let same_company = claim.company_id.as_deref() == Some(scope.company_id.as_str());

        match claim.account_kind {
            // Hard tenant isolation: developers never see company data,
            // regardless of role labels or flags on the claim
            AccountKind::Developer => false,

            AccountKind::MainAccount => same_company,

            AccountKind::Employee => {
                same_company && scope.owner_id.as_deref() == Some(claim.account_id.as_str())
            }

            AccountKind::SubAccount => {
                if !same_company {
                    return false;
                }
                if scope.owner_id.as_deref() == Some(claim.account_id.as_str()) {
                    return true;
                }
                scope
                    .department_id
                    .as_deref()
                    .map(|dept| self.departments.can_view_department(&claim.account_id, dept))
                    .unwrap_or(false)
            }
        }
    }
}

impl Default for AccessBoundary {
    fn default() -> Self {
        Self::new(Arc::new(PermitAllDepartments))
    }
}
