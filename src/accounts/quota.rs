//! Quota ledger
//!
//! Limits are derived from the company's most recent subscription row and
//! compared against live account counts at decision time — there is no
//! stored counter to drift. `CreateAccount` and the read-only snapshot
//! share this computation so UI numbers never disagree with enforcement.

use serde::Serialize;
use std::sync::Arc;

use crate::db::schemas::AccountKind;
use crate::db::store::DirectoryStore;
use crate::error::{PorterError, Result};

/// Main accounts are invariant-limited, not plan-limited
pub const MAX_MAIN_ACCOUNTS: i64 = 1;

/// Current and maximum count for one account kind
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindQuota {
    pub max: i64,
    pub current: i64,
}

impl KindQuota {
    /// Whether one more account of this kind fits under the limit
    pub fn has_room(&self) -> bool {
        self.current < self.max
    }
}

/// Per-company quota state across the three company-scoped kinds
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaSnapshot {
    pub plan: String,
    pub main_accounts: KindQuota,
    pub sub_accounts: KindQuota,
    pub employees: KindQuota,
}

impl QuotaSnapshot {
    fn for_kind(&self, kind: AccountKind) -> Option<&KindQuota> {
        match kind {
            AccountKind::MainAccount => Some(&self.main_accounts),
            AccountKind::SubAccount => Some(&self.sub_accounts),
            AccountKind::Employee => Some(&self.employees),
            AccountKind::Developer => None,
        }
    }
}

/// Live-counted quota enforcement
pub struct QuotaLedger {
    store: Arc<dyn DirectoryStore>,
}

impl QuotaLedger {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    /// Compute the company's quota state from its active subscription
    /// and live account counts
    pub async fn snapshot(&self, company_id: &str) -> Result<QuotaSnapshot> {
        let subscription = self
            .store
            .latest_subscription(company_id)
            .await?
            .ok_or_else(|| PorterError::NoSubscription {
                company_id: company_id.to_string(),
            })?;

        let main_count = self
            .store
            .count_accounts(company_id, AccountKind::MainAccount)
            .await?;
        let sub_count = self
            .store
            .count_accounts(company_id, AccountKind::SubAccount)
            .await?;
        let employee_count = self
            .store
            .count_accounts(company_id, AccountKind::Employee)
            .await?;

        Ok(QuotaSnapshot {
            plan: subscription.plan,
            main_accounts: KindQuota {
                max: MAX_MAIN_ACCOUNTS,
                current: main_count as i64,
            },
            sub_accounts: KindQuota {
                max: subscription.max_sub_accounts,
                current: sub_count as i64,
            },
            employees: KindQuota {
                max: subscription.max_employees,
                current: employee_count as i64,
            },
        })
    }

    /// Fail with `QuotaExceeded` unless the company can take one more
    /// account of the kind. Callers must hold the company's creation
    /// lock so the count cannot go stale before the insert commits.
    pub async fn admits(&self, company_id: &str, kind: AccountKind) -> Result<()> {
        debug_assert!(kind.is_quota_limited());

        let snapshot = self.snapshot(company_id).await?;
        let quota = snapshot
            .for_kind(kind)
            .ok_or_else(|| PorterError::InvalidRequest(format!("{kind} is not quota-limited")))?;

        if quota.has_room() {
            Ok(())
        } else {
            Err(PorterError::QuotaExceeded {
                kind,
                limit: quota.max,
            })
        }
    }
}
