//! Capability enumeration and the built-in capability tables
//!
//! Capabilities are a closed set owned by this module. The tables mapping
//! account kinds and legacy role labels to capability sets are immutable
//! and constructed once, then injected into the resolver — they are data,
//! not module state.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::db::schemas::AccountKind;

/// A named, enumerable permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    // Account provisioning
    CreateMainAccount,
    CreateSubAccount,
    CreateEmployee,
    CreateDeveloperAccount,
    DeleteSubAccount,
    DeleteEmployee,
    DeleteDeveloperAccount,
    ViewQuota,

    // Company administration
    ManageCompanyProfile,
    ManageConnections,

    // HR domain
    ViewEmployeeRecords,
    EditEmployeeRecords,
    ViewOwnRecord,
    ViewReports,
    ReviewPerformance,
    ManageRecruitment,
    ManageTraining,
    SendMessages,
    AssignTasks,
    SyncStatus,

    // Platform operations (developer accounts only)
    ViewMaintenanceOrders,
    ManageMaintenanceOrders,
    ViewPlatformLogs,
    ProcessRefunds,
}

impl Capability {
    /// Wire name, used in denial messages and audit logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CreateMainAccount => "create_main_account",
            Capability::CreateSubAccount => "create_sub_account",
            Capability::CreateEmployee => "create_employee",
            Capability::CreateDeveloperAccount => "create_developer_account",
            Capability::DeleteSubAccount => "delete_sub_account",
            Capability::DeleteEmployee => "delete_employee",
            Capability::DeleteDeveloperAccount => "delete_developer_account",
            Capability::ViewQuota => "view_quota",
            Capability::ManageCompanyProfile => "manage_company_profile",
            Capability::ManageConnections => "manage_connections",
            Capability::ViewEmployeeRecords => "view_employee_records",
            Capability::EditEmployeeRecords => "edit_employee_records",
            Capability::ViewOwnRecord => "view_own_record",
            Capability::ViewReports => "view_reports",
            Capability::ReviewPerformance => "review_performance",
            Capability::ManageRecruitment => "manage_recruitment",
            Capability::ManageTraining => "manage_training",
            Capability::SendMessages => "send_messages",
            Capability::AssignTasks => "assign_tasks",
            Capability::SyncStatus => "sync_status",
            Capability::ViewMaintenanceOrders => "view_maintenance_orders",
            Capability::ManageMaintenanceOrders => "manage_maintenance_orders",
            Capability::ViewPlatformLogs => "view_platform_logs",
            Capability::ProcessRefunds => "process_refunds",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities granted to main accounts: full company administration
fn main_account_capabilities() -> &'static [Capability] {
    &[
        Capability::CreateSubAccount,
        Capability::CreateEmployee,
        Capability::DeleteSubAccount,
        Capability::DeleteEmployee,
        Capability::ViewQuota,
        Capability::ManageCompanyProfile,
        Capability::ManageConnections,
        Capability::ViewEmployeeRecords,
        Capability::EditEmployeeRecords,
        Capability::ViewOwnRecord,
        Capability::ViewReports,
        Capability::ReviewPerformance,
        Capability::ManageRecruitment,
        Capability::ManageTraining,
        Capability::SendMessages,
        Capability::AssignTasks,
        Capability::SyncStatus,
    ]
}

/// Capabilities granted to sub-accounts: department-scoped HR work.
/// Never provisions sub-accounts, never views quota.
fn sub_account_capabilities() -> &'static [Capability] {
    &[
        Capability::CreateEmployee,
        Capability::ManageConnections,
        Capability::ViewEmployeeRecords,
        Capability::EditEmployeeRecords,
        Capability::ViewOwnRecord,
        Capability::ReviewPerformance,
        Capability::ManageRecruitment,
        Capability::ManageTraining,
        Capability::SendMessages,
        Capability::AssignTasks,
        Capability::SyncStatus,
    ]
}

/// Capabilities granted to employees: self-scoped only
fn employee_capabilities() -> &'static [Capability] {
    &[Capability::ViewOwnRecord, Capability::SendMessages]
}

/// Capabilities granted to developer accounts: platform operations plus
/// the interaction capabilities for developer-to-developer edges — never
/// HR-domain or company-scoped capabilities
fn developer_capabilities() -> &'static [Capability] {
    &[
        Capability::ViewMaintenanceOrders,
        Capability::ManageMaintenanceOrders,
        Capability::ViewPlatformLogs,
        Capability::ProcessRefunds,
        Capability::SendMessages,
        Capability::AssignTasks,
        Capability::SyncStatus,
    ]
}

/// Immutable capability tables injected into the permission resolver
#[derive(Debug, Clone)]
pub struct CapabilityTables {
    kind_sets: HashMap<AccountKind, HashSet<Capability>>,
    role_sets: HashMap<&'static str, HashSet<Capability>>,
}

impl CapabilityTables {
    /// The built-in tables: one set per account kind plus the static
    /// legacy role table retained for pre-migration role labels
    pub fn builtin() -> Self {
        let kind_sets = HashMap::from([
            (
                AccountKind::MainAccount,
                main_account_capabilities().iter().copied().collect(),
            ),
            (
                AccountKind::SubAccount,
                sub_account_capabilities().iter().copied().collect(),
            ),
            (
                AccountKind::Employee,
                employee_capabilities().iter().copied().collect(),
            ),
            (
                AccountKind::Developer,
                developer_capabilities().iter().copied().collect(),
            ),
        ]);

        let role_sets = HashMap::from([
            (
                "hr_manager",
                HashSet::from([
                    Capability::ViewEmployeeRecords,
                    Capability::EditEmployeeRecords,
                    Capability::ReviewPerformance,
                    Capability::AssignTasks,
                    Capability::SendMessages,
                ]),
            ),
            (
                "recruiter",
                HashSet::from([
                    Capability::ManageRecruitment,
                    Capability::AssignTasks,
                    Capability::SendMessages,
                ]),
            ),
            (
                "auditor",
                HashSet::from([Capability::ViewReports, Capability::ViewEmployeeRecords]),
            ),
        ]);

        Self {
            kind_sets,
            role_sets,
        }
    }

    /// Whether the kind's capability set contains the capability
    pub fn kind_allows(&self, kind: AccountKind, capability: Capability) -> bool {
        self.kind_sets
            .get(&kind)
            .map(|set| set.contains(&capability))
            .unwrap_or(false)
    }

    /// Whether the built-in legacy role table grants the capability
    pub fn role_allows(&self, role: &str, capability: Capability) -> bool {
        self.role_sets
            .get(role)
            .map(|set| set.contains(&capability))
            .unwrap_or(false)
    }
}

impl Default for CapabilityTables {
    fn default() -> Self {
        Self::builtin()
    }
}
