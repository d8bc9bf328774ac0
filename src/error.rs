//! Error taxonomy for the authorization core
//!
//! Every expected domain failure is a first-class variant so the calling
//! layer can map outcomes to HTTP-like status codes without inspecting
//! message text. Only store faults surface as [`PorterError::Database`].

use thiserror::Error;

use crate::db::schemas::AccountKind;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, PorterError>;

/// Structural invariant violations in the account hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralViolation {
    /// A company may hold exactly one active main account
    #[error("company '{company_id}' already has an active main account")]
    MainAccountExists { company_id: String },

    /// Main accounts are never deletable through the normal path
    #[error("main accounts cannot be deleted")]
    MainAccountNotDeletable,

    /// Accounts with active children cannot be deleted
    #[error("account still has {count} active child account(s)")]
    HasDependents { count: u64 },

    /// Sub-accounts and employees require a valid same-company parent
    #[error("invalid parent account: {reason}")]
    InvalidParent { reason: String },
}

/// Error type for all core operations
#[derive(Debug, Error)]
pub enum PorterError {
    /// No valid identity claim was presented (401, prompt login)
    #[error("authentication required")]
    Unauthenticated,

    /// The claim resolved but lacks the capability or edge grant (403)
    #[error("permission denied: {capability}")]
    PermissionDenied { capability: String },

    /// The claim resolved but the operation targets a resource it may
    /// not act on, e.g. marking another recipient's message read (403)
    #[error("forbidden: {reason}")]
    Forbidden { reason: String },

    /// Malformed input, e.g. an unknown account kind (400)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The subscription plan does not admit another account of this kind
    /// (409, show upgrade-plan messaging with the numeric limit)
    #[error("quota exceeded for {kind}: limit is {limit}")]
    QuotaExceeded { kind: AccountKind, limit: i64 },

    /// Quota was consulted for a company with no subscription row
    #[error("company '{company_id}' has no subscription")]
    NoSubscription { company_id: String },

    /// Hierarchy invariant violation (409)
    #[error(transparent)]
    Structural(#[from] StructuralViolation),

    /// The account pair is structurally ineligible to connect (409)
    #[error("accounts '{from}' and '{to}' are not connectable")]
    NotConnectable { from: String, to: String },

    /// Lookup target does not exist or is outside the caller's scope (404)
    #[error("{0} not found")]
    NotFound(String),

    /// Store connectivity or serialization fault; logged loudly upstream
    #[error("database error: {0}")]
    Database(String),
}

impl PorterError {
    /// HTTP-like status code for the excluded API layer.
    ///
    /// The mapping is part of the contract: callers must be able to pick
    /// 401 vs 403 vs 409 without parsing messages.
    pub fn http_status(&self) -> u16 {
        match self {
            PorterError::Unauthenticated => 401,
            PorterError::PermissionDenied { .. } | PorterError::Forbidden { .. } => 403,
            PorterError::InvalidRequest(_) => 400,
            PorterError::QuotaExceeded { .. }
            | PorterError::NoSubscription { .. }
            | PorterError::Structural(_)
            | PorterError::NotConnectable { .. } => 409,
            PorterError::NotFound(_) => 404,
            PorterError::Database(_) => 500,
        }
    }

    /// Whether this outcome is an expected, caller-recoverable denial
    pub fn is_expected(&self) -> bool {
        !matches!(self, PorterError::Database(_))
    }
}
