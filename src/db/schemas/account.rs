//! Account document schema
//!
//! The four-kind account model is the primary authorization dispatch key.
//! `role` is retained only as an opaque label feeding the legacy
//! role-fallback strategy; it is never the primary key for access
//! decisions.

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;
use crate::error::PorterError;

/// Collection name for accounts
pub const ACCOUNT_COLLECTION: &str = "accounts";

/// The closed set of account kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// One per company; full company administration
    MainAccount,
    /// Department-scoped administrator under a main account
    SubAccount,
    /// Self-scoped staff account
    Employee,
    /// Platform operator; never carries a company
    Developer,
}

impl AccountKind {
    /// Wire name, also used in store filters
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::MainAccount => "main_account",
            AccountKind::SubAccount => "sub_account",
            AccountKind::Employee => "employee",
            AccountKind::Developer => "developer",
        }
    }

    /// Whether accounts of this kind belong to a company
    pub fn is_company_scoped(&self) -> bool {
        !matches!(self, AccountKind::Developer)
    }

    /// Whether accounts of this kind sit under a parent account
    pub fn requires_parent(&self) -> bool {
        matches!(self, AccountKind::SubAccount | AccountKind::Employee)
    }

    /// Whether creation of this kind is limited by the subscription quota
    pub fn is_quota_limited(&self) -> bool {
        matches!(self, AccountKind::SubAccount | AccountKind::Employee)
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = PorterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main_account" => Ok(AccountKind::MainAccount),
            "sub_account" => Ok(AccountKind::SubAccount),
            "employee" => Ok(AccountKind::Employee),
            "developer" => Ok(AccountKind::Developer),
            other => Err(PorterError::InvalidRequest(format!(
                "unknown account kind '{other}'"
            ))),
        }
    }
}

/// Account document
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AccountDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<bson::oid::ObjectId>,

    /// Common metadata (created_at, updated_at, is_deleted)
    #[serde(default)]
    pub metadata: Metadata,

    /// Stable logical identifier (UUID string)
    pub account_id: String,

    /// Owning company; absent for developer accounts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    /// Parent account for sub-accounts and employees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_account_id: Option<String>,

    /// Account kind, the primary authorization dispatch key
    pub kind: AccountKind,

    /// Free-form role label; feeds only the legacy permission fallback
    pub role: String,

    /// Display name
    pub name: String,

    /// Contact email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Contact phone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Argon2 credential hash, set when the account can log in directly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    /// Whether the account is active
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl AccountDoc {
    /// Create a new account document with a fresh logical id
    pub fn new(kind: AccountKind, company_id: Option<String>, name: String) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            account_id: uuid::Uuid::new_v4().to_string(),
            company_id,
            parent_account_id: None,
            kind,
            role: kind.as_str().to_string(),
            name,
            email: None,
            phone: None,
            password_hash: None,
            is_active: true,
        }
    }

    /// Live accounts are active and not soft-deleted
    pub fn is_live(&self) -> bool {
        self.is_active && !self.metadata.is_deleted
    }
}

impl IntoIndexes for AccountDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Unique logical id
            (
                doc! { "account_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("account_id_unique".to_string())
                        .build(),
                ),
            ),
            // Per-company kind counting (quota ledger hot path)
            (
                doc! { "company_id": 1, "kind": 1 },
                Some(
                    IndexOptions::builder()
                        .name("company_kind_index".to_string())
                        .build(),
                ),
            ),
            // Child lookups for deletion guards
            (
                doc! { "parent_account_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("parent_index".to_string())
                        .build(),
                ),
            ),
            // Store-level backstop for the one-main-per-company invariant
            (
                doc! { "company_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .partial_filter_expression(doc! { "kind": "main_account" })
                        .name("main_account_per_company_unique".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for AccountDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
