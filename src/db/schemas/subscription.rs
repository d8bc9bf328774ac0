//! Subscription document schema
//!
//! Written by the (out-of-scope) billing service; the core reads the most
//! recent row per company to derive account-kind limits. Limits are never
//! cached as counters — the quota ledger recounts live accounts at
//! decision time.

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for subscriptions
pub const SUBSCRIPTION_COLLECTION: &str = "subscriptions";

/// Subscription document
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SubscriptionDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<bson::oid::ObjectId>,

    /// Common metadata; `created_at` selects the active subscription
    #[serde(default)]
    pub metadata: Metadata,

    /// Stable logical identifier (UUID string)
    pub subscription_id: String,

    /// Company this plan belongs to
    pub company_id: String,

    /// Plan label, opaque to the core
    pub plan: String,

    /// Maximum sub-accounts admitted by the plan
    pub max_sub_accounts: i64,

    /// Maximum employee accounts admitted by the plan
    pub max_employees: i64,
}

impl SubscriptionDoc {
    /// Create a new subscription row for a company
    pub fn new(company_id: String, plan: String, max_sub_accounts: i64, max_employees: i64) -> Self {
        Self {
            _id: None,
            metadata: Metadata::new(),
            subscription_id: uuid::Uuid::new_v4().to_string(),
            company_id,
            plan,
            max_sub_accounts,
            max_employees,
        }
    }
}

impl IntoIndexes for SubscriptionDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Most-recent-per-company lookup
            (
                doc! { "company_id": 1, "metadata.created_at": -1 },
                Some(
                    IndexOptions::builder()
                        .name("company_recency_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for SubscriptionDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
