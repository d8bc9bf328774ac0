//! Common metadata carried by every stored document
//!
//! Tracks creation, update, and soft-deletion timestamps. Deletion is
//! always soft: reads filter on `is_deleted`, rows stay for audit.

use bson::DateTime;
use serde::{Deserialize, Serialize};

/// Common document metadata
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Metadata {
    /// Whether this document has been soft-deleted
    #[serde(default)]
    pub is_deleted: bool,

    /// When the document was soft-deleted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime>,

    /// When the document was last updated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,

    /// When the document was created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

impl Metadata {
    /// Fresh metadata stamped with the current time
    pub fn new() -> Self {
        Self {
            is_deleted: false,
            deleted_at: None,
            updated_at: Some(DateTime::now()),
            created_at: Some(DateTime::now()),
        }
    }

    /// Bump the update timestamp
    pub fn touch(&mut self) {
        self.updated_at = Some(DateTime::now());
    }

    /// Mark as soft-deleted and stamp the deletion time
    pub fn mark_deleted(&mut self) {
        self.is_deleted = true;
        self.deleted_at = Some(DateTime::now());
        self.touch();
    }
}
