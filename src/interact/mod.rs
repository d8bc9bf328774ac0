//! Interaction services layered on the connection graph
//!
//! Messaging, task assignment, and status sync share one gate sequence:
//! capability check, structural eligibility, edge-scoped grant, and only
//! then the domain write plus a `last_interaction_at` bump.

pub mod messaging;
pub mod status;
pub mod tasks;

pub use messaging::{MessagingService, SendMessageRequest};
pub use status::{LogStatusSink, StatusSink, StatusSyncService, StatusUpdate, SyncStatusRequest};
pub use tasks::{AssignTaskRequest, TaskService};
