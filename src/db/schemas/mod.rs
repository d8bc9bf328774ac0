//! Document schemas for the directory store

pub mod account;
pub mod connection;
pub mod message;
pub mod metadata;
pub mod subscription;
pub mod task;

pub use account::{AccountDoc, AccountKind, ACCOUNT_COLLECTION};
pub use connection::{
    ConnectionDoc, ConnectionStatus, ConnectionType, InteractionPermission, RelationshipType,
    CONNECTION_COLLECTION,
};
pub use message::{MessageDoc, MessageType, MESSAGE_COLLECTION};
pub use metadata::Metadata;
pub use subscription::{SubscriptionDoc, SUBSCRIPTION_COLLECTION};
pub use task::{TaskDoc, TaskPriority, TaskStatus, TaskType, TASK_COLLECTION};
