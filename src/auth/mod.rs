//! Authentication and authorization
//!
//! Provides:
//! - Identity claims and JWT claim reading
//! - The layered permission resolver and capability tables
//! - The data access boundary calculator
//! - Password hashing with Argon2

pub mod boundary;
pub mod capability;
pub mod claims;
pub mod password;
pub mod resolver;

pub use boundary::{AccessBoundary, DepartmentPolicy, PermitAllDepartments, ResourceScope};
pub use capability::{Capability, CapabilityTables};
pub use claims::{extract_token_from_header, ClaimReader, IdentityClaim};
pub use password::{hash_password, verify_password};
pub use resolver::{LegacyRoleStore, NoLegacyRoles, PermissionResolver, SUPER_ADMIN_ROLE};
