//! Environment-driven configuration
//!
//! The core is a library: services take injected dependencies and this
//! struct only feeds the persistence and claim-reader wiring. Values
//! come from `PORTER_*` environment variables, with `.env` support for
//! development.

use std::env;

/// Wiring configuration for the store and claim reader
#[derive(Debug, Clone)]
pub struct Config {
    /// MongoDB connection URI
    pub mongodb_uri: String,

    /// MongoDB database name
    pub mongodb_db: String,

    /// JWT signing secret; required outside dev mode
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds
    pub jwt_expiry_seconds: u64,

    /// Development mode: permits a default insecure JWT secret
    pub dev_mode: bool,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Read configuration from the environment (and `.env` if present)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            mongodb_uri: env_or("PORTER_MONGODB_URI", "mongodb://localhost:27017"),
            mongodb_db: env_or("PORTER_MONGODB_DB", "porter"),
            jwt_secret: env::var("PORTER_JWT_SECRET").ok(),
            jwt_expiry_seconds: env_or("PORTER_JWT_EXPIRY_SECONDS", "3600")
                .parse()
                .unwrap_or(3600),
            dev_mode: env_or("PORTER_DEV_MODE", "false") == "true",
        }
    }

    /// Effective JWT secret (uses a default in dev mode)
    pub fn jwt_secret(&self) -> String {
        if self.dev_mode {
            self.jwt_secret
                .clone()
                .unwrap_or_else(|| "dev-only-insecure-secret".to_string())
        } else {
            self.jwt_secret
                .clone()
                .expect("PORTER_JWT_SECRET is required outside dev mode")
        }
    }

    /// Validate configuration before wiring services
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode && self.jwt_secret.is_none() {
            return Err("PORTER_JWT_SECRET is required outside dev mode".to_string());
        }
        if self.jwt_expiry_seconds == 0 {
            return Err("PORTER_JWT_EXPIRY_SECONDS must be positive".to_string());
        }
        Ok(())
    }
}
