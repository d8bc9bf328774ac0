//! Identity claims and the JWT claim reader
//!
//! Token issuance policy (refresh, rotation, session management) lives
//! with the API layer; the core only needs "a verified token yields an
//! identity claim". Any verification failure is `Unauthenticated`, never
//! `PermissionDenied` — the two are distinct outcomes for callers.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::schemas::AccountKind;
use crate::error::{PorterError, Result};

/// The identity attached to every authorized operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaim {
    /// Logical account id of the caller
    pub account_id: String,

    /// Caller's company; absent for developer accounts
    pub company_id: Option<String>,

    /// Free-form role label, consumed only by the legacy fallback
    pub role: String,

    /// The primary authorization dispatch key
    pub account_kind: AccountKind,

    /// Platform override flag set at token issuance
    pub is_super_admin: bool,
}

impl IdentityClaim {
    /// Whether the claim belongs to a company tenant
    pub fn is_company_scoped(&self) -> bool {
        self.company_id.is_some()
    }

    /// Whether the claim's company matches the given one
    pub fn company_matches(&self, company_id: Option<&str>) -> bool {
        self.company_id.as_deref() == company_id
    }
}

/// JWT payload carrying the claim fields
#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    /// Account id
    sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    company_id: Option<String>,
    role: String,
    account_kind: AccountKind,
    #[serde(default)]
    is_super_admin: bool,
    exp: i64,
    iat: i64,
}

/// Verifies bearer tokens into identity claims
pub struct ClaimReader {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiry_seconds: u64,
}

impl ClaimReader {
    /// HMAC-SHA256 reader over a shared secret
    pub fn new(secret: &str, expiry_seconds: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
            expiry_seconds,
        }
    }

    /// Mint a token for a claim (login flows and tests)
    pub fn issue(&self, claim: &IdentityClaim) -> Result<String> {
        let now = Utc::now().timestamp();
        let payload = TokenPayload {
            sub: claim.account_id.clone(),
            company_id: claim.company_id.clone(),
            role: claim.role.clone(),
            account_kind: claim.account_kind,
            is_super_admin: claim.is_super_admin,
            exp: now + self.expiry_seconds as i64,
            iat: now,
        };

        encode(&Header::default(), &payload, &self.encoding)
            .map_err(|e| PorterError::Database(format!("token encoding failed: {e}")))
    }

    /// Verify a token and extract the identity claim
    pub fn read(&self, token: &str) -> Result<IdentityClaim> {
        let data = decode::<TokenPayload>(token, &self.decoding, &self.validation)
            .map_err(|_| PorterError::Unauthenticated)?;

        let payload = data.claims;
        Ok(IdentityClaim {
            account_id: payload.sub,
            company_id: payload.company_id,
            role: payload.role,
            account_kind: payload.account_kind,
            is_super_admin: payload.is_super_admin,
        })
    }
}

/// Pull the bearer token out of an Authorization header value
pub fn extract_token_from_header(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee_claim() -> IdentityClaim {
        IdentityClaim {
            account_id: "emp1".into(),
            company_id: Some("c1".into()),
            role: "employee".into(),
            account_kind: AccountKind::Employee,
            is_super_admin: false,
        }
    }

    #[test]
    fn test_issue_and_read_roundtrip() {
        let reader = ClaimReader::new("test-secret", 3600);
        let token = reader.issue(&employee_claim()).unwrap();
        let claim = reader.read(&token).unwrap();

        assert_eq!(claim.account_id, "emp1");
        assert_eq!(claim.company_id.as_deref(), Some("c1"));
        assert_eq!(claim.account_kind, AccountKind::Employee);
        assert!(!claim.is_super_admin);
    }

    #[test]
    fn test_wrong_secret_is_unauthenticated() {
        let reader = ClaimReader::new("secret-a", 3600);
        let token = reader.issue(&employee_claim()).unwrap();

        let other = ClaimReader::new("secret-b", 3600);
        assert!(matches!(
            other.read(&token),
            Err(PorterError::Unauthenticated)
        ));
    }

    #[test]
    fn test_garbage_token_is_unauthenticated() {
        let reader = ClaimReader::new("test-secret", 3600);
        assert!(matches!(
            reader.read("not.a.token"),
            Err(PorterError::Unauthenticated)
        ));
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(
            extract_token_from_header("Bearer abc.def.ghi"),
            Some("abc.def.ghi")
        );
        assert_eq!(extract_token_from_header("Basic dXNlcg=="), None);
        assert_eq!(extract_token_from_header("Bearer "), None);
    }
}
