//! Authentication ports.

use crate::domain::{Principal, Role};

/// Claims carried by a signed token, as they were at issuance time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub id: i32,
    pub role: Role,
    pub email: String,
    pub exp: i64,
}

/// Token codec: signs and verifies bearer tokens against a shared secret.
pub trait TokenService: Send + Sync {
    /// Sign a token for the given principal.
    fn issue(&self, principal: &Principal) -> Result<String, AuthError>;

    /// Verify signature, issuer and expiry, then decode the claims.
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of freshly issued tokens.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    #[error("Authorization header must be 'Bearer <token>'")]
    MalformedAuthHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Hashing error: {0}")]
    Hashing(String),
}
