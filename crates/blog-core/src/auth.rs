//! Credential verification and principal loading.

use std::sync::Arc;

use crate::domain::Principal;
use crate::error::DomainError;
use crate::ports::{AuthError, TokenClaims, TokenService, UserRepository};

const SCHEME: &str = "Bearer";

/// Pull the token out of a `Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let (scheme, token) = header
        .split_once(' ')
        .ok_or(AuthError::MalformedAuthHeader)?;

    if scheme != SCHEME || token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::MalformedAuthHeader);
    }
    Ok(token)
}

/// Turns an `Authorization` header into a live [`Principal`].
///
/// Verification only proves the token was ours and is unexpired; the
/// principal itself is re-read from the user store so that role and email
/// reflect the current record.
#[derive(Clone)]
pub struct Authenticator {
    tokens: Arc<dyn TokenService>,
    users: Arc<dyn UserRepository>,
}

impl Authenticator {
    pub fn new(tokens: Arc<dyn TokenService>, users: Arc<dyn UserRepository>) -> Self {
        Self { tokens, users }
    }

    /// Check the header shape and the token signature.
    pub fn verify(&self, header: &str) -> Result<TokenClaims, AuthError> {
        let token = bearer_token(header)?;
        self.tokens.verify(token)
    }

    /// Re-hydrate the caller from the user store.
    ///
    /// A user deleted since the token was issued is reported as an invalid
    /// token: there is no identity left to act as.
    pub async fn load(&self, claims: &TokenClaims) -> Result<Principal, DomainError> {
        match self.users.find_by_id(claims.id).await? {
            Some(user) => Ok(Principal::from(user)),
            None => {
                tracing::info!(user_id = claims.id, "token subject no longer exists");
                Err(AuthError::InvalidToken("unknown subject".to_string()).into())
            }
        }
    }

    /// Mandatory authentication: a missing header ends the request.
    pub async fn require(&self, header: Option<&str>) -> Result<Principal, DomainError> {
        let header = header.ok_or(AuthError::MissingAuthHeader)?;
        let claims = self.verify(header)?;
        self.load(&claims).await
    }

    /// Optional authentication: no header means an anonymous caller, but a
    /// header that is present must still be valid.
    pub async fn optional(&self, header: Option<&str>) -> Result<Option<Principal>, DomainError> {
        match header {
            Some(header) => {
                let claims = self.verify(header)?;
                self.load(&claims).await.map(Some)
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bearer_scheme() {
        assert_eq!(bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_other_shapes() {
        for header in [
            "",
            "Bearer",
            "Bearer ",
            "bearer abc",
            "Basic dXNlcjpwYXNz",
            "Bearer abc def",
            "Bearer  abc",
            "Bearer abc ",
            "Bearer\tabc",
            "abc",
        ] {
            assert!(
                matches!(bearer_token(header), Err(AuthError::MalformedAuthHeader)),
                "{header:?} should be malformed"
            );
        }
    }
}
