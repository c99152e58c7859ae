//! JWT token codec.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use blog_core::domain::Principal;
use blog_core::ports::{AuthError, TokenClaims, TokenService};

const DEFAULT_SECRET: &str = "change-me-in-production";

/// JWT codec configuration. Built once at startup and handed to
/// [`JwtTokenService::new`]; nothing reads the environment afterwards.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_SECRET.to_string(),
            expiration_hours: 24 * 7,
            issuer: "blog-api".to_string(),
        }
    }
}

/// Raised when the JWT settings are unusable for the current environment.
#[derive(Debug, thiserror::Error)]
pub enum JwtConfigError {
    #[error("JWT_SECRET must be set in production")]
    DefaultSecretInProduction,

    #[error("JWT_EXPIRATION_HOURS must be a positive number of hours, got {0:?}")]
    InvalidExpiration(String),
}

impl JwtConfig {
    /// Read `JWT_SECRET`, `JWT_EXPIRATION_HOURS` and `JWT_ISSUER`.
    pub fn from_env() -> Result<Self, JwtConfigError> {
        let defaults = Self::default();

        let secret = std::env::var("JWT_SECRET").unwrap_or(defaults.secret);
        if secret == DEFAULT_SECRET {
            let is_production = std::env::var("RUST_ENV")
                .map(|v| v == "production" || v == "prod")
                .unwrap_or(false);

            if is_production {
                tracing::error!("SECURITY: refusing the default JWT secret in production");
                return Err(JwtConfigError::DefaultSecretInProduction);
            }
            tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
        }

        let expiration_hours = match std::env::var("JWT_EXPIRATION_HOURS") {
            Ok(raw) => match raw.parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => return Err(JwtConfigError::InvalidExpiration(raw)),
            },
            Err(_) => defaults.expiration_hours,
        };

        Ok(Self {
            secret,
            expiration_hours,
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        })
    }
}

/// Wire form of the claims.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    email: String,
    exp: i64,
    iat: i64,
    iss: String,
}

/// HMAC-SHA256 signed bearer tokens.
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, principal: &Principal) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + TimeDelta::hours(self.config.expiration_hours);

        self.sign(&Claims {
            sub: principal.id.to_string(),
            role: principal.role.to_string(),
            email: principal.email.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        })
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "token expired".to_string(),
                ErrorKind::InvalidSignature => "signature mismatch".to_string(),
                ErrorKind::InvalidIssuer => "unexpected issuer".to_string(),
                _ => e.to_string(),
            };
            AuthError::InvalidToken(reason)
        })?;

        let claims = data.claims;
        let id = claims
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidToken("malformed subject".to_string()))?;
        let role = claims
            .role
            .parse()
            .map_err(|e: blog_core::domain::UnknownRole| AuthError::InvalidToken(e.to_string()))?;

        Ok(TokenClaims {
            id,
            role,
            email: claims.email,
            exp: claims.exp,
        })
    }

    fn expiration_seconds(&self) -> i64 {
        self.config.expiration_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_core::domain::Role;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key".to_string(),
            expiration_hours: 1,
            issuer: "test-issuer".to_string(),
        }
    }

    fn principal(id: i32, role: Role) -> Principal {
        Principal {
            id,
            role,
            email: "test@example.com".to_string(),
            name: "Tester".to_string(),
        }
    }

    fn assert_invalid(result: Result<TokenClaims, AuthError>) {
        assert!(
            matches!(result, Err(AuthError::InvalidToken(_))),
            "expected InvalidToken, got {result:?}"
        );
    }

    #[test]
    fn issued_token_verifies_to_the_same_subject() {
        let service = JwtTokenService::new(test_config());

        let token = service.issue(&principal(42, Role::Admin)).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.id, 42);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.email, "test@example.com");
    }

    #[test]
    fn garbage_is_invalid() {
        let service = JwtTokenService::new(test_config());
        assert_invalid(service.verify("invalid-token"));
    }

    #[test]
    fn other_secret_is_invalid() {
        let issuer = JwtTokenService::new(JwtConfig {
            secret: "another-secret".to_string(),
            ..test_config()
        });
        let verifier = JwtTokenService::new(test_config());

        let token = issuer.issue(&principal(1, Role::User)).unwrap();
        assert_invalid(verifier.verify(&token));
    }

    #[test]
    fn other_issuer_is_invalid() {
        let issuer = JwtTokenService::new(JwtConfig {
            issuer: "issuer1".to_string(),
            ..test_config()
        });
        let verifier = JwtTokenService::new(test_config());

        let token = issuer.issue(&principal(1, Role::User)).unwrap();
        assert_invalid(verifier.verify(&token));
    }

    #[test]
    fn expired_token_is_invalid() {
        let service = JwtTokenService::new(test_config());
        let past = Utc::now() - TimeDelta::hours(2);

        let token = service
            .sign(&Claims {
                sub: "1".to_string(),
                role: "USER".to_string(),
                email: "old@example.com".to_string(),
                exp: past.timestamp(),
                iat: (past - TimeDelta::hours(1)).timestamp(),
                iss: "test-issuer".to_string(),
            })
            .unwrap();

        match service.verify(&token) {
            Err(AuthError::InvalidToken(reason)) => assert_eq!(reason, "token expired"),
            other => panic!("expected expiry rejection, got {other:?}"),
        }
    }

    #[test]
    fn recently_expired_token_is_invalid() {
        let service = JwtTokenService::new(test_config());
        let now = Utc::now();

        let token = service
            .sign(&Claims {
                sub: "1".to_string(),
                role: "USER".to_string(),
                email: "e@example.com".to_string(),
                exp: (now - TimeDelta::seconds(30)).timestamp(),
                iat: (now - TimeDelta::minutes(5)).timestamp(),
                iss: "test-issuer".to_string(),
            })
            .unwrap();

        match service.verify(&token) {
            Err(AuthError::InvalidToken(reason)) => assert_eq!(reason, "token expired"),
            other => panic!("expected expiry rejection, got {other:?}"),
        }
    }

    #[test]
    fn unknown_role_is_invalid() {
        let service = JwtTokenService::new(test_config());
        let token = service
            .sign(&Claims {
                sub: "1".to_string(),
                role: "ROOT".to_string(),
                email: "x@example.com".to_string(),
                exp: (Utc::now() + TimeDelta::hours(1)).timestamp(),
                iat: Utc::now().timestamp(),
                iss: "test-issuer".to_string(),
            })
            .unwrap();

        assert_invalid(service.verify(&token));
    }

    #[test]
    fn expiration_seconds_follow_config() {
        let service = JwtTokenService::new(JwtConfig {
            expiration_hours: 24 * 7,
            ..test_config()
        });

        assert_eq!(service.expiration_seconds(), 604_800);
    }
}
