//! Argon2id password hashing.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use blog_core::ports::{AuthError, PasswordService};

/// Password hasher producing PHC strings (`$argon2id$v=19$...`).
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    /// Use explicit cost parameters, e.g. cheaper ones in tests.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hashing(e.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Hashing(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2PasswordService {
        Argon2PasswordService::with_params(Params::new(1024, 1, 1, None).unwrap())
    }

    #[test]
    fn correct_password_verifies() {
        let service = cheap();
        let hash = service.hash("hunter22").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(service.verify("hunter22", &hash).unwrap());
        assert!(!service.verify("hunter23", &hash).unwrap());
    }

    #[test]
    fn corrupt_hash_is_an_error() {
        let result = cheap().verify("anything", "not-a-phc-string");
        assert!(matches!(result, Err(AuthError::Hashing(_))));
    }
}
