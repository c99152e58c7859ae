//! Domain-level error types.

use thiserror::Error;

use crate::ports::AuthError;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Domain errors - every way a request can be turned away.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(AuthError),

    #[error("Insufficient rights for this action")]
    Forbidden,

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("{entity} {id} already deleted")]
    AlreadyDeleted { entity: &'static str, id: i32 },

    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn post_not_found(id: i32) -> Self {
        DomainError::NotFound { entity: "Post", id }
    }

    pub fn comment_not_found(id: i32) -> Self {
        DomainError::NotFound {
            entity: "Comment",
            id,
        }
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::Validation(vec![FieldError::new(field, message)])
    }

    /// Map a store failure, giving `RepoError::NotFound` an entity context.
    pub fn from_repo(err: RepoError, entity: &'static str, id: i32) -> Self {
        match err {
            RepoError::NotFound => DomainError::NotFound { entity, id },
            other => other.into(),
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Signing(msg) | AuthError::Hashing(msg) => DomainError::Internal(msg),
            other => DomainError::Unauthenticated(other),
        }
    }
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Constraint(msg) => DomainError::Duplicate(msg),
            other => DomainError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_not_found_takes_entity_context() {
        let err = DomainError::from_repo(RepoError::NotFound, "Comment", 9);
        assert!(matches!(
            err,
            DomainError::NotFound {
                entity: "Comment",
                id: 9
            }
        ));
    }

    #[test]
    fn store_outage_is_internal() {
        let err: DomainError = RepoError::Connection("refused".to_string()).into();
        assert!(matches!(err, DomainError::Internal(_)));
    }

    #[test]
    fn credential_failures_are_unauthenticated() {
        let err: DomainError = AuthError::InvalidToken("token expired".to_string()).into();
        assert!(matches!(
            err,
            DomainError::Unauthenticated(AuthError::InvalidToken(_))
        ));

        let err: DomainError = AuthError::MissingAuthHeader.into();
        assert!(matches!(
            err,
            DomainError::Unauthenticated(AuthError::MissingAuthHeader)
        ));
    }

    #[test]
    fn codec_failures_are_internal() {
        let err: DomainError = AuthError::Signing("bad key".to_string()).into();
        assert!(matches!(err, DomainError::Internal(ref msg) if msg == "bad key"));

        let err: DomainError = AuthError::Hashing("out of memory".to_string()).into();
        assert!(matches!(err, DomainError::Internal(_)));
    }

    #[test]
    fn validation_message_lists_fields() {
        let err = DomainError::Validation(vec![
            FieldError::new("title", "too short"),
            FieldError::new("content", "required"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: title: too short, content: required"
        );
    }
}
