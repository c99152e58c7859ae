//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use blog_core::error::{DomainError, FieldError, RepoError};
use blog_core::ports::AuthError;
use blog_shared::{ErrorResponse, FieldViolation};
use std::fmt;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    /// 401 with the reason code of the failed credential check.
    Unauthorized {
        reason: &'static str,
        detail: String,
    },
    InvalidCredentials,
    Forbidden,
    NotFound(String),
    AlreadyDeleted(String),
    Validation(Vec<FieldError>),
    Conflict(String),
    Internal(String),
}

impl AppError {
    /// Machine-readable code carried in the body's `reason` field.
    pub fn reason(&self) -> &'static str {
        match self {
            AppError::Unauthorized { reason, .. } => *reason,
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Forbidden => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::AlreadyDeleted(_) => "already_deleted",
            AppError::Validation(_) => "validation_failed",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) => "internal",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Unauthorized { detail, .. } => write!(f, "Unauthorized: {}", detail),
            AppError::InvalidCredentials => write!(f, "Invalid email or password"),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::AlreadyDeleted(msg) => write!(f, "Already deleted: {}", msg),
            AppError::Validation(errors) => write!(f, "Validation errors: {:?}", errors),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized { .. } | AppError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyDeleted(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::Unauthorized { reason, detail } => {
                ErrorResponse::unauthorized(*reason).with_detail(detail.clone())
            }
            AppError::InvalidCredentials => ErrorResponse::unauthorized(self.reason())
                .with_detail("Invalid email or password"),
            AppError::Forbidden => ErrorResponse::forbidden()
                .with_detail("Insufficient rights for this action"),
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::AlreadyDeleted(detail) => {
                ErrorResponse::new(400, "Bad Request", self.reason()).with_detail(detail)
            }
            AppError::Validation(errors) => {
                ErrorResponse::new(400, "Validation Failed", self.reason())
                    .with_detail("Request input is invalid")
                    .with_errors(errors.iter().map(violation).collect())
            }
            AppError::Conflict(detail) => {
                ErrorResponse::new(409, "Conflict", self.reason()).with_detail(detail)
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

fn violation(error: &FieldError) -> FieldViolation {
    FieldViolation {
        field: error.field.to_string(),
        message: error.message.clone(),
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let reason = match &err {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::MalformedAuthHeader => "malformed_auth_header",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::Signing(_) | AuthError::Hashing(_) => {
                return AppError::Internal(err.to_string());
            }
        };
        AppError::Unauthorized {
            reason,
            detail: err.to_string(),
        }
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Unauthenticated(auth) => auth.into(),
            DomainError::InvalidCredentials => AppError::InvalidCredentials,
            DomainError::Forbidden => AppError::Forbidden,
            err @ DomainError::NotFound { .. } => AppError::NotFound(err.to_string()),
            err @ DomainError::AlreadyDeleted { .. } => AppError::AlreadyDeleted(err.to_string()),
            DomainError::Validation(errors) => AppError::Validation(errors),
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
