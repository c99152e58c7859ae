//! Authentication handlers.

use actix_web::{HttpResponse, web};

use blog_core::domain::{NewUser, Principal, mask_email};
use blog_core::error::DomainError;
use blog_core::{Chain, validation};
use blog_shared::ApiResponse;
use blog_shared::dto::{AuthResponse, LoginRequest, RegisterRequest};

use super::{parse_body, principal_response, user_response};
use crate::middleware::auth::Authorization;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(state: web::Data<AppState>, body: web::Bytes) -> AppResult<HttpResponse> {
    let form = state
        .pipeline
        .execute(&Chain::anonymous(), None, |_| {
            let req: RegisterRequest = parse_body(&body)?;
            validation::registration(req.email, req.name, req.password)
        })
        .await?
        .input;

    if state.users.find_by_email(&form.email).await?.is_some() {
        tracing::info!(user_email = %mask_email(&form.email), "Registration for taken email");
        return Err(DomainError::Duplicate("Email already registered".to_string()).into());
    }

    let password_hash = state.passwords.hash(&form.password).map_err(DomainError::from)?;
    let user = state
        .users
        .create(NewUser::new(form.email, form.name, password_hash))
        .await
        .map_err(DomainError::from)?;

    let token = state
        .tokens
        .issue(&Principal::from(&user))
        .map_err(DomainError::from)?;

    tracing::info!(user_id = user.id, "User registered");

    Ok(HttpResponse::Created().json(ApiResponse::ok(AuthResponse::bearer(
        token,
        state.tokens.expiration_seconds(),
        user_response(&user),
    ))))
}

/// POST /api/auth/login
pub async fn login(state: web::Data<AppState>, body: web::Bytes) -> AppResult<HttpResponse> {
    let credentials = state
        .pipeline
        .execute(&Chain::anonymous(), None, |_| {
            let req: LoginRequest = parse_body(&body)?;
            validation::credentials(req.email, req.password)
        })
        .await?
        .input;

    let Some(user) = state.users.find_by_email(&credentials.email).await? else {
        tracing::info!(user_email = %mask_email(&credentials.email), "Login for unknown email");
        return Err(DomainError::InvalidCredentials.into());
    };

    let valid = state
        .passwords
        .verify(&credentials.password, &user.password_hash)
        .map_err(DomainError::from)?;

    if !valid {
        tracing::info!(user_id = user.id, "Login with wrong password");
        return Err(DomainError::InvalidCredentials.into());
    }

    let token = state
        .tokens
        .issue(&Principal::from(&user))
        .map_err(DomainError::from)?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(AuthResponse::bearer(
        token,
        state.tokens.expiration_seconds(),
        user_response(&user),
    ))))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, auth: Authorization) -> AppResult<HttpResponse> {
    let resolved = state
        .pipeline
        .admit(&Chain::authenticated(), auth.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(principal_response(resolved.principal()?))))
}
