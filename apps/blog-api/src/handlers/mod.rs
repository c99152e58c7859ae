//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod posts;

use actix_web::{HttpRequest, error, web};
use serde::de::DeserializeOwned;

use blog_core::domain::{Comment, Post, Principal, User};
use blog_core::error::DomainError;
use blog_shared::dto::{CommentResponse, PostResponse, UserResponse};

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PathConfig::default().error_handler(path_error))
        .service(
            web::scope("/api")
                // Public routes
                .route("/health", web::get().to(health::health_check))
                // Auth routes
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login))
                        .route("/me", web::get().to(auth::me)),
                )
                // Posts and their comments
                .service(
                    web::scope("/posts")
                        .route("", web::get().to(posts::list))
                        .route("", web::post().to(posts::create))
                        .route("/{id}", web::get().to(posts::get))
                        .route("/{id}", web::put().to(posts::update))
                        .route("/{id}", web::delete().to(posts::delete))
                        .route("/{id}/comments", web::get().to(comments::list))
                        .route("/{id}/comments", web::post().to(comments::create))
                        .route("/{id}/comments/{cid}", web::get().to(comments::get))
                        .route("/{id}/comments/{cid}", web::put().to(comments::update))
                        .route("/{id}/comments/{cid}", web::delete().to(comments::delete)),
                ),
        );
}

/// An id segment that is not a number cannot name any resource.
fn path_error(err: error::PathError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(path = %req.path(), error = %err, "unparseable path id");
    AppError::NotFound(format!("No resource at {}", req.path())).into()
}

/// Decode a request body inside the validation stage.
///
/// An empty body decodes to the all-missing request so that each required
/// field is reported on its own.
fn parse_body<T>(body: &[u8]) -> Result<T, DomainError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| DomainError::invalid("body", format!("Malformed JSON body: {e}")))
}

fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role.to_string(),
        created_at: Some(user.created_at),
    }
}

fn principal_response(principal: &Principal) -> UserResponse {
    UserResponse {
        id: principal.id,
        email: principal.email.clone(),
        name: principal.name.clone(),
        role: principal.role.to_string(),
        created_at: None,
    }
}

fn comment_response(comment: Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        author_name: comment.author_name,
        user_id: comment.user_id,
        content: comment.content,
        edited: comment.edited,
        deleted_at: comment.deleted_at,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}

fn post_response(post: Post, comments: Option<Vec<Comment>>) -> PostResponse {
    PostResponse {
        id: post.id,
        author_id: post.author_id,
        title: post.title,
        content: post.content,
        published: post.published,
        published_at: post.published_at,
        deleted_at: post.deleted_at,
        created_at: post.created_at,
        updated_at: post.updated_at,
        comments: comments.map(|list| list.into_iter().map(comment_response).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_shared::dto::PostRequest;

    #[test]
    fn test_empty_body_is_all_missing() {
        let req: PostRequest = parse_body(b"  ").unwrap();
        assert!(req.title.is_none());
        assert!(req.content.is_none());
    }

    #[test]
    fn test_malformed_body_fails_validation() {
        let err = parse_body::<PostRequest>(b"{not json").unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref errors) if errors[0].field == "body"));
    }

    #[test]
    fn test_wrong_field_type_fails_validation() {
        let err = parse_body::<PostRequest>(br#"{"published":"yes"}"#).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
