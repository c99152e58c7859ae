//! Post handlers.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use blog_core::domain::{NewPost, PostDraft};
use blog_core::error::{DomainError, RepoError};
use blog_core::{Chain, validation};
use blog_shared::ApiResponse;
use blog_shared::dto::PostRequest;

use super::{parse_body, post_response};
use crate::middleware::auth::Authorization;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// A post that was resolved but is gone by the time it is stamped lost a
/// race with another delete.
fn deletion_error(err: RepoError, post_id: i32) -> DomainError {
    match err {
        RepoError::NotFound => DomainError::AlreadyDeleted {
            entity: "Post",
            id: post_id,
        },
        other => DomainError::from_repo(other, "Post", post_id),
    }
}

fn draft_from(body: &[u8]) -> Result<PostDraft, DomainError> {
    let req: PostRequest = parse_body(body)?;
    validation::post_draft(req.title, req.content, req.published)
}

/// GET /api/posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list_active().await?;

    let mut items = Vec::with_capacity(posts.len());
    for post in posts {
        let comments = state.comments.list_active(post.id).await?;
        items.push(post_response(post, Some(comments)));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok(items)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    auth: Authorization,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let admitted = state
        .pipeline
        .execute(&Chain::authenticated(), auth.as_deref(), |_| draft_from(&body))
        .await?;

    let author_id = admitted.resolved.principal()?.id;
    let post = state
        .posts
        .create(NewPost::new(author_id, admitted.input, Utc::now()))
        .await?;

    tracing::info!(post_id = post.id, author_id, "Post created");

    Ok(HttpResponse::Created().json(ApiResponse::ok(post_response(post, None))))
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let mut resolved = state
        .pipeline
        .admit(&Chain::anonymous().post(post_id), None)
        .await?;

    let comments = state.comments.list_active(post_id).await?;
    let post = resolved
        .post
        .take()
        .ok_or_else(|| DomainError::post_not_found(post_id))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post, Some(comments)))))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    auth: Authorization,
    path: web::Path<i32>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let chain = Chain::authenticated().post(post_id).updating();
    let draft = state
        .pipeline
        .execute(&chain, auth.as_deref(), |_| draft_from(&body))
        .await?
        .input;

    let post = state
        .posts
        .update(post_id, draft)
        .await
        .map_err(|e| DomainError::from_repo(e, "Post", post_id))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post, None))))
}

/// DELETE /api/posts/{id}
///
/// Soft delete: the post is stamped and kept. Deleting it again is a 400.
pub async fn delete(
    state: web::Data<AppState>,
    auth: Authorization,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let chain = Chain::authenticated()
        .post_for_deletion(post_id)
        .deleting();
    let resolved = state.pipeline.admit(&chain, auth.as_deref()).await?;

    let post = state
        .posts
        .mark_deleted(post_id)
        .await
        .map_err(|e| deletion_error(e, post_id))?;

    tracing::info!(
        post_id,
        user_id = resolved.principal()?.id,
        "Post soft-deleted"
    );

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        post_response(post, None),
        "Post deleted",
    )))
}
