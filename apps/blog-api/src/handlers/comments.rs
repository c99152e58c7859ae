//! Comment handlers. Every route is nested under a live post.

use actix_web::{HttpResponse, web};

use blog_core::domain::NewComment;
use blog_core::error::DomainError;
use blog_core::{Chain, validation};
use blog_shared::ApiResponse;
use blog_shared::dto::{CreateCommentRequest, UpdateCommentRequest};

use super::{comment_response, parse_body};
use crate::middleware::auth::Authorization;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts/{id}/comments
pub async fn list(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    state
        .pipeline
        .admit(&Chain::anonymous().post(post_id), None)
        .await?;

    let comments = state.comments.list_active(post_id).await?;
    let items: Vec<_> = comments.into_iter().map(comment_response).collect();

    Ok(HttpResponse::Ok().json(ApiResponse::ok(items)))
}

/// POST /api/posts/{id}/comments
///
/// Open to guests. A signed-in caller comments under their own name.
pub async fn create(
    state: web::Data<AppState>,
    auth: Authorization,
    path: web::Path<i32>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let chain = Chain::optionally_authenticated().post(post_id);
    let draft = state
        .pipeline
        .execute(&chain, auth.as_deref(), |resolved| {
            let req: CreateCommentRequest = parse_body(&body)?;
            validation::comment_draft(resolved.principal.as_ref(), req.author_name, req.content)
        })
        .await?
        .input;

    let comment = state
        .comments
        .create(NewComment::new(post_id, draft))
        .await?;

    tracing::info!(
        comment_id = comment.id,
        post_id,
        user_id = comment.user_id,
        "Comment created"
    );

    Ok(HttpResponse::Created().json(ApiResponse::ok(comment_response(comment))))
}

/// GET /api/posts/{id}/comments/{cid}
pub async fn get(
    state: web::Data<AppState>,
    path: web::Path<(i32, i32)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let mut resolved = state
        .pipeline
        .admit(&Chain::anonymous().comment(post_id, comment_id), None)
        .await?;

    let comment = resolved
        .comment
        .take()
        .ok_or_else(|| DomainError::comment_not_found(comment_id))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(comment_response(comment))))
}

/// PUT /api/posts/{id}/comments/{cid}
pub async fn update(
    state: web::Data<AppState>,
    auth: Authorization,
    path: web::Path<(i32, i32)>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let chain = Chain::authenticated()
        .comment(post_id, comment_id)
        .updating();
    let content = state
        .pipeline
        .execute(&chain, auth.as_deref(), |_| {
            let req: UpdateCommentRequest = parse_body(&body)?;
            validation::comment_content(req.content)
        })
        .await?
        .input;

    let comment = state
        .comments
        .update(comment_id, post_id, content)
        .await
        .map_err(|e| DomainError::from_repo(e, "Comment", comment_id))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(comment_response(comment))))
}

/// DELETE /api/posts/{id}/comments/{cid}
pub async fn delete(
    state: web::Data<AppState>,
    auth: Authorization,
    path: web::Path<(i32, i32)>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let chain = Chain::authenticated()
        .comment(post_id, comment_id)
        .deleting();
    let resolved = state.pipeline.admit(&chain, auth.as_deref()).await?;

    let comment = state
        .comments
        .mark_deleted(comment_id, post_id)
        .await
        .map_err(|e| DomainError::from_repo(e, "Comment", comment_id))?;

    tracing::info!(
        comment_id,
        post_id,
        user_id = resolved.principal()?.id,
        "Comment soft-deleted"
    );

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        comment_response(comment),
        "Comment deleted",
    )))
}
