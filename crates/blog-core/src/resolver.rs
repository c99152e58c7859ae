//! Resource resolution with soft-delete visibility.

use std::sync::Arc;

use crate::domain::{Comment, Post};
use crate::error::DomainError;
use crate::ports::{CommentRepository, PostRepository};

/// Loads the post, and the comment nested under it, that a route addresses.
#[derive(Clone)]
pub struct ResourceResolver {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl ResourceResolver {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { posts, comments }
    }

    /// A live post. Tombstones are indistinguishable from missing posts.
    pub async fn resolve_post(&self, post_id: i32) -> Result<Post, DomainError> {
        self.posts
            .active(post_id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))
    }

    /// A post for the delete endpoint, tombstones included.
    ///
    /// The pipeline turns a tombstone into a conflict before checking ownership.
    pub async fn resolve_post_for_deletion(&self, post_id: i32) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))
    }

    /// A live comment that belongs to `post_id`.
    ///
    /// A comment that exists under some other post is reported exactly like
    /// a missing one.
    pub async fn resolve_comment(
        &self,
        comment_id: i32,
        post_id: i32,
    ) -> Result<Comment, DomainError> {
        self.comments
            .active(comment_id, post_id)
            .await?
            .ok_or_else(|| DomainError::comment_not_found(comment_id))
    }
}
