use async_trait::async_trait;

use crate::domain::{Comment, NewComment, NewPost, NewUser, Post, PostDraft, User};
use crate::error::RepoError;

/// User store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Insert a new account. Fails with `RepoError::Constraint` when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;
}

/// Post store.
///
/// `find_by_id` returns tombstones too; everything that serves readers goes
/// through [`PostRepository::active`] so the visibility rule lives in one place.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError>;

    /// Look up a post that has not been soft-deleted.
    async fn active(&self, id: i32) -> Result<Option<Post>, RepoError> {
        Ok(self.find_by_id(id).await?.filter(|post| !post.is_deleted()))
    }

    /// All live posts, newest first.
    async fn list_active(&self) -> Result<Vec<Post>, RepoError>;

    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Rewrite a live post. `RepoError::NotFound` if it is gone or tombstoned.
    async fn update(&self, id: i32, draft: PostDraft) -> Result<Post, RepoError>;

    /// Stamp `deleted_at`. `RepoError::NotFound` if it is gone or already tombstoned.
    async fn mark_deleted(&self, id: i32) -> Result<Post, RepoError>;
}

/// Comment store. Comments are always addressed by `(id, post_id)` together.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: i32, post_id: i32) -> Result<Option<Comment>, RepoError>;

    /// Look up a live comment under the given post.
    async fn active(&self, id: i32, post_id: i32) -> Result<Option<Comment>, RepoError> {
        Ok(self
            .find_by_id(id, post_id)
            .await?
            .filter(|comment| !comment.is_deleted()))
    }

    /// Live comments of a post, oldest first.
    async fn list_active(&self, post_id: i32) -> Result<Vec<Comment>, RepoError>;

    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError>;

    /// Replace the content of a live comment and flag it as edited.
    async fn update(&self, id: i32, post_id: i32, content: String) -> Result<Comment, RepoError>;

    async fn mark_deleted(&self, id: i32, post_id: i32) -> Result<Comment, RepoError>;
}
