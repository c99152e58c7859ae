use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use blog_core::domain::{Comment, NewComment};
use blog_core::error::RepoError;
use blog_core::ports::CommentRepository;

#[derive(Default)]
struct Table {
    rows: BTreeMap<i32, Comment>,
    last_id: i32,
}

impl Table {
    fn live_mut(&mut self, id: i32, post_id: i32) -> Result<&mut Comment, RepoError> {
        self.rows
            .get_mut(&id)
            .filter(|c| c.post_id == post_id && !c.is_deleted())
            .ok_or(RepoError::NotFound)
    }
}

/// In-memory comment store keyed by comment id, always matched on post id too.
#[derive(Default)]
pub struct InMemoryCommentRepository {
    table: RwLock<Table>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_id(&self, id: i32, post_id: i32) -> Result<Option<Comment>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).filter(|c| c.post_id == post_id).cloned())
    }

    async fn list_active(&self, post_id: i32) -> Result<Vec<Comment>, RepoError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|c| c.post_id == post_id && !c.is_deleted())
            .cloned()
            .collect())
    }

    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let now = Utc::now();
        let comment = Comment {
            id: table.last_id,
            post_id: comment.post_id,
            author_name: comment.author_name,
            email: comment.email,
            user_id: comment.user_id,
            content: comment.content,
            edited: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, id: i32, post_id: i32, content: String) -> Result<Comment, RepoError> {
        let mut table = self.table.write().await;
        let comment = table.live_mut(id, post_id)?;
        comment.content = content;
        comment.edited = true;
        comment.updated_at = Utc::now();
        Ok(comment.clone())
    }

    async fn mark_deleted(&self, id: i32, post_id: i32) -> Result<Comment, RepoError> {
        let mut table = self.table.write().await;
        let comment = table.live_mut(id, post_id)?;
        let now = Utc::now();
        comment.deleted_at = Some(now);
        comment.updated_at = now;
        Ok(comment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest(post_id: i32, content: &str) -> NewComment {
        NewComment {
            post_id,
            author_name: "Bob".to_string(),
            email: None,
            user_id: None,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn lookup_requires_matching_post() {
        let repo = InMemoryCommentRepository::new();
        let comment = repo.create(guest(1, "Hi")).await.unwrap();

        assert!(repo.active(comment.id, 1).await.unwrap().is_some());
        assert!(repo.active(comment.id, 2).await.unwrap().is_none());
        assert!(matches!(
            repo.update(comment.id, 2, "Hijack".to_string()).await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn edit_sets_flag_and_delete_hides() {
        let repo = InMemoryCommentRepository::new();
        let first = repo.create(guest(1, "Hi")).await.unwrap();
        repo.create(guest(1, "Second")).await.unwrap();

        let edited = repo.update(first.id, 1, "Hello".to_string()).await.unwrap();
        assert!(edited.edited);
        assert_eq!(edited.content, "Hello");

        repo.mark_deleted(first.id, 1).await.unwrap();
        let live = repo.list_active(1).await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].content, "Second");
        assert!(repo.find_by_id(first.id, 1).await.unwrap().unwrap().is_deleted());
    }
}
