use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use blog_core::domain::{NewPost, Post, PostDraft};
use blog_core::error::RepoError;
use blog_core::ports::PostRepository;

#[derive(Default)]
struct Table {
    rows: BTreeMap<i32, Post>,
    last_id: i32,
}

impl Table {
    fn live_mut(&mut self, id: i32) -> Result<&mut Post, RepoError> {
        self.rows
            .get_mut(&id)
            .filter(|post| !post.is_deleted())
            .ok_or(RepoError::NotFound)
    }
}

/// In-memory post store. Rows are never removed, only tombstoned.
#[derive(Default)]
pub struct InMemoryPostRepository {
    table: RwLock<Table>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<Post>, RepoError> {
        let table = self.table.read().await;
        let mut posts: Vec<Post> = table
            .rows
            .values()
            .filter(|post| !post.is_deleted())
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let now = Utc::now();
        let post = Post {
            id: table.last_id,
            author_id: post.author_id,
            title: post.title,
            content: post.content,
            published: post.published,
            published_at: post.published_at,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: i32, draft: PostDraft) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        let post = table.live_mut(id)?;
        post.apply(draft, Utc::now());
        Ok(post.clone())
    }

    async fn mark_deleted(&self, id: i32) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        let post = table.live_mut(id)?;
        let now = Utc::now();
        post.deleted_at = Some(now);
        post.updated_at = now;
        Ok(post.clone())
    }
}
