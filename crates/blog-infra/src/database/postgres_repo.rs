//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use blog_core::domain::{
    Comment, NewComment, NewPost, NewUser, Post, PostDraft, User, mask_email,
};
use blog_core::error::RepoError;
use blog_core::ports::{CommentRepository, PostRepository, UserRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresRepository, query_err, write_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepoError> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?
            .map(User::try_from)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_err)?
            .map(User::try_from)
            .transpose()
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let now = Utc::now();
        let model = user::ActiveModel {
            email: Set(new_user.email),
            name: Set(new_user.name),
            role: Set(new_user.role.to_string()),
            password_hash: Set(new_user.password_hash),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err)?;

        User::try_from(model)
    }
}

impl PostgresPostRepository {
    async fn find_live(&self, id: i32) -> Result<post::Model, RepoError> {
        PostEntity::find_by_id(id)
            .filter(post::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(query_err)?
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_active(&self) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::DeletedAt.is_null())
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let now = Utc::now();
        let model = post::ActiveModel {
            author_id: Set(new_post.author_id),
            title: Set(new_post.title),
            content: Set(new_post.content),
            published: Set(new_post.published),
            published_at: Set(new_post.published_at.map(Into::into)),
            deleted_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err)?;

        Ok(model.into())
    }

    async fn update(&self, id: i32, draft: PostDraft) -> Result<Post, RepoError> {
        let model = self.find_live(id).await?;
        let now = Utc::now();

        let mut updated: Post = model.clone().into();
        updated.apply(draft, now);

        let mut active: post::ActiveModel = model.into();
        active.title = Set(updated.title);
        active.content = Set(updated.content);
        active.published = Set(updated.published);
        active.published_at = Set(updated.published_at.map(Into::into));
        active.updated_at = Set(now.into());

        let model = active.update(&self.db).await.map_err(write_err)?;
        Ok(model.into())
    }

    async fn mark_deleted(&self, id: i32) -> Result<Post, RepoError> {
        let model = self.find_live(id).await?;
        let now = Utc::now();

        let mut active: post::ActiveModel = model.into();
        active.deleted_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());

        let model = active.update(&self.db).await.map_err(write_err)?;
        Ok(model.into())
    }
}

impl PostgresCommentRepository {
    async fn find_live(&self, id: i32, post_id: i32) -> Result<comment::Model, RepoError> {
        CommentEntity::find()
            .filter(comment::Column::Id.eq(id))
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(query_err)?
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_id(&self, id: i32, post_id: i32) -> Result<Option<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::Id.eq(id))
            .filter(comment::Column::PostId.eq(post_id))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_active(&self, post_id: i32) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::DeletedAt.is_null())
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create(&self, new_comment: NewComment) -> Result<Comment, RepoError> {
        let now = Utc::now();
        let model = comment::ActiveModel {
            post_id: Set(new_comment.post_id),
            author_name: Set(new_comment.author_name),
            email: Set(new_comment.email),
            user_id: Set(new_comment.user_id),
            content: Set(new_comment.content),
            edited: Set(false),
            deleted_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err)?;

        Ok(model.into())
    }

    async fn update(&self, id: i32, post_id: i32, content: String) -> Result<Comment, RepoError> {
        let model = self.find_live(id, post_id).await?;

        let mut active: comment::ActiveModel = model.into();
        active.content = Set(content);
        active.edited = Set(true);
        active.updated_at = Set(Utc::now().into());

        let model = active.update(&self.db).await.map_err(write_err)?;
        Ok(model.into())
    }

    async fn mark_deleted(&self, id: i32, post_id: i32) -> Result<Comment, RepoError> {
        let model = self.find_live(id, post_id).await?;
        let now = Utc::now();

        let mut active: comment::ActiveModel = model.into();
        active.deleted_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());

        let model = active.update(&self.db).await.map_err(write_err)?;
        Ok(model.into())
    }
}
