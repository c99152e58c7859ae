use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Owned, Principal};

/// Comment entity - belongs to exactly one post.
///
/// `user_id` is set for comments written by a signed-in member. Guest
/// comments only carry the free-text `author_name` and have no owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub author_name: String,
    pub email: Option<String>,
    pub user_id: Option<i32>,
    pub content: String,
    pub edited: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> Option<i32> {
        self.user_id
    }
}

/// Who is writing a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentAuthor {
    Member {
        user_id: i32,
        name: String,
        email: String,
    },
    Guest {
        name: String,
    },
}

impl From<&Principal> for CommentAuthor {
    fn from(principal: &Principal) -> Self {
        CommentAuthor::Member {
            user_id: principal.id,
            name: principal.name.clone(),
            email: principal.email.clone(),
        }
    }
}

/// Validated comment submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub author: CommentAuthor,
    pub content: String,
}

/// A comment about to be inserted.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i32,
    pub author_name: String,
    pub email: Option<String>,
    pub user_id: Option<i32>,
    pub content: String,
}

impl NewComment {
    pub fn new(post_id: i32, draft: CommentDraft) -> Self {
        let (author_name, email, user_id) = match draft.author {
            CommentAuthor::Member {
                user_id,
                name,
                email,
            } => (name, Some(email), Some(user_id)),
            CommentAuthor::Guest { name } => (name, None, None),
        };

        Self {
            post_id,
            author_name,
            email,
            user_id,
            content: draft.content,
        }
    }
}
