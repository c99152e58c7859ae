use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Owned;

/// Post entity - a blog article owned by its author.
///
/// A post with `deleted_at` set is a tombstone: it stays in storage but is
/// hidden from every read path except the deletion lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub author_id: i32,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Compute `published_at` after moving to `published`.
    ///
    /// Publishing stamps the current time, unpublishing clears it, and
    /// leaving the flag alone keeps whatever timestamp was there.
    pub fn published_at_after(&self, published: bool, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match (self.published, published) {
            (false, true) => Some(now),
            (_, false) => None,
            (true, true) => self.published_at,
        }
    }

    /// Apply a validated draft in place.
    pub fn apply(&mut self, draft: PostDraft, now: DateTime<Utc>) {
        self.published_at = self.published_at_after(draft.published, now);
        self.published = draft.published;
        self.title = draft.title;
        self.content = draft.content;
        self.updated_at = now;
    }
}

impl Owned for Post {
    fn owner_id(&self) -> Option<i32> {
        Some(self.author_id)
    }
}

/// Validated input for creating or rewriting a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub published: bool,
}

/// A post about to be inserted.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i32,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewPost {
    pub fn new(author_id: i32, draft: PostDraft, now: DateTime<Utc>) -> Self {
        Self {
            author_id,
            published_at: draft.published.then_some(now),
            published: draft.published,
            title: draft.title,
            content: draft.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn post(published: bool, published_at: Option<DateTime<Utc>>) -> Post {
        let now = Utc::now();
        Post {
            id: 1,
            author_id: 7,
            title: "Hello".to_string(),
            content: "World".to_string(),
            published,
            published_at,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn publishing_stamps_current_time() {
        let now = Utc::now();
        assert_eq!(post(false, None).published_at_after(true, now), Some(now));
    }

    #[test]
    fn unpublishing_clears_timestamp() {
        let then = Utc::now() - TimeDelta::days(3);
        assert_eq!(post(true, Some(then)).published_at_after(false, Utc::now()), None);
    }

    #[test]
    fn republishing_keeps_original_timestamp() {
        let then = Utc::now() - TimeDelta::days(3);
        assert_eq!(
            post(true, Some(then)).published_at_after(true, Utc::now()),
            Some(then)
        );
    }

    #[test]
    fn draft_post_has_no_publish_time() {
        let draft = PostDraft {
            title: "Draft".to_string(),
            content: "Not yet".to_string(),
            published: false,
        };
        let new_post = NewPost::new(3, draft, Utc::now());
        assert!(new_post.published_at.is_none());
    }
}
