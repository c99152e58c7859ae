//! Domain entities - the core business objects.

mod comment;
mod post;
mod principal;
mod user;

pub use comment::{Comment, CommentAuthor, CommentDraft, NewComment};
pub use post::{NewPost, Post, PostDraft};
pub use principal::Principal;
pub use user::{NewUser, Role, UnknownRole, User, mask_email};

/// A resource that may be bound to the account allowed to change it.
pub trait Owned {
    /// Id of the owning user, or `None` for resources nobody owns.
    fn owner_id(&self) -> Option<i32>;
}
