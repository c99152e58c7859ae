//! In-memory stores - used when no database is configured, and in tests.
//!
//! Data is lost on process restart. Each store guards its rows with an async
//! `RwLock`, so a read-then-write pair from two requests is last-write-wins,
//! the same as the database-backed stores.

mod comments;
mod posts;
mod users;

pub use comments::InMemoryCommentRepository;
pub use posts::InMemoryPostRepository;
pub use users::InMemoryUserRepository;
