//! # Blog Infrastructure
//!
//! Concrete implementations of the ports defined in `blog-core`:
//! token signing, password hashing, and the user/post/comment stores.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL stores via SeaORM
//!
//! Without `postgres` only the in-memory stores are available.

pub mod auth;
pub mod database;
pub mod memory;

pub use auth::{Argon2PasswordService, JwtConfig, JwtConfigError, JwtTokenService};
pub use database::DatabaseConfig;
pub use memory::{InMemoryCommentRepository, InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
pub use database::{PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository};
