//! # Blog Core
//!
//! The domain layer of the blog platform: entities, ports, and the
//! access-control pipeline that authenticates callers, resolves posts and
//! comments, and authorizes changes to them.
//! This crate performs no I/O of its own; stores and the token codec are
//! reached through the traits in [`ports`].

pub mod auth;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod policy;
pub mod ports;
pub mod resolver;
pub mod validation;

pub use error::{DomainError, FieldError, RepoError};
pub use pipeline::{AccessPipeline, Admitted, Chain, Resolved};
