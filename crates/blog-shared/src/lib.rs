//! # Blog Shared
//!
//! Wire types exchanged with API clients: request bodies, response bodies,
//! and the success/error envelopes.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, FieldViolation};
