//! # Blog API
//!
//! Actix-web surface over the access pipeline in `blog-core`. The binary in
//! `main.rs` wires configuration and telemetry; everything a test needs to
//! mount the app lives here.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod telemetry;

pub use handlers::configure_routes;
pub use state::AppState;
