//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::AccessPipeline;
use blog_core::ports::{
    CommentRepository, PasswordService, PostRepository, TokenService, UserRepository,
};
use blog_infra::{
    Argon2PasswordService, InMemoryCommentRepository, InMemoryPostRepository,
    InMemoryUserRepository, JwtConfig, JwtTokenService,
};

use crate::config::AppConfig;

/// Shared application state.
///
/// The pipeline holds its own handles to the same stores the handlers use
/// for the final read or write.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: AccessPipeline,
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
}

struct Stores {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl Stores {
    fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            comments: Arc::new(InMemoryCommentRepository::new()),
        }
    }

    #[cfg(feature = "postgres")]
    async fn connect(config: &AppConfig) -> Self {
        use blog_infra::database::connect;
        use blog_infra::{
            PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository,
        };

        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Self::in_memory();
        };

        match connect(db_config).await {
            Ok(conn) => Self {
                users: Arc::new(PostgresUserRepository::new(conn.clone())),
                posts: Arc::new(PostgresPostRepository::new(conn.clone())),
                comments: Arc::new(PostgresCommentRepository::new(conn)),
            },
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                Self::in_memory()
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn connect(_config: &AppConfig) -> Self {
        tracing::info!("Running without postgres feature - using in-memory stores");
        Self::in_memory()
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let state = Self::assemble(
            Stores::connect(config).await,
            JwtTokenService::new(config.jwt.clone()),
            Argon2PasswordService::new(),
        );
        tracing::info!("Application state initialized");
        state
    }

    /// State over fresh in-memory stores.
    pub fn in_memory(jwt: JwtConfig) -> Self {
        Self::assemble(
            Stores::in_memory(),
            JwtTokenService::new(jwt),
            Argon2PasswordService::new(),
        )
    }

    fn assemble(
        stores: Stores,
        tokens: impl TokenService + 'static,
        passwords: impl PasswordService + 'static,
    ) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(tokens);
        let pipeline = AccessPipeline::from_ports(
            tokens.clone(),
            stores.users.clone(),
            stores.posts.clone(),
            stores.comments.clone(),
        );

        Self {
            pipeline,
            users: stores.users,
            posts: stores.posts,
            comments: stores.comments,
            tokens,
            passwords: Arc::new(passwords),
        }
    }
}
