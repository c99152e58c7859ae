#![allow(dead_code)]

use chrono::Utc;

use blog_api::AppState;
use blog_core::domain::{
    Comment, CommentAuthor, CommentDraft, NewComment, NewPost, NewUser, Post, PostDraft,
    Principal, Role, User,
};
use blog_infra::JwtConfig;

/// Mount the full route table over `$state`.
macro_rules! app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state.clone()))
                .configure(blog_api::configure_routes),
        )
        .await
    };
}

pub struct Fixture {
    pub state: AppState,
    pub admin: User,
    pub alice: User,
    pub bob: User,
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".to_string(),
        ..JwtConfig::default()
    }
}

pub async fn fixture() -> Fixture {
    let state = AppState::in_memory(jwt_config());
    let admin = user(&state, "admin@example.com", "Admin", Role::Admin).await;
    let alice = user(&state, "alice@example.com", "Alice", Role::User).await;
    let bob = user(&state, "bob@example.com", "Bob", Role::User).await;

    Fixture {
        state,
        admin,
        alice,
        bob,
    }
}

async fn user(state: &AppState, email: &str, name: &str, role: Role) -> User {
    let mut new_user = NewUser::new(email.to_string(), name.to_string(), "unused".to_string());
    new_user.role = role;
    state.users.create(new_user).await.unwrap()
}

/// `Authorization` header value for `user`.
pub fn bearer(state: &AppState, user: &User) -> String {
    let token = state.tokens.issue(&Principal::from(user)).unwrap();
    format!("Bearer {token}")
}

pub async fn seed_post(state: &AppState, author: &User) -> Post {
    let draft = PostDraft {
        title: "Hello world".to_string(),
        content: "First post".to_string(),
        published: true,
    };
    state
        .posts
        .create(NewPost::new(author.id, draft, Utc::now()))
        .await
        .unwrap()
}

pub async fn seed_comment(state: &AppState, post: &Post, author: Option<&User>) -> Comment {
    let author = match author {
        Some(user) => CommentAuthor::from(&Principal::from(user)),
        None => CommentAuthor::Guest {
            name: "Guest".to_string(),
        },
    };
    let draft = CommentDraft {
        author,
        content: "Nice post".to_string(),
    };
    state
        .comments
        .create(NewComment::new(post.id, draft))
        .await
        .unwrap()
}
