use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use blog_core::domain::{NewUser, User};
use blog_core::error::RepoError;
use blog_core::ports::UserRepository;

#[derive(Default)]
struct Table {
    rows: BTreeMap<i32, User>,
    last_id: i32,
}

/// In-memory user store with a unique email index.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<Table>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepoError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("Email already registered".to_string()));
        }

        table.last_id += 1;
        let now = Utc::now();
        let user = User {
            id: table.last_id,
            email: user.email,
            name: user.name,
            role: user.role,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn assigns_sequential_ids_and_rejects_duplicate_email() {
        let repo = InMemoryUserRepository::new();
        let first = repo
            .create(NewUser::new("a@example.com".into(), "Ann".into(), "h".into()))
            .await
            .unwrap();
        let second = repo
            .create(NewUser::new("b@example.com".into(), "Ben".into(), "h".into()))
            .await
            .unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        let dup = repo
            .create(NewUser::new("a@example.com".into(), "Al".into(), "h".into()))
            .await;
        assert!(matches!(dup, Err(RepoError::Constraint(_))));

        let found = repo.find_by_email("b@example.com").await.unwrap().unwrap();
        assert_eq!(found.name, "Ben");
    }
}
