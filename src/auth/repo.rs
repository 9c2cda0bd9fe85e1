use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::auth::repo_types::{NewUser, User};
use crate::error::StoreError;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Fails with `StoreError::UniqueViolation` when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password, admin
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password, admin
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password, admin)
            VALUES ($1, $2, $3)
            RETURNING id, email, password, admin
            "#,
        )
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.admin)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }
}

/// Process-local user store, used when no database is configured.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation);
        }
        let created = User {
            id: users.len() as i64 + 1,
            email: user.email,
            password: user.password,
            admin: user.admin,
        };
        users.push(created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.into(),
            password: "aa.bb".into(),
            admin: false,
        }
    }

    #[tokio::test]
    async fn memory_store_assigns_sequential_ids() {
        let store = MemoryUserStore::default();
        let a = store.create(new_user("a@example.com")).await.unwrap();
        let b = store.create(new_user("b@example.com")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(store.find_by_id(2).await.unwrap(), Some(b));
        assert_eq!(store.find_by_email("a@example.com").await.unwrap(), Some(a));
    }

    #[tokio::test]
    async fn memory_store_enforces_unique_email() {
        let store = MemoryUserStore::default();
        store.create(new_user("a@example.com")).await.unwrap();
        let err = store.create(new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation));
    }
}
