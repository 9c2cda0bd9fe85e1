use std::{collections::HashSet, sync::Arc};

use tracing::{info, warn};

use crate::{
    auth::{
        password::{hash_password, verify_password},
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    error::AppError,
};

/// Signup and signin over a user store. Session handling lives in the HTTP layer.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    admin_emails: Arc<HashSet<String>>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, admin_emails: impl IntoIterator<Item = String>) -> Self {
        Self {
            users,
            admin_emails: Arc::new(admin_emails.into_iter().collect()),
        }
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<User, AppError> {
        if self.users.find_by_email(email).await?.is_some() {
            warn!(email, "email already registered");
            return Err(AppError::Conflict("email in use".into()));
        }

        let password = hash_password(password)?;
        let user = self
            .users
            .create(NewUser {
                email: email.to_string(),
                password,
                admin: self.admin_emails.contains(email),
            })
            .await?;

        info!(user_id = user.id, email = %user.email, admin = user.admin, "user registered");
        Ok(user)
    }

    pub async fn signin(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".into()))?;

        if !verify_password(password, &user.password)? {
            warn!(user_id = user.id, "signin with bad password");
            return Err(AppError::Authentication("bad password".into()));
        }

        info!(user_id = user.id, "user signed in");
        Ok(user)
    }

    pub async fn find_user(&self, id: i64) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    pub async fn find_users_by_email(&self, email: &str) -> Result<Vec<User>, AppError> {
        Ok(self.users.find_by_email(email).await?.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::MemoryUserStore;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryUserStore::default()),
            vec!["boss@example.com".to_string()],
        )
    }

    #[tokio::test]
    async fn signup_salts_and_hashes_password() {
        let user = service().signup("asdf@asdf.com", "asdf").await.unwrap();
        assert_ne!(user.password, "asdf");
        let (salt, hash) = user.password.split_once('.').expect("salt separator");
        assert!(!salt.is_empty());
        assert!(!hash.is_empty());
        assert!(!user.admin);
    }

    #[tokio::test]
    async fn signup_rejects_email_in_use() {
        let service = service();
        service.signup("asdf@asdf.com", "asdf").await.unwrap();
        let err = service.signup("asdf@asdf.com", "asdf").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn signup_grants_admin_to_configured_emails() {
        let user = service().signup("boss@example.com", "pw").await.unwrap();
        assert!(user.admin);
    }

    #[tokio::test]
    async fn signin_with_unused_email_is_not_found() {
        let err = service()
            .signin("asdflkj@asdlfkj.com", "passdflkj")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn signin_with_wrong_password_fails() {
        let service = service();
        service.signup("laskdjf@alskdfj.com", "password").await.unwrap();
        let err = service
            .signin("laskdjf@alskdfj.com", "laksdlfkj")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn signin_returns_user_for_correct_password() {
        let service = service();
        let created = service.signup("asdf@gmail.com", "mypassword").await.unwrap();
        let user = service.signin("asdf@gmail.com", "mypassword").await.unwrap();
        assert_eq!(user, created);
    }

    #[tokio::test]
    async fn lookups_by_id_and_email() {
        let service = service();
        let created = service.signup("a@b.co", "pw").await.unwrap();
        assert_eq!(service.find_user(created.id).await.unwrap(), created);
        assert!(matches!(
            service.find_user(999).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert_eq!(service.find_users_by_email("a@b.co").await.unwrap().len(), 1);
        assert!(service.find_users_by_email("x@y.co").await.unwrap().is_empty());
    }
}
