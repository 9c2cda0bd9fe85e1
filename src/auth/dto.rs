use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    auth::repo_types::User,
    validation::{ValidationErrors, Validator},
};

/// Request body for signup and signin.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsRequest {
    pub email: Option<Value>,
    pub password: Option<Value>,
}

/// Validated credentials, email normalized to lower case.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let mut v = Validator::default();
        let email = v.email("email", self.email.as_ref());
        let password = match self.password.as_ref() {
            // passwords are taken verbatim, whitespace included
            Some(Value::String(p)) if !p.is_empty() => Some(p.clone()),
            other => v.string("password", other),
        };
        match (email, password) {
            (Some(email), Some(password)) => Ok(Credentials { email, password }),
            _ => Err(v.into_errors()),
        }
    }
}

/// Query for `GET /auth?email=`.
#[derive(Debug, Deserialize)]
pub struct FindUsersQuery {
    pub email: Option<String>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize, PartialEq)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn credentials_are_normalized() {
        let req = CredentialsRequest {
            email: Some(json!(" ASDF@asdf.com ")),
            password: Some(json!(" pass word ")),
        };
        assert_eq!(
            req.validate().unwrap(),
            Credentials {
                email: "asdf@asdf.com".into(),
                password: " pass word ".into(),
            }
        );
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let errors = CredentialsRequest::default().validate().unwrap_err();
        assert!(errors.has("email"));
        assert!(errors.has("password"));
    }

    #[test]
    fn public_user_hides_password() {
        let user = User {
            id: 3,
            email: "test@example.com".into(),
            password: "aa.bb".into(),
            admin: true,
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(!json.contains("aa.bb"));
        assert!(!json.contains("admin"));
    }
}
