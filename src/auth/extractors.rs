use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use crate::{auth::repo_types::User, error::AppError, state::AppState};

/// The signed-in user, if the request carries a valid session cookie.
/// Expired or tampered sessions count as signed out.
pub struct CurrentUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = state.session.token_from(&parts.headers) else {
            return Ok(CurrentUser(None));
        };
        let claims = match state.session.verify(&token) {
            Ok(c) => c,
            Err(e) => {
                debug!(error = %e, "ignoring invalid session");
                return Ok(CurrentUser(None));
            }
        };
        let user = state.users.find_by_id(claims.sub).await?;
        Ok(CurrentUser(user))
    }
}

/// Requires a signed-in user.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await? {
            CurrentUser(Some(user)) => Ok(AuthUser(user)),
            CurrentUser(None) => Err(AppError::Forbidden("sign in required".into())),
        }
    }
}

/// Requires a signed-in admin.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.admin {
            debug!(user_id = user.id, "admin route refused");
            return Err(AppError::Forbidden("admin privileges required".into()));
        }
        Ok(AdminUser(user))
    }
}
