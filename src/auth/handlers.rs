use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{CredentialsRequest, FindUsersQuery, PublicUser},
        extractors::AuthUser,
    },
    error::AppError,
    state::AppState,
    validation::Validator,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/signout", post(signout))
        .route("/auth/whoami", get(whoami))
        .route("/auth", get(find_users))
        .route("/auth/:id", get(find_user))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let creds = payload.validate()?;

    let user = state.auth.signup(&creds.email, &creds.password).await?;
    let cookie = state.session.session_cookie(user.id)?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(PublicUser::from(user)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let creds = payload.validate()?;

    let user = state.auth.signin(&creds.email, &creds.password).await?;
    let cookie = state.session.session_cookie(user.id)?;

    Ok(([(header::SET_COOKIE, cookie)], Json(PublicUser::from(user))))
}

#[instrument(skip(state))]
pub async fn signout(State(state): State<AppState>) -> impl IntoResponse {
    info!("session cleared");
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, state.session.clear_cookie())],
    )
}

#[instrument(skip_all)]
pub async fn whoami(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(PublicUser::from(user))
}

#[instrument(skip(state))]
pub async fn find_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<PublicUser>, AppError> {
    let Path(id) = id?;
    let user = state.auth.find_user(id).await?;
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, query))]
pub async fn find_users(
    State(state): State<AppState>,
    Query(query): Query<FindUsersQuery>,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    let mut v = Validator::default();
    let Some(email) = v.query_string("email", query.email.as_deref()) else {
        return Err(v.into_errors().into());
    };
    let users = state
        .auth
        .find_users_by_email(&email.to_lowercase())
        .await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}
