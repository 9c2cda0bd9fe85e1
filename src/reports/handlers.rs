use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::{AdminUser, AuthUser},
    error::AppError,
    reports::dto::{
        ApproveReportRequest, CreateReportRequest, EstimateResponse, GetEstimateQuery,
        ReportResponse,
    },
    state::AppState,
};

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(get_estimate).post(create_report))
        .route("/reports/:id", patch(approve_report))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn create_report(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CreateReportRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReportResponse>), AppError> {
    let Json(payload) = payload?;
    let input = payload.validate()?;
    let report = state.reports.create(input, &user).await?;
    Ok((StatusCode::CREATED, Json(report.into())))
}

#[instrument(skip_all, fields(admin_id = admin.id, report_id = tracing::field::Empty))]
pub async fn approve_report(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ApproveReportRequest>, JsonRejection>,
) -> Result<Json<ReportResponse>, AppError> {
    let Path(id) = id?;
    tracing::Span::current().record("report_id", id);
    let Json(payload) = payload?;
    let approved = payload.validate()?;
    let report = state.reports.change_approval(id, approved).await?;
    Ok(Json(report.into()))
}

#[instrument(skip(state, query))]
pub async fn get_estimate(
    State(state): State<AppState>,
    query: Result<Query<GetEstimateQuery>, QueryRejection>,
) -> Result<Json<EstimateResponse>, AppError> {
    let Query(query) = query?;
    let query = query.validate()?;
    let price = state.reports.create_estimate(&query).await?;
    Ok(Json(EstimateResponse { price }))
}
