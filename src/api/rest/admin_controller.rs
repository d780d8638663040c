use crate::api::rest::{ApiJson, ApiPath, ApiQuery, ApiResult, AppState, CurrentActor};
use crate::db::models::account_models::{AccountProfile, ActiveUpdate, NewAccountRequest, RoleUpdate};
use crate::db::models::alarm_models::{AlarmStatusUpdate, EmergencyAlarm};
use crate::db::models::attendance_models::{AttendanceRecord, AttendanceStatusUpdate};
use crate::db::models::report_models::{IncidentReport, ReportReview};
use crate::services::coverage::{DailyCoverage, DashboardSummary};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, patch, post, put};
use axum::Router;
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CoverageParams {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PasswordResetResponse {
    pub password: String,
}

/// Admin-only routes, nested under `/api/admin`
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/attendance/:id", patch(review_attendance))
        .route("/reports/:id", patch(review_report))
        .route("/alarms/:id", patch(review_alarm))
        .route("/officers", get(list_officers))
        .route("/officers/:id", get(get_officer))
        .route("/accounts", post(create_account))
        .route("/accounts/:id/role", put(update_role))
        .route("/accounts/:id/status", put(set_active))
        .route("/accounts/:id/reset-password", post(reset_password))
        .route("/coverage", get(daily_coverage))
        .route("/dashboard", get(dashboard))
}

async fn review_attendance(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(Path(id), _): ApiPath<Uuid>,
    WithRejection(Json(update), _): ApiJson<AttendanceStatusUpdate>,
) -> ApiResult<Json<AttendanceRecord>> {
    let record = state.attendance.set_status(&actor, &id, &update.status).await?;
    Ok(Json(record))
}

async fn review_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(Path(id), _): ApiPath<Uuid>,
    WithRejection(Json(review), _): ApiJson<ReportReview>,
) -> ApiResult<Json<IncidentReport>> {
    let report = state
        .reports
        .set_status(&actor, &id, &review.status, review.priority.as_deref())
        .await?;
    Ok(Json(report))
}

async fn review_alarm(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(Path(id), _): ApiPath<Uuid>,
    WithRejection(Json(update), _): ApiJson<AlarmStatusUpdate>,
) -> ApiResult<Json<EmergencyAlarm>> {
    let alarm = state.alarms.set_status(&actor, &id, &update.status).await?;
    Ok(Json(alarm))
}

async fn list_officers(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<Vec<AccountProfile>>> {
    let officers = state.auth.list_officers(&actor).await?;
    Ok(Json(officers.iter().map(AccountProfile::from).collect()))
}

async fn get_officer(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> ApiResult<Json<AccountProfile>> {
    let officer = state.auth.get_officer(&actor, &id).await?;
    Ok(Json(AccountProfile::from(&officer)))
}

async fn create_account(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(Json(request), _): ApiJson<NewAccountRequest>,
) -> ApiResult<(StatusCode, Json<AccountProfile>)> {
    let account = state.auth.create_account(&actor, &request).await?;
    Ok((StatusCode::CREATED, Json(AccountProfile::from(&account))))
}

async fn update_role(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(Path(id), _): ApiPath<Uuid>,
    WithRejection(Json(update), _): ApiJson<RoleUpdate>,
) -> ApiResult<Json<AccountProfile>> {
    let account = state.auth.update_role(&actor, &id, &update.role).await?;
    Ok(Json(AccountProfile::from(&account)))
}

async fn set_active(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(Path(id), _): ApiPath<Uuid>,
    WithRejection(Json(update), _): ApiJson<ActiveUpdate>,
) -> ApiResult<Json<AccountProfile>> {
    let account = state.auth.set_active(&actor, &id, update.active).await?;
    Ok(Json(AccountProfile::from(&account)))
}

async fn reset_password(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> ApiResult<Json<PasswordResetResponse>> {
    let password = state.auth.reset_password(&actor, &id).await?;
    Ok(Json(PasswordResetResponse { password }))
}

async fn daily_coverage(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(Query(params), _): ApiQuery<CoverageParams>,
) -> ApiResult<Json<DailyCoverage>> {
    let coverage = state
        .coverage
        .daily_coverage(&actor, params.date.as_deref())
        .await?;
    Ok(Json(coverage))
}

async fn dashboard(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<DashboardSummary>> {
    let summary = state.coverage.dashboard_summary(&actor).await?;
    Ok(Json(summary))
}
