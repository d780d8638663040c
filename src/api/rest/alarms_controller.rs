use crate::api::rest::{ApiJson, ApiPath, ApiQuery, ApiResult, AppState, CurrentActor};
use crate::db::models::alarm_models::{EmergencyAlarm, NewAlarm};
use crate::db::repositories::ListParams;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use axum_extra::extract::WithRejection;
use uuid::Uuid;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/alarms", get(list_alarms).post(trigger_alarm))
        .route("/api/alarms/:id", get(get_alarm))
}

async fn list_alarms(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(Query(params), _): ApiQuery<ListParams>,
) -> ApiResult<Json<Vec<EmergencyAlarm>>> {
    let alarms = state.alarms.list(&actor, &params).await?;
    Ok(Json(alarms))
}

async fn trigger_alarm(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(Json(payload), _): ApiJson<NewAlarm>,
) -> ApiResult<(StatusCode, Json<EmergencyAlarm>)> {
    let alarm = state.alarms.trigger(&actor, &payload).await?;
    Ok((StatusCode::CREATED, Json(alarm)))
}

async fn get_alarm(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> ApiResult<Json<EmergencyAlarm>> {
    let alarm = state.alarms.get(&actor, &id).await?;
    Ok(Json(alarm))
}
