use crate::api::rest::{ApiMultipart, ApiPath, ApiQuery, ApiResult, AppState, CurrentActor, MultipartForm};
use crate::db::models::attendance_models::{AttendanceRecord, NewAttendance};
use crate::db::repositories::ListParams;
use crate::storage::media::ATTENDANCE_PHOTOS;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use axum_extra::extract::WithRejection;
use uuid::Uuid;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/attendance", get(list_attendance).post(submit_attendance))
        .route("/api/attendance/:id", get(get_attendance))
}

async fn list_attendance(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(Query(params), _): ApiQuery<ListParams>,
) -> ApiResult<Json<Vec<AttendanceRecord>>> {
    let records = state.attendance.list(&actor, &params).await?;
    Ok(Json(records))
}

/// Check in with coordinates and a selfie
async fn submit_attendance(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(multipart, _): ApiMultipart,
) -> ApiResult<(StatusCode, Json<AttendanceRecord>)> {
    let form = MultipartForm::read(multipart).await?;
    let selfie = form
        .store_file(&state.media, "selfie_photo", ATTENDANCE_PHOTOS)
        .await?;

    let payload = NewAttendance {
        latitude: form.text("latitude").unwrap_or_default(),
        longitude: form.text("longitude").unwrap_or_default(),
        location_note: form.text("location_note"),
        note: form.text("note"),
        selfie_photo: selfie.clone(),
    };

    match state.attendance.submit(&actor, &payload).await {
        Ok(record) => Ok((StatusCode::CREATED, Json(record))),
        Err(e) => {
            if let Some(reference) = selfie {
                state.media.discard(&reference).await;
            }
            Err(e.into())
        }
    }
}

async fn get_attendance(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> ApiResult<Json<AttendanceRecord>> {
    let record = state.attendance.get(&actor, &id).await?;
    Ok(Json(record))
}
