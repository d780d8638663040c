use crate::api::rest::{ApiMultipart, ApiPath, ApiQuery, ApiResult, AppState, CurrentActor, MultipartForm};
use crate::db::models::report_models::{IncidentReport, NewReport};
use crate::db::repositories::ListParams;
use crate::storage::media::REPORT_PHOTOS;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use axum_extra::extract::WithRejection;
use uuid::Uuid;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/reports", get(list_reports).post(submit_report))
        .route("/api/reports/:id", get(get_report))
}

async fn list_reports(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(Query(params), _): ApiQuery<ListParams>,
) -> ApiResult<Json<Vec<IncidentReport>>> {
    let reports = state.reports.list(&actor, &params).await?;
    Ok(Json(reports))
}

async fn submit_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(multipart, _): ApiMultipart,
) -> ApiResult<(StatusCode, Json<IncidentReport>)> {
    let form = MultipartForm::read(multipart).await?;
    let photo = form.store_file(&state.media, "photo", REPORT_PHOTOS).await?;

    let payload = NewReport {
        latitude: form.text("latitude").unwrap_or_default(),
        longitude: form.text("longitude").unwrap_or_default(),
        location_note: form.text("location_note"),
        detail: form.text("detail"),
        photo: photo.clone(),
        status: form.text("status"),
        priority: form.text("priority"),
    };

    match state.reports.submit(&actor, &payload).await {
        Ok(report) => Ok((StatusCode::CREATED, Json(report))),
        Err(e) => {
            if let Some(reference) = photo {
                state.media.discard(&reference).await;
            }
            Err(e.into())
        }
    }
}

async fn get_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(Path(id), _): ApiPath<Uuid>,
) -> ApiResult<Json<IncidentReport>> {
    let report = state.reports.get(&actor, &id).await?;
    Ok(Json(report))
}
