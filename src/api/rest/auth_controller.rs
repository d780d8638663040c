use crate::api::rest::{
    ApiJson, ApiMultipart, ApiResult, AppState, CurrentActor, MessageResponse, MultipartForm,
};
use crate::db::models::account_models::{
    AccountProfile, AuthToken, ChangePasswordRequest, LoginCredentials, ProfileUpdate,
    RefreshRequest, RegisterRequest,
};
use crate::storage::media::PROFILE_PICTURES;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::WithRejection;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub token: AuthToken,
    pub user: AccountProfile,
}

/// Credential exchange and self-service account routes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/token", post(login))
        .route("/api/token/refresh", post(refresh))
        .route("/api/user/register", post(register))
        .route("/api/user/profile", get(profile).patch(update_profile))
        .route("/api/user/change-password", post(change_password))
}

async fn login(
    State(state): State<AppState>,
    WithRejection(Json(credentials), _): ApiJson<LoginCredentials>,
) -> ApiResult<Json<LoginResponse>> {
    let (account, token) = state.auth.login(&credentials).await?;
    Ok(Json(LoginResponse {
        token,
        user: AccountProfile::from(&account),
    }))
}

async fn refresh(
    State(state): State<AppState>,
    WithRejection(Json(request), _): ApiJson<RefreshRequest>,
) -> ApiResult<Json<AuthToken>> {
    let token = state.auth.refresh(&request.refresh_token).await?;
    Ok(Json(token))
}

async fn register(
    State(state): State<AppState>,
    WithRejection(Json(request), _): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AccountProfile>)> {
    let account = state.auth.register(&request).await?;
    Ok((StatusCode::CREATED, Json(AccountProfile::from(&account))))
}

async fn profile(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> ApiResult<Json<AccountProfile>> {
    let account = state.auth.profile(&actor).await?;
    Ok(Json(AccountProfile::from(&account)))
}

/// Multipart so a new profile picture can ride along with the text fields
async fn update_profile(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(multipart, _): ApiMultipart,
) -> ApiResult<Json<AccountProfile>> {
    let form = MultipartForm::read(multipart).await?;
    let picture = form
        .store_file(&state.media, "profile_picture", PROFILE_PICTURES)
        .await?;

    let update = ProfileUpdate {
        first_name: form.text("first_name"),
        last_name: form.text("last_name"),
        phone_number: form.text("phone_number"),
        profile_picture: picture.clone(),
    };

    match state.auth.update_profile(&actor, &update).await {
        Ok(account) => Ok(Json(AccountProfile::from(&account))),
        Err(e) => {
            if let Some(reference) = picture {
                state.media.discard(&reference).await;
            }
            Err(e.into())
        }
    }
}

async fn change_password(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    WithRejection(Json(request), _): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .auth
        .change_password(&actor, &request.current_password, &request.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password changed".to_string(),
    }))
}
