use axum::{extract::State, response::IntoResponse, Extension};

use crate::config::AppState;
use crate::models::auth_model::{
    ChangePasswordRequest, CurrentUser, LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest,
};
use crate::models::user_model::UpdateProfileRequest;
use crate::services::auth_service::AuthService;
use crate::services::user_service::UserService;
use crate::utils::api_response::ResponseBuilder;
use crate::utils::validated_wrapper::ValidatedJson;

pub async fn register_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> impl IntoResponse {
    match AuthService::register(&state.db, &state.jwt, state.config.default_user_role, payload).await {
        Ok(res) => ResponseBuilder::created("AUTH_REGISTER_SUCCESS", "User registered successfully", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn login_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> impl IntoResponse {
    match AuthService::login(&state.db, &state.jwt, payload).await {
        Ok(res) => ResponseBuilder::success("AUTH_LOGIN_SUCCESS", "Login successful", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn refresh_token_handler(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshRequest>,
) -> impl IntoResponse {
    match AuthService::refresh(&state.db, &state.jwt, &payload.refresh_token).await {
        Ok(res) => ResponseBuilder::success("AUTH_REFRESH_SUCCESS", "Token refreshed", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Option<ValidatedJson<LogoutRequest>>,
) -> impl IntoResponse {
    let refresh_token = payload.and_then(|ValidatedJson(p)| p.refresh_token);
    match AuthService::logout(&state.db, &state.jwt, &user, refresh_token.as_deref()).await {
        Ok(()) => ResponseBuilder::ok("AUTH_LOGOUT_SUCCESS", "Logged out successfully").into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> impl IntoResponse {
    match UserService::get_profile(&state.db, &user).await {
        Ok(res) => ResponseBuilder::success("PROFILE_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> impl IntoResponse {
    match UserService::update_profile(&state.db, &user, payload).await {
        Ok(res) => ResponseBuilder::success("PROFILE_UPDATED", "Profile updated", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> impl IntoResponse {
    match AuthService::change_password(&state.db, &user, payload).await {
        Ok(()) => ResponseBuilder::ok("PASSWORD_CHANGED", "Password changed successfully").into_response(),
        Err(e) => e.into_response(),
    }
}
