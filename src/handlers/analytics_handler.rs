use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension,
};
use uuid::Uuid;

use crate::config::AppState;
use crate::models::auth_model::CurrentUser;
use crate::services::analytics_service::AnalyticsService;
use crate::utils::api_response::ResponseBuilder;

pub async fn user_analytics_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> impl IntoResponse {
    match AnalyticsService::user_analytics(&state.db, &user).await {
        Ok(res) => ResponseBuilder::success("ANALYTICS_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn site_analytics_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> impl IntoResponse {
    match AnalyticsService::site_analytics(&state.db, &state.policy, &user).await {
        Ok(res) => ResponseBuilder::success("ANALYTICS_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn article_analytics_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match AnalyticsService::article_analytics(&state.db, &state.policy, &user, id).await {
        Ok(res) => ResponseBuilder::success("ANALYTICS_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn dashboard_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> impl IntoResponse {
    match AnalyticsService::dashboard(&state.db, &state.policy, &user).await {
        Ok(res) => ResponseBuilder::success("DASHBOARD_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}
