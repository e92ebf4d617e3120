use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension,
};
use uuid::Uuid;

use crate::config::AppState;
use crate::models::auth_model::CurrentUser;
use crate::models::comment_model::{QueueParams, ReportFilterParams};
use crate::models::user_model::{ChangeRoleRequest, UserFilterParams};
use crate::services::moderation_service::ModerationService;
use crate::services::user_service::UserService;
use crate::utils::api_response::ResponseBuilder;
use crate::utils::validated_wrapper::{ValidatedJson, ValidatedQuery};

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedQuery(params): ValidatedQuery<UserFilterParams>,
) -> impl IntoResponse {
    match UserService::admin_list_users(&state.db, &state.policy, &user, params).await {
        Ok(res) => ResponseBuilder::success("USERS_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn toggle_active_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match UserService::toggle_active(&state.db, &state.policy, &user, id).await {
        Ok(res) => ResponseBuilder::success("USER_STATUS_UPDATED", "User status updated", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn change_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ChangeRoleRequest>,
) -> impl IntoResponse {
    match UserService::change_role(&state.db, &state.policy, &user, id, payload).await {
        Ok(res) => ResponseBuilder::success("USER_ROLE_UPDATED", "User role updated", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn pending_comments_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedQuery(params): ValidatedQuery<QueueParams>,
) -> impl IntoResponse {
    match ModerationService::list_pending(&state.db, &state.policy, &user, params.page, params.limit).await {
        Ok(res) => ResponseBuilder::success("PENDING_COMMENTS_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn spam_comments_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedQuery(params): ValidatedQuery<QueueParams>,
) -> impl IntoResponse {
    match ModerationService::list_spam(&state.db, &state.policy, &user, params.page, params.limit).await {
        Ok(res) => ResponseBuilder::success("SPAM_COMMENTS_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn reports_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedQuery(params): ValidatedQuery<ReportFilterParams>,
) -> impl IntoResponse {
    match ModerationService::list_reports(&state.db, &state.policy, &user, params).await {
        Ok(res) => ResponseBuilder::success("REPORTS_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn resolve_report_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match ModerationService::resolve_report(&state.db, &state.policy, &user, id).await {
        Ok(res) => ResponseBuilder::success("REPORT_RESOLVED", "Report resolved", res).into_response(),
        Err(e) => e.into_response(),
    }
}
