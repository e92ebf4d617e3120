use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension,
};
use uuid::Uuid;

use crate::config::AppState;
use crate::models::auth_model::{CurrentUser, Viewer};
use crate::models::comment_model::*;
use crate::services::comment_service::CommentService;
use crate::services::engagement_service::EngagementService;
use crate::services::moderation_service::ModerationService;
use crate::utils::api_response::ResponseBuilder;
use crate::utils::client_info::ClientInfo;
use crate::utils::validated_wrapper::{ValidatedJson, ValidatedQuery};

pub async fn list_comments_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    ValidatedQuery(params): ValidatedQuery<CommentFilterParams>,
) -> impl IntoResponse {
    match CommentService::list_comments(&state.db, &state.policy, viewer.user(), params).await {
        Ok(res) => ResponseBuilder::success("COMMENTS_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_comment_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    client: ClientInfo,
    ValidatedJson(payload): ValidatedJson<CreateCommentRequest>,
) -> impl IntoResponse {
    match CommentService::create_comment(&state.db, &state.policy, &user, payload, &client).await {
        Ok(res) => {
            let message = if res.is_approved {
                "Comment posted"
            } else {
                "Comment submitted for moderation"
            };
            ResponseBuilder::created("COMMENT_CREATED", message, res).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn get_comment_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match CommentService::get_comment(&state.db, &state.policy, viewer.user(), id).await {
        Ok(res) => ResponseBuilder::success("COMMENT_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_comment_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCommentRequest>,
) -> impl IntoResponse {
    match CommentService::update_comment(&state.db, &state.policy, &user, id, payload).await {
        Ok(res) => ResponseBuilder::success("COMMENT_UPDATED", "Comment updated", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_comment_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match CommentService::delete_comment(&state.db, &state.policy, &user, id).await {
        Ok(()) => ResponseBuilder::ok("COMMENT_DELETED", "Comment deleted").into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn like_comment_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match EngagementService::like_comment(&state.db, &state.policy, &user, id).await {
        Ok(res) => ResponseBuilder::success("COMMENT_LIKED", "Comment liked", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn unlike_comment_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match EngagementService::unlike_comment(&state.db, &state.policy, &user, id).await {
        Ok(res) => ResponseBuilder::success("COMMENT_UNLIKED", "Comment unliked", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn toggle_comment_like_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match EngagementService::toggle_comment_like(&state.db, &state.policy, &user, id).await {
        Ok(res) => ResponseBuilder::success("COMMENT_LIKE_TOGGLED", "Like toggled", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn report_comment_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ReportCommentRequest>,
) -> impl IntoResponse {
    match ModerationService::report_comment(&state.db, &state.policy, &user, id, payload).await {
        Ok(res) => ResponseBuilder::created("COMMENT_REPORTED", "Report submitted", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn approve_comment_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    payload: Option<ValidatedJson<ModerationRequest>>,
) -> impl IntoResponse {
    let reason = payload.and_then(|ValidatedJson(p)| p.reason);
    match ModerationService::approve_comment(&state.db, &state.policy, &user, id, reason).await {
        Ok(res) => ResponseBuilder::success("COMMENT_APPROVED", "Comment approved", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn mark_spam_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    payload: Option<ValidatedJson<ModerationRequest>>,
) -> impl IntoResponse {
    let reason = payload.and_then(|ValidatedJson(p)| p.reason);
    match ModerationService::mark_spam(&state.db, &state.policy, &user, id, reason).await {
        Ok(res) => ResponseBuilder::success("COMMENT_MARKED_SPAM", "Comment marked as spam", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn comment_history_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match ModerationService::moderation_history(&state.db, &state.policy, &user, id).await {
        Ok(res) => ResponseBuilder::success("MODERATION_HISTORY_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}
