use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

use crate::config::AppState;
use crate::models::user_model::UserFilterParams;
use crate::services::user_service::UserService;
use crate::utils::api_response::ResponseBuilder;
use crate::utils::validated_wrapper::ValidatedQuery;

pub async fn list_users_handler(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<UserFilterParams>,
) -> impl IntoResponse {
    match UserService::list_public_users(&state.db, params).await {
        Ok(res) => ResponseBuilder::success("USERS_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_user_handler(State(state): State<AppState>, Path(username): Path<String>) -> impl IntoResponse {
    match UserService::get_public_user(&state.db, &username).await {
        Ok(res) => ResponseBuilder::success("USER_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}
