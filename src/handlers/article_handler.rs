use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension,
};
use uuid::Uuid;

use crate::config::AppState;
use crate::models::article_model::*;
use crate::models::auth_model::{CurrentUser, Viewer};
use crate::services::article_service::ArticleService;
use crate::services::comment_service::CommentService;
use crate::services::engagement_service::EngagementService;
use crate::utils::api_response::ResponseBuilder;
use crate::utils::client_info::ClientInfo;
use crate::utils::validated_wrapper::{ValidatedJson, ValidatedQuery};

pub async fn list_articles_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    ValidatedQuery(params): ValidatedQuery<ArticleFilterParams>,
) -> impl IntoResponse {
    match ArticleService::list_articles(&state.db, &state.policy, viewer.user(), params).await {
        Ok(res) => ResponseBuilder::success("ARTICLES_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_article_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
    client: ClientInfo,
) -> impl IntoResponse {
    match ArticleService::retrieve_article(&state.db, &state.policy, viewer.user(), id, &client).await {
        Ok(res) => ResponseBuilder::success("ARTICLE_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_article_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateArticleRequest>,
) -> impl IntoResponse {
    match ArticleService::create_article(&state.db, &state.policy, &user, payload).await {
        Ok(res) => ResponseBuilder::created("ARTICLE_CREATED", "Article created", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_article_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateArticleRequest>,
) -> impl IntoResponse {
    match ArticleService::update_article(&state.db, &state.policy, &user, id, payload).await {
        Ok(res) => ResponseBuilder::success("ARTICLE_UPDATED", "Article updated", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_article_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match ArticleService::delete_article(&state.db, &state.policy, &user, id).await {
        Ok(()) => ResponseBuilder::ok("ARTICLE_DELETED", "Article deleted").into_response(),
        Err(e) => e.into_response(),
    }
}

async fn feed(state: AppState, viewer: Viewer, feed: ArticleFeed) -> axum::response::Response {
    match ArticleService::list_feed(&state.db, viewer.user(), feed).await {
        Ok(res) => ResponseBuilder::success("ARTICLES_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn featured_articles_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> impl IntoResponse {
    feed(state, viewer, ArticleFeed::Featured).await
}

pub async fn pinned_articles_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> impl IntoResponse {
    feed(state, viewer, ArticleFeed::Pinned).await
}

pub async fn popular_articles_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> impl IntoResponse {
    feed(state, viewer, ArticleFeed::Popular).await
}

pub async fn recent_articles_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> impl IntoResponse {
    feed(state, viewer, ArticleFeed::Recent).await
}

pub async fn like_article_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match EngagementService::toggle_article_like(&state.db, &state.policy, &user, id).await {
        Ok(res) => {
            let (code, message) = if res.liked {
                ("ARTICLE_LIKED", "Article liked")
            } else {
                ("ARTICLE_UNLIKED", "Article unliked")
            };
            ResponseBuilder::success(code, message, res).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn share_article_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match EngagementService::share_article(&state.db, &state.policy, viewer.user(), id).await {
        Ok(res) => ResponseBuilder::success("ARTICLE_SHARED", "Share recorded", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn toggle_featured_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match ArticleService::toggle_featured(&state.db, &state.policy, &user, id).await {
        Ok(res) => ResponseBuilder::success("ARTICLE_UPDATED", "Featured flag toggled", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn toggle_pinned_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match ArticleService::toggle_pinned(&state.db, &state.policy, &user, id).await {
        Ok(res) => ResponseBuilder::success("ARTICLE_UPDATED", "Pinned flag toggled", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn article_comments_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match CommentService::list_article_comments(&state.db, &state.policy, viewer.user(), id).await {
        Ok(res) => ResponseBuilder::success("COMMENTS_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn public_articles_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    ValidatedQuery(params): ValidatedQuery<ArticleFilterParams>,
) -> impl IntoResponse {
    match ArticleService::list_published(&state.db, viewer.user(), params).await {
        Ok(res) => ResponseBuilder::success("ARTICLES_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn public_article_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(slug): Path<String>,
    client: ClientInfo,
) -> impl IntoResponse {
    match ArticleService::get_published_by_slug(&state.db, viewer.user(), &slug, &client).await {
        Ok(res) => ResponseBuilder::success("ARTICLE_FETCHED", "Success", res).into_response(),
        Err(e) => e.into_response(),
    }
}
