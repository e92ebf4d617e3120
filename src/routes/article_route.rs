use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::config::AppState;
use crate::handlers::article_handler::*;
use crate::middleware::auth_middleware::{optional_auth, require_auth};

pub fn article_routes(state: AppState) -> Router<AppState> {
    let readable = Router::new()
        .route("/", get(list_articles_handler))
        .route("/featured", get(featured_articles_handler))
        .route("/pinned", get(pinned_articles_handler))
        .route("/popular", get(popular_articles_handler))
        .route("/recent", get(recent_articles_handler))
        .route("/{id}", get(get_article_handler))
        .route("/{id}/comments", get(article_comments_handler))
        .route("/{id}/share", post(share_article_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), optional_auth));

    let protected = Router::new()
        .route("/", post(create_article_handler))
        .route("/{id}", axum::routing::put(update_article_handler).delete(delete_article_handler))
        .route("/{id}/like", post(like_article_handler))
        .route("/{id}/toggle_featured", post(toggle_featured_handler))
        .route("/{id}/toggle_pinned", post(toggle_pinned_handler))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    readable.merge(protected)
}

pub fn public_article_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(public_articles_handler))
        .route("/{slug}", get(public_article_handler))
        .route_layer(middleware::from_fn_with_state(state, optional_auth))
}
