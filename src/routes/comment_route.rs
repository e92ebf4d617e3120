use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::config::AppState;
use crate::handlers::comment_handler::*;
use crate::middleware::auth_middleware::{optional_auth, require_auth};

pub fn comment_routes(state: AppState) -> Router<AppState> {
    let readable = Router::new()
        .route("/", get(list_comments_handler))
        .route("/{id}", get(get_comment_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), optional_auth));

    let protected = Router::new()
        .route("/", post(create_comment_handler))
        .route("/{id}", put(update_comment_handler).delete(delete_comment_handler))
        .route("/{id}/like", post(like_comment_handler))
        .route("/{id}/unlike", delete(unlike_comment_handler))
        .route("/{id}/toggle_like", post(toggle_comment_like_handler))
        .route("/{id}/report", post(report_comment_handler))
        .route("/{id}/approve", post(approve_comment_handler))
        .route("/{id}/mark_spam", post(mark_spam_handler))
        .route("/{id}/history", get(comment_history_handler))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    readable.merge(protected)
}
