use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::config::AppState;
use crate::handlers::admin_handler::*;
use crate::middleware::auth_middleware::require_auth;

pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users_handler))
        .route("/users/{id}/toggle_active", post(toggle_active_handler))
        .route("/users/{id}/change_role", post(change_role_handler))
        .nest(
            "/comments",
            Router::new()
                .route("/pending", get(pending_comments_handler))
                .route("/spam", get(spam_comments_handler))
                .route("/reports", get(reports_handler)),
        )
        .route("/reports/{id}/resolve", post(resolve_report_handler))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
