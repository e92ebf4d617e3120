use axum::{middleware, routing::get, Router};

use crate::config::AppState;
use crate::handlers::analytics_handler::*;
use crate::middleware::auth_middleware::require_auth;

pub fn analytics_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/analytics/user", get(user_analytics_handler))
        .route("/analytics/site", get(site_analytics_handler))
        .route("/analytics/article/{id}", get(article_analytics_handler))
        .route("/dashboard", get(dashboard_handler))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
