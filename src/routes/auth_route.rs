use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::config::AppState;
use crate::handlers::auth_handler::*;
use crate::middleware::auth_middleware::require_auth;

pub fn auth_routes(state: AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/refresh", post(refresh_token_handler));

    let protected = Router::new()
        .route("/logout", post(logout_handler))
        .route("/me", get(profile_handler))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    open.merge(protected)
}

pub fn profile_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(profile_handler).put(update_profile_handler))
        .route("/change-password", post(change_password_handler))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
