use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::config::AppState;
use crate::handlers::tag_handler::*;
use crate::middleware::auth_middleware::require_auth;

pub fn tag_routes(state: AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/", get(list_tags_handler))
        .route("/{id}", get(get_tag_handler));

    let protected = Router::new()
        .route("/", post(create_tag_handler))
        .route("/{id}", put(update_tag_handler).delete(delete_tag_handler))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    open.merge(protected)
}
