use axum::{routing::get, Router};

use crate::config::AppState;
use crate::handlers::user_handler::*;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users_handler))
        .route("/{username}", get(get_user_handler))
}
