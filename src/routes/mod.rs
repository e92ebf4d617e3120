use axum::http::{header, HeaderValue, Method};
use axum::{middleware, routing::get, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppState;
use crate::handlers::health_check_handler;
use crate::middleware::rate_limiter::rate_limit_middleware;

pub mod admin_route;
pub mod analytics_route;
pub mod article_route;
pub mod auth_route;
pub mod comment_route;
pub mod tag_route;
pub mod user_route;

pub fn create_routes(state: AppState) -> Router<AppState> {
    let api = Router::new()
        .nest("/auth", auth_route::auth_routes(state.clone()))
        .nest("/profile", auth_route::profile_routes(state.clone()))
        .nest("/users", user_route::user_routes())
        .nest("/admin", admin_route::admin_routes(state.clone()))
        .nest("/articles", article_route::article_routes(state.clone()))
        .nest("/public/articles", article_route::public_article_routes(state.clone()))
        .nest("/tags", tag_route::tag_routes(state.clone()))
        .nest("/comments", comment_route::comment_routes(state.clone()))
        .merge(analytics_route::analytics_routes(state.clone()))
        .route("/health", get(health_check_handler))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware));

    Router::new()
        .nest("/api", api)
        .layer(cors_layer(&state.config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// Any origin unless an explicit allow-list is configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    if allowed.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(AllowOrigin::list(allowed))
    }
}
