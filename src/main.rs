use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tracing_subscriber::EnvFilter;

use tsuzuri::auth::PolicyEngine;
use tsuzuri::config::{AppState, Config};
use tsuzuri::middleware::rate_limiter::RateLimiter;
use tsuzuri::services::auth_service::AuthService;
use tsuzuri::utils::jwt_utils::JwtUtils;
use tsuzuri::{routes, seeders};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tsuzuri=info,tower_http=info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), String> {
    let cfg = Config::init().map_err(|e| format!("Invalid configuration: {}", e))?;
    tracing::info!("Starting Tsuzuri backend");

    // 1. Database
    let db = Database::connect(&cfg.database_url)
        .await
        .map_err(|e| format!("Failed to connect to database: {}", e))?;
    tracing::info!("Database connected");

    if cfg.run_migrations {
        Migrator::up(&db, None)
            .await
            .map_err(|e| format!("Migrations failed: {}", e))?;
        tracing::info!("Migrations applied");
    }

    // 2. Seed data
    if let Err(e) = seeders::run_seeders(&db, &cfg).await {
        tracing::error!("Seeding failed: {}", e);
    }
    match seeders::user_seeder::admin_count(&db).await {
        Ok(0) => tracing::warn!("No admin account exists; set SEED_ADMIN_* to create one"),
        Ok(_) => {}
        Err(e) => tracing::error!("Could not count admin accounts: {}", e),
    }
    match AuthService::purge_expired_tokens(&db).await {
        Ok(n) if n > 0 => tracing::info!("Purged {} expired blacklist entries", n),
        Ok(_) => {}
        Err(e) => tracing::error!("Could not purge token blacklist: {}", e),
    }

    // 3. Authorization
    let policy = PolicyEngine::new()
        .await
        .map_err(|e| format!("Failed to load authorization policy: {}", e))?;

    // 4. App state
    let state = AppState {
        db,
        jwt: JwtUtils::from_config(&cfg),
        policy,
        rate_limiter: Arc::new(RateLimiter::from_config(&cfg)),
        config: Arc::new(cfg),
    };

    // 5. Router
    let app = routes::create_routes(state.clone()).with_state(state.clone());

    // 6. Serve
    let addr_str = format!("{}:{}", state.config.server_host, state.config.server_port);
    let addr: SocketAddr = addr_str
        .parse()
        .map_err(|_| format!("Invalid listen address {}", addr_str))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;

    tracing::info!("Server ready, listening on http://{}", addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| format!("Server error: {}", e))
}
