use sea_orm::*;

use crate::config::SeedAdmin;
use crate::entities::user::{self, Role};
use crate::repositories::user_repository::{NewUser, UserRepository};
use crate::services::auth_service::AuthService;

/// Creates the configured admin account once; an existing username or
/// email is left untouched.
pub async fn seed_admin(db: &DatabaseConnection, admin: &SeedAdmin) -> Result<(), String> {
    let email = admin.email.trim().to_lowercase();
    let existing = UserRepository::find_duplicates(db, &admin.username, &email)
        .await
        .map_err(|e| e.to_string())?;
    if !existing.is_empty() {
        return Ok(());
    }

    let password_hash = AuthService::hash_password(&admin.password).map_err(|e| e.to_string())?;
    let created = UserRepository::create(
        db,
        NewUser {
            username: admin.username.clone(),
            email,
            password_hash,
            role: Role::Admin,
            first_name: None,
            last_name: None,
        },
    )
    .await
    .map_err(|e| e.to_string())?;

    tracing::info!("Seeded admin account '{}'", created.username);
    Ok(())
}

/// Number of admin accounts, used to warn when none exists.
pub async fn admin_count(db: &DatabaseConnection) -> Result<u64, String> {
    user::Entity::find()
        .filter(user::Column::Role.eq(Role::Admin))
        .count(db)
        .await
        .map_err(|e| e.to_string())
}
