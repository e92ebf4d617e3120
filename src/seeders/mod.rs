pub mod tag_seeder;
pub mod user_seeder;

use sea_orm::DatabaseConnection;

use crate::config::Config;

pub async fn run_seeders(db: &DatabaseConnection, cfg: &Config) -> Result<(), String> {
    if let Some(admin) = &cfg.seed_admin {
        user_seeder::seed_admin(db, admin).await?;
    }
    tag_seeder::seed_tags(db).await?;
    Ok(())
}
