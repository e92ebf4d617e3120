pub use sea_orm_migration::prelude::*;

mod common;
mod m20260901_000001_create_users_table;
mod m20260901_000002_create_article_tables;
mod m20260901_000003_create_engagement_tables;
mod m20260901_000004_create_comment_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260901_000001_create_users_table::Migration),
            Box::new(m20260901_000002_create_article_tables::Migration),
            Box::new(m20260901_000003_create_engagement_tables::Migration),
            Box::new(m20260901_000004_create_comment_tables::Migration),
        ]
    }
}
