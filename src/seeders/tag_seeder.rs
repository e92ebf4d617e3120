use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use slug::slugify;
use uuid::Uuid;

use crate::entities::tag;

const DEFAULT_TAGS: &[(&str, &str, &str)] = &[
    ("Technology", "News and opinion on technology", "#007bff"),
    ("Programming", "Code, languages and tooling", "#6f42c1"),
    ("Rust", "The Rust programming language", "#dea584"),
    ("Web Development", "Building for the web", "#20c997"),
    ("Lifestyle", "Life outside the editor", "#fd7e14"),
];

pub async fn seed_tags(db: &DatabaseConnection) -> Result<(), String> {
    for (name, description, color) in DEFAULT_TAGS {
        let exists = tag::Entity::find()
            .filter(tag::Column::Name.eq(*name))
            .one(db)
            .await
            .map_err(|e| e.to_string())?;

        if exists.is_none() {
            let new_tag = tag::ActiveModel {
                public_id: Set(Uuid::now_v7()),
                name: Set(name.to_string()),
                slug: Set(slugify(name)),
                description: Set(Some(description.to_string())),
                color: Set(color.to_string()),
                is_active: Set(true),
                created_at: Set(Utc::now()),
                ..Default::default()
            };
            new_tag.insert(db).await.map_err(|e| e.to_string())?;
            tracing::info!("Seeded tag: {}", name);
        }
    }

    Ok(())
}
