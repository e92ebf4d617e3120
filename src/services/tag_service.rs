use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use slug::slugify;
use uuid::Uuid;

use crate::auth::{Action, PolicyEngine, Resource};
use crate::entities::article::{self, ArticleStatus};
use crate::entities::{article_tag, tag};
use crate::models::article_model::{CreateTagRequest, TagDetailResponse, UpdateTagRequest};
use crate::models::auth_model::CurrentUser;
use crate::utils::app_error::{is_unique_violation, AppError, AppResult};
use crate::utils::text_utils::non_blank;

pub const DEFAULT_COLOR: &str = "#007bff";

pub struct TagService;

impl TagService {
    /// Active tags ordered by name, each with its published article count.
    pub async fn list_tags(db: &DatabaseConnection) -> AppResult<Vec<TagDetailResponse>> {
        let tags = tag::Entity::find()
            .filter(tag::Column::IsActive.eq(true))
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await?;
        let ids: Vec<i64> = tags.iter().map(|t| t.id).collect();
        let counts = Self::published_counts(db, &ids).await?;

        Ok(tags
            .into_iter()
            .map(|t| {
                let n = counts.get(&t.id).copied().unwrap_or(0);
                Self::to_response(t, n)
            })
            .collect())
    }

    pub async fn get_tag(db: &DatabaseConnection, public_id: Uuid) -> AppResult<TagDetailResponse> {
        let found = Self::find_by_public_id(db, public_id).await?;
        let n = Self::published_counts(db, &[found.id]).await?.get(&found.id).copied().unwrap_or(0);
        Ok(Self::to_response(found, n))
    }

    pub async fn create_tag(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        payload: CreateTagRequest,
    ) -> AppResult<TagDetailResponse> {
        policy.authorize(actor, Action::Create, &Resource::Tag)?;

        let name = payload.name.trim().to_string();
        let slug = Self::tag_slug(&name)?;
        Self::ensure_unique(db, &name, &slug, None).await?;

        let saved = tag::ActiveModel {
            id: NotSet,
            public_id: Set(Uuid::now_v7()),
            name: Set(name),
            slug: Set(slug),
            description: Set(non_blank(payload.description)),
            color: Set(payload.color.unwrap_or_else(|| DEFAULT_COLOR.to_string())),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(Self::conflict_or)?;

        tracing::info!("Tag '{}' created by {}", saved.name, actor.public_id);
        Ok(Self::to_response(saved, 0))
    }

    pub async fn update_tag(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        public_id: Uuid,
        payload: UpdateTagRequest,
    ) -> AppResult<TagDetailResponse> {
        policy.authorize(actor, Action::Update, &Resource::Tag)?;
        let existing = Self::find_by_public_id(db, public_id).await?;
        let tag_id = existing.id;

        let mut active: tag::ActiveModel = existing.into();
        if let Some(name) = payload.name {
            let name = name.trim().to_string();
            let slug = Self::tag_slug(&name)?;
            Self::ensure_unique(db, &name, &slug, Some(tag_id)).await?;
            active.name = Set(name);
            active.slug = Set(slug);
        }
        if let Some(description) = payload.description {
            active.description = Set(non_blank(Some(description)));
        }
        if let Some(color) = payload.color {
            active.color = Set(color);
        }
        if let Some(is_active) = payload.is_active {
            active.is_active = Set(is_active);
        }

        let updated = active.update(db).await.map_err(Self::conflict_or)?;
        let n = Self::published_counts(db, &[tag_id]).await?.get(&tag_id).copied().unwrap_or(0);
        Ok(Self::to_response(updated, n))
    }

    /// Removes the tag and, through the foreign key, its article links.
    pub async fn delete_tag(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        public_id: Uuid,
    ) -> AppResult<()> {
        policy.authorize(actor, Action::Delete, &Resource::Tag)?;
        let existing = Self::find_by_public_id(db, public_id).await?;
        tag::Entity::delete_by_id(existing.id).exec(db).await?;
        tracing::info!("Tag '{}' deleted by {}", existing.name, actor.public_id);
        Ok(())
    }

    async fn find_by_public_id(db: &DatabaseConnection, public_id: Uuid) -> AppResult<tag::Model> {
        tag::Entity::find()
            .filter(tag::Column::PublicId.eq(public_id))
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("TAG_NOT_FOUND", "Tag not found"))
    }

    fn tag_slug(name: &str) -> AppResult<String> {
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(AppError::validation("INVALID_TAG_NAME", "Tag name must contain letters or digits"));
        }
        Ok(slug.chars().take(50).collect())
    }

    async fn ensure_unique(db: &DatabaseConnection, name: &str, slug: &str, except: Option<i64>) -> AppResult<()> {
        let mut query = tag::Entity::find().filter(
            Condition::any()
                .add(tag::Column::Name.eq(name))
                .add(tag::Column::Slug.eq(slug)),
        );
        if let Some(id) = except {
            query = query.filter(tag::Column::Id.ne(id));
        }
        if query.count(db).await? > 0 {
            return Err(Self::duplicate(name));
        }
        Ok(())
    }

    fn duplicate(name: &str) -> AppError {
        AppError::validation("TAG_EXISTS", format!("Tag '{}' already exists", name))
    }

    fn conflict_or(err: DbErr) -> AppError {
        if is_unique_violation(&err) {
            AppError::validation("TAG_EXISTS", "Tag already exists")
        } else {
            AppError::Database(err)
        }
    }

    async fn published_counts(db: &DatabaseConnection, tag_ids: &[i64]) -> AppResult<HashMap<i64, u64>> {
        if tag_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(i64, i64)> = article_tag::Entity::find()
            .select_only()
            .column(article_tag::Column::TagId)
            .column_as(Expr::col(article_tag::Column::ArticleId).count(), "count")
            .inner_join(article::Entity)
            .filter(article::Column::Status.eq(ArticleStatus::Published))
            .filter(article_tag::Column::TagId.is_in(tag_ids.iter().copied()))
            .group_by(article_tag::Column::TagId)
            .into_tuple()
            .all(db)
            .await?;
        Ok(rows.into_iter().map(|(id, n)| (id, n.max(0) as u64)).collect())
    }

    fn to_response(t: tag::Model, article_count: u64) -> TagDetailResponse {
        TagDetailResponse {
            id: t.public_id,
            name: t.name,
            slug: t.slug,
            description: t.description,
            color: t.color,
            is_active: t.is_active,
            article_count,
            created_at: t.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_slug_is_derived_from_name() {
        assert_eq!(TagService::tag_slug("Rust Tips").unwrap(), "rust-tips");
        assert!(TagService::tag_slug("!!!").is_err());
    }
}
