use std::collections::HashSet;

use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;
use uuid::Uuid;

use crate::auth::{Action, PolicyEngine, Resource};
use crate::entities::{article, article_like, article_view, comment, comment_like};
use crate::models::article_model::{LikeToggleResponse, ShareResponse};
use crate::models::auth_model::CurrentUser;
use crate::models::comment_model::CommentLikeResponse;
use crate::services::article_service::ArticleService;
use crate::services::comment_service::CommentService;
use crate::utils::app_error::{is_unique_violation, AppError, AppResult};
use crate::utils::client_info::ClientInfo;

/// Likes, views and shares. Every counter change happens in the same
/// transaction as the row that justifies it, using a relative UPDATE so
/// concurrent requests never lose increments.
pub struct EngagementService;

impl EngagementService {
    /// Records a view unless one already exists for this (article, user, ip).
    /// The unique visitor index decides; the counter moves only when a row
    /// was actually inserted. Returns whether the view was counted.
    pub async fn record_view<C: ConnectionTrait>(
        conn: &C,
        article_id: i64,
        viewer_id: Option<i64>,
        client: &ClientInfo,
    ) -> AppResult<bool> {
        let view = article_view::ActiveModel {
            id: NotSet,
            article_id: Set(article_id),
            user_id: Set(viewer_id),
            ip_address: Set(client.ip.clone()),
            visitor_key: Set(article_view::visitor_key(viewer_id, &client.ip)),
            user_agent: Set(client.user_agent.clone()),
            created_at: Set(Utc::now()),
        };
        let inserted = article_view::Entity::insert(view)
            .on_conflict(
                OnConflict::columns([article_view::Column::ArticleId, article_view::Column::VisitorKey])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        if inserted == 0 {
            return Ok(false);
        }

        Self::bump(conn, article_id, article::Column::ViewCount, 1).await?;
        Ok(true)
    }

    pub async fn toggle_article_like(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        article_id: Uuid,
    ) -> AppResult<LikeToggleResponse> {
        policy.authorize(actor, Action::Like, &Resource::Articles)?;
        let target = ArticleService::find_visible(db, policy, Some(actor), article_id).await?;

        let txn = db.begin().await?;
        let removed = article_like::Entity::delete_many()
            .filter(article_like::Column::ArticleId.eq(target.id))
            .filter(article_like::Column::UserId.eq(actor.id))
            .exec(&txn)
            .await?
            .rows_affected;

        let liked = if removed > 0 {
            Self::bump(&txn, target.id, article::Column::LikeCount, -1).await?;
            false
        } else {
            let like = article_like::ActiveModel {
                id: NotSet,
                article_id: Set(target.id),
                user_id: Set(actor.id),
                created_at: Set(Utc::now()),
            };
            like.insert(&txn).await.map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("LIKE_CONFLICT", "Like is already being processed".to_string())
                } else {
                    AppError::from(e)
                }
            })?;
            Self::bump(&txn, target.id, article::Column::LikeCount, 1).await?;
            true
        };

        let like_count = Self::counter(&txn, target.id, article::Column::LikeCount).await?;
        txn.commit().await?;

        tracing::debug!("User {} liked={} article {}", actor.public_id, liked, target.public_id);
        Ok(LikeToggleResponse { liked, like_count })
    }

    pub async fn share_article(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        viewer: Option<&CurrentUser>,
        article_id: Uuid,
    ) -> AppResult<ShareResponse> {
        let target = ArticleService::find_visible(db, policy, viewer, article_id).await?;
        if !target.is_published() {
            return Err(AppError::validation("ARTICLE_NOT_PUBLISHED", "Only published articles can be shared"));
        }

        let txn = db.begin().await?;
        Self::bump(&txn, target.id, article::Column::ShareCount, 1).await?;
        let share_count = Self::counter(&txn, target.id, article::Column::ShareCount).await?;
        txn.commit().await?;
        Ok(ShareResponse { share_count })
    }

    pub async fn liked_article_ids<C: ConnectionTrait>(
        conn: &C,
        viewer: Option<&CurrentUser>,
        article_ids: &[i64],
    ) -> AppResult<HashSet<i64>> {
        let Some(user) = viewer else {
            return Ok(HashSet::new());
        };
        if article_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<i64> = article_like::Entity::find()
            .select_only()
            .column(article_like::Column::ArticleId)
            .filter(article_like::Column::UserId.eq(user.id))
            .filter(article_like::Column::ArticleId.is_in(article_ids.iter().copied()))
            .into_tuple()
            .all(conn)
            .await?;
        Ok(ids.into_iter().collect())
    }

    pub async fn toggle_comment_like(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        comment_id: Uuid,
    ) -> AppResult<CommentLikeResponse> {
        policy.authorize(actor, Action::Like, &Resource::Comments)?;
        let target = CommentService::find_visible(db, policy, Some(actor), comment_id).await?;

        let txn = db.begin().await?;
        let removed = comment_like::Entity::delete_many()
            .filter(comment_like::Column::CommentId.eq(target.id))
            .filter(comment_like::Column::UserId.eq(actor.id))
            .exec(&txn)
            .await?
            .rows_affected;

        let liked = if removed > 0 {
            Self::bump_comment(&txn, target.id, -1).await?;
            false
        } else {
            let like = comment_like::ActiveModel {
                id: NotSet,
                comment_id: Set(target.id),
                user_id: Set(actor.id),
                created_at: Set(Utc::now()),
            };
            like.insert(&txn).await.map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("LIKE_CONFLICT", "Like is already being processed".to_string())
                } else {
                    AppError::from(e)
                }
            })?;
            Self::bump_comment(&txn, target.id, 1).await?;
            true
        };

        let like_count = Self::comment_counter(&txn, target.id).await?;
        txn.commit().await?;
        Ok(CommentLikeResponse { liked, like_count })
    }

    /// Strict like: fails when the user already likes the comment.
    pub async fn like_comment(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        comment_id: Uuid,
    ) -> AppResult<CommentLikeResponse> {
        policy.authorize(actor, Action::Like, &Resource::Comments)?;
        let target = CommentService::find_visible(db, policy, Some(actor), comment_id).await?;
        Self::add_comment_like(db, &target, actor).await
    }

    /// Strict unlike: fails when there is no like to remove.
    pub async fn unlike_comment(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        comment_id: Uuid,
    ) -> AppResult<CommentLikeResponse> {
        policy.authorize(actor, Action::Like, &Resource::Comments)?;
        let target = CommentService::find_visible(db, policy, Some(actor), comment_id).await?;
        Self::remove_comment_like(db, &target, actor).await
    }

    pub async fn liked_comment_ids<C: ConnectionTrait>(
        conn: &C,
        viewer: Option<&CurrentUser>,
        comment_ids: &[i64],
    ) -> AppResult<HashSet<i64>> {
        let Some(user) = viewer else {
            return Ok(HashSet::new());
        };
        if comment_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<i64> = comment_like::Entity::find()
            .select_only()
            .column(comment_like::Column::CommentId)
            .filter(comment_like::Column::UserId.eq(user.id))
            .filter(comment_like::Column::CommentId.is_in(comment_ids.iter().copied()))
            .into_tuple()
            .all(conn)
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn add_comment_like(
        db: &DatabaseConnection,
        target: &comment::Model,
        actor: &CurrentUser,
    ) -> AppResult<CommentLikeResponse> {
        let txn = db.begin().await?;
        let like = comment_like::ActiveModel {
            id: NotSet,
            comment_id: Set(target.id),
            user_id: Set(actor.id),
            created_at: Set(Utc::now()),
        };
        like.insert(&txn).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::validation("ALREADY_LIKED", "You have already liked this comment")
            } else {
                AppError::from(e)
            }
        })?;
        Self::bump_comment(&txn, target.id, 1).await?;
        let like_count = Self::comment_counter(&txn, target.id).await?;
        txn.commit().await?;
        Ok(CommentLikeResponse { liked: true, like_count })
    }

    async fn remove_comment_like(
        db: &DatabaseConnection,
        target: &comment::Model,
        actor: &CurrentUser,
    ) -> AppResult<CommentLikeResponse> {
        let txn = db.begin().await?;
        let removed = comment_like::Entity::delete_many()
            .filter(comment_like::Column::CommentId.eq(target.id))
            .filter(comment_like::Column::UserId.eq(actor.id))
            .exec(&txn)
            .await?
            .rows_affected;
        if removed == 0 {
            return Err(AppError::validation("NOT_LIKED", "You have not liked this comment"));
        }
        Self::bump_comment(&txn, target.id, -1).await?;
        let like_count = Self::comment_counter(&txn, target.id).await?;
        txn.commit().await?;
        Ok(CommentLikeResponse { liked: false, like_count })
    }

    /// Relative counter update; decrements never go below zero.
    async fn bump<C: ConnectionTrait>(conn: &C, article_id: i64, col: article::Column, delta: i32) -> AppResult<()> {
        let mut update = article::Entity::update_many()
            .col_expr(col, Expr::col(col).add(delta))
            .filter(article::Column::Id.eq(article_id));
        if delta < 0 {
            update = update.filter(col.gte(-delta));
        }
        update.exec(conn).await?;
        Ok(())
    }

    async fn counter<C: ConnectionTrait>(conn: &C, article_id: i64, col: article::Column) -> AppResult<i32> {
        let value: Option<i32> = article::Entity::find_by_id(article_id)
            .select_only()
            .column(col)
            .into_tuple()
            .one(conn)
            .await?;
        value.ok_or_else(|| AppError::not_found("ARTICLE_NOT_FOUND", "Article not found"))
    }

    async fn bump_comment<C: ConnectionTrait>(conn: &C, comment_id: i64, delta: i32) -> AppResult<()> {
        let mut update = comment::Entity::update_many()
            .col_expr(comment::Column::LikeCount, Expr::col(comment::Column::LikeCount).add(delta))
            .filter(comment::Column::Id.eq(comment_id));
        if delta < 0 {
            update = update.filter(comment::Column::LikeCount.gte(-delta));
        }
        update.exec(conn).await?;
        Ok(())
    }

    async fn comment_counter<C: ConnectionTrait>(conn: &C, comment_id: i64) -> AppResult<i32> {
        let value: Option<i32> = comment::Entity::find_by_id(comment_id)
            .select_only()
            .column(comment::Column::LikeCount)
            .into_tuple()
            .one(conn)
            .await?;
        value.ok_or_else(|| AppError::not_found("COMMENT_NOT_FOUND", "Comment not found"))
    }
}
