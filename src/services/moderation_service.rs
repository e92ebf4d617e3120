use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::auth::{Action, PolicyEngine, Resource};
use crate::entities::comment_moderation_log::{self, ModerationAction};
use crate::entities::comment_report::{self, ReportReason};
use crate::entities::comment;
use crate::models::auth_model::CurrentUser;
use crate::models::comment_model::{
    CommentResponse, ModerationLogResponse, ReportCommentRequest, ReportFilterParams, ReportResponse,
};
use crate::repositories::user_repository::UserRepository;
use crate::services::comment_service::CommentService;
use crate::utils::api_response::{page_window, Paginated, PaginationMeta};
use crate::utils::app_error::{is_unique_violation, AppError, AppResult};
use crate::utils::text_utils::non_blank;

pub struct ModerationService;

impl ModerationService {
    /// Marks a comment approved. Approving twice is a no-op; spam stays spam.
    pub async fn approve_comment(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        comment_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<CommentResponse> {
        policy.authorize(actor, Action::Moderate, &Resource::Comments)?;
        let target = CommentService::find_by_public_id(db, comment_id).await?;

        // the spam check lives in the UPDATE itself so a concurrent mark_spam wins
        let txn = db.begin().await?;
        let changed = comment::Entity::update_many()
            .col_expr(comment::Column::IsApproved, Expr::value(true))
            .col_expr(comment::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(comment::Column::Id.eq(target.id))
            .filter(comment::Column::IsSpam.eq(false))
            .filter(comment::Column::IsApproved.eq(false))
            .exec(&txn)
            .await?
            .rows_affected;
        let current = comment::Entity::find_by_id(target.id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("COMMENT_NOT_FOUND", "Comment not found"))?;
        if changed == 0 {
            txn.commit().await?;
            if current.is_spam {
                return Err(AppError::validation("COMMENT_IS_SPAM", "Spam comments cannot be approved"));
            }
            return CommentService::render_one(db, Some(actor), current).await;
        }
        Self::log_action(&txn, &current, actor.id, ModerationAction::Approved, non_blank(reason)).await?;
        txn.commit().await?;

        tracing::info!("Comment {} approved by {}", current.public_id, actor.public_id);
        CommentService::render_one(db, Some(actor), current).await
    }

    /// Flags a comment as spam, which also withdraws approval.
    pub async fn mark_spam(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        comment_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<CommentResponse> {
        policy.authorize(actor, Action::Moderate, &Resource::Comments)?;
        let target = CommentService::find_by_public_id(db, comment_id).await?;
        if target.is_spam && !target.is_approved {
            return CommentService::render_one(db, Some(actor), target).await;
        }

        let txn = db.begin().await?;
        let mut active: comment::ActiveModel = target.into();
        active.is_spam = Set(true);
        active.is_approved = Set(false);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;
        Self::log_action(&txn, &updated, actor.id, ModerationAction::MarkedSpam, non_blank(reason)).await?;
        txn.commit().await?;

        tracing::info!("Comment {} marked as spam by {}", updated.public_id, actor.public_id);
        CommentService::render_one(db, Some(actor), updated).await
    }

    /// Files a report. Each user may report a given comment once.
    pub async fn report_comment(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        comment_id: Uuid,
        payload: ReportCommentRequest,
    ) -> AppResult<ReportResponse> {
        policy.authorize(actor, Action::Report, &Resource::Comments)?;
        let target = CommentService::find_visible(db, policy, Some(actor), comment_id).await?;

        let already = comment_report::Entity::find()
            .filter(comment_report::Column::CommentId.eq(target.id))
            .filter(comment_report::Column::ReporterId.eq(actor.id))
            .count(db)
            .await?;
        if already > 0 {
            return Err(Self::duplicate_report());
        }

        let report = comment_report::ActiveModel {
            id: NotSet,
            public_id: Set(Uuid::now_v7()),
            comment_id: Set(target.id),
            reporter_id: Set(actor.id),
            reason: Set(payload.reason),
            description: Set(non_blank(payload.description)),
            is_resolved: Set(false),
            resolved_by_id: Set(None),
            resolved_at: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Self::duplicate_report()
            } else {
                AppError::from(e)
            }
        })?;

        if payload.reason == ReportReason::Spam {
            tracing::warn!("Comment {} reported as spam by {}", target.public_id, actor.public_id);
        }
        Self::report_response(db, report, target.public_id).await
    }

    pub async fn resolve_report(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        report_id: Uuid,
    ) -> AppResult<ReportResponse> {
        policy.authorize(actor, Action::Moderate, &Resource::Comments)?;
        let report = comment_report::Entity::find()
            .filter(comment_report::Column::PublicId.eq(report_id))
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("REPORT_NOT_FOUND", "Report not found"))?;
        let target = comment::Entity::find_by_id(report.comment_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("COMMENT_NOT_FOUND", "Comment not found"))?;

        let txn = db.begin().await?;
        let changed = comment_report::Entity::update_many()
            .col_expr(comment_report::Column::IsResolved, Expr::value(true))
            .col_expr(comment_report::Column::ResolvedById, Expr::value(actor.id))
            .col_expr(comment_report::Column::ResolvedAt, Expr::value(Utc::now()))
            .filter(comment_report::Column::Id.eq(report.id))
            .filter(comment_report::Column::IsResolved.eq(false))
            .exec(&txn)
            .await?
            .rows_affected;
        if changed == 0 {
            return Err(AppError::validation("REPORT_ALREADY_RESOLVED", "Report is already resolved"));
        }
        let resolved = comment_report::Entity::find_by_id(report.id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("REPORT_NOT_FOUND", "Report not found"))?;
        Self::log_action(&txn, &target, actor.id, ModerationAction::ReportResolved, None).await?;
        txn.commit().await?;

        Self::report_response(db, resolved, target.public_id).await
    }

    pub async fn list_pending(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<Paginated<CommentResponse>> {
        policy.authorize(actor, Action::Moderate, &Resource::Comments)?;
        let query = comment::Entity::find()
            .filter(comment::Column::IsApproved.eq(false))
            .filter(comment::Column::IsSpam.eq(false))
            .order_by_asc(comment::Column::CreatedAt);
        Self::paginate_comments(db, actor, query, page, limit).await
    }

    pub async fn list_spam(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<Paginated<CommentResponse>> {
        policy.authorize(actor, Action::Moderate, &Resource::Comments)?;
        let query = comment::Entity::find()
            .filter(comment::Column::IsSpam.eq(true))
            .order_by_desc(comment::Column::UpdatedAt);
        Self::paginate_comments(db, actor, query, page, limit).await
    }

    pub async fn list_reports(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        params: ReportFilterParams,
    ) -> AppResult<Paginated<ReportResponse>> {
        policy.authorize(actor, Action::Moderate, &Resource::Comments)?;
        let (page, limit) = page_window(params.page, params.limit);

        let mut query = comment_report::Entity::find().find_also_related(comment::Entity);
        if let Some(resolved) = params.is_resolved {
            query = query.filter(comment_report::Column::IsResolved.eq(resolved));
        }
        let paginator = query
            .order_by_desc(comment_report::Column::CreatedAt)
            .paginate(db, limit);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;

        let user_ids: Vec<i64> = rows
            .iter()
            .flat_map(|(r, _)| std::iter::once(r.reporter_id).chain(r.resolved_by_id))
            .collect();
        let users = UserRepository::find_by_ids(db, user_ids).await?;

        let items = rows
            .into_iter()
            .map(|(r, c)| {
                let comment_public_id = c.map(|c| c.public_id).unwrap_or_else(Uuid::nil);
                Self::to_report_response(r, comment_public_id, &users)
            })
            .collect();

        Ok(Paginated {
            items,
            meta: PaginationMeta::new(total, page, limit),
        })
    }

    pub async fn moderation_history(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        comment_id: Uuid,
    ) -> AppResult<Vec<ModerationLogResponse>> {
        policy.authorize(actor, Action::Moderate, &Resource::Comments)?;
        let logs = comment_moderation_log::Entity::find()
            .filter(comment_moderation_log::Column::CommentPublicId.eq(comment_id))
            .order_by_asc(comment_moderation_log::Column::CreatedAt)
            .order_by_asc(comment_moderation_log::Column::Id)
            .all(db)
            .await?;
        let users = UserRepository::find_by_ids(db, logs.iter().map(|l| l.moderator_id).collect()).await?;

        Ok(logs
            .into_iter()
            .map(|l| ModerationLogResponse {
                comment: l.comment_public_id,
                moderator: users
                    .get(&l.moderator_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default(),
                action: l.action,
                reason: l.reason,
                created_at: l.created_at,
            })
            .collect())
    }

    pub async fn log_action<C: ConnectionTrait>(
        conn: &C,
        target: &comment::Model,
        moderator_id: i64,
        action: ModerationAction,
        reason: Option<String>,
    ) -> AppResult<()> {
        comment_moderation_log::ActiveModel {
            id: NotSet,
            comment_id: Set(Some(target.id)),
            comment_public_id: Set(target.public_id),
            moderator_id: Set(moderator_id),
            action: Set(action),
            reason: Set(reason),
            created_at: Set(Utc::now()),
        }
        .insert(conn)
        .await?;
        Ok(())
    }

    async fn paginate_comments(
        db: &DatabaseConnection,
        actor: &CurrentUser,
        query: Select<comment::Entity>,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<Paginated<CommentResponse>> {
        let (page, limit) = page_window(page, limit);
        let paginator = query.order_by_asc(comment::Column::Id).paginate(db, limit);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;
        Ok(Paginated {
            items: CommentService::render_many(db, Some(actor), rows).await?,
            meta: PaginationMeta::new(total, page, limit),
        })
    }

    async fn report_response(
        db: &DatabaseConnection,
        report: comment_report::Model,
        comment_public_id: Uuid,
    ) -> AppResult<ReportResponse> {
        let ids = std::iter::once(report.reporter_id).chain(report.resolved_by_id).collect();
        let users = UserRepository::find_by_ids(db, ids).await?;
        Ok(Self::to_report_response(report, comment_public_id, &users))
    }

    fn to_report_response(
        report: comment_report::Model,
        comment_public_id: Uuid,
        users: &std::collections::HashMap<i64, crate::entities::user::Model>,
    ) -> ReportResponse {
        let username = |id: i64| users.get(&id).map(|u| u.username.clone());
        ReportResponse {
            id: report.public_id,
            comment: comment_public_id,
            reporter: username(report.reporter_id).unwrap_or_default(),
            reason: report.reason,
            description: report.description,
            is_resolved: report.is_resolved,
            resolved_by: report.resolved_by_id.and_then(username),
            resolved_at: report.resolved_at,
            created_at: report.created_at,
        }
    }

    fn duplicate_report() -> AppError {
        AppError::validation("DUPLICATE_REPORT", "You have already reported this comment")
    }
}
