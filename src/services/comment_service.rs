use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::auth::{Action, PolicyEngine, Resource};
use crate::entities::comment::{self, MAX_DEPTH};
use crate::entities::comment_moderation_log::ModerationAction;
use crate::entities::{article, user};
use crate::models::auth_model::CurrentUser;
use crate::models::comment_model::{
    CommentAuthor, CommentFilterParams, CommentOrdering, CommentResponse, CreateCommentRequest,
    UpdateCommentRequest,
};
use crate::models::user_model::full_name;
use crate::repositories::user_repository::UserRepository;
use crate::services::article_service::ArticleService;
use crate::services::engagement_service::EngagementService;
use crate::services::moderation_service::ModerationService;
use crate::utils::api_response::{page_window, Paginated, PaginationMeta};
use crate::utils::app_error::{AppError, AppResult};
use crate::utils::client_info::ClientInfo;

/// Depth for a reply to `parent`, or an error once the thread is too deep.
pub fn reply_depth(parent: &comment::Model) -> AppResult<i32> {
    if parent.depth >= MAX_DEPTH {
        return Err(AppError::validation(
            "COMMENT_DEPTH_EXCEEDED",
            format!("Replies are limited to {} levels", MAX_DEPTH),
        ));
    }
    Ok(parent.depth + 1)
}

/// Groups comments by parent id, each group oldest first.
pub fn group_children(nodes: Vec<comment::Model>) -> HashMap<i64, Vec<comment::Model>> {
    let mut children: HashMap<i64, Vec<comment::Model>> = HashMap::new();
    for node in nodes {
        if let Some(parent_id) = node.parent_id {
            children.entry(parent_id).or_default().push(node);
        }
    }
    for group in children.values_mut() {
        group.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    }
    children
}

/// Everything needed to render comments with their approved reply trees.
struct RenderContext {
    children: HashMap<i64, Vec<comment::Model>>,
    authors: HashMap<i64, user::Model>,
    articles: HashMap<i64, Uuid>,
    public_ids: HashMap<i64, Uuid>,
    liked: HashSet<i64>,
}

impl RenderContext {
    fn render(&self, c: &comment::Model) -> CommentResponse {
        let replies: Vec<CommentResponse> = self
            .children
            .get(&c.id)
            .map(|kids| kids.iter().map(|k| self.render(k)).collect())
            .unwrap_or_default();

        let author = match self.authors.get(&c.author_id) {
            Some(u) => CommentAuthor {
                id: u.public_id,
                username: u.username.clone(),
                full_name: full_name(u),
                avatar: u.avatar.clone(),
            },
            None => CommentAuthor {
                id: Uuid::nil(),
                username: "unknown".to_string(),
                full_name: "unknown".to_string(),
                avatar: None,
            },
        };

        CommentResponse {
            id: c.public_id,
            article: self.articles.get(&c.article_id).copied().unwrap_or_else(Uuid::nil),
            parent: c.parent_id.and_then(|p| self.public_ids.get(&p).copied()),
            author,
            content: c.content.clone(),
            depth: c.depth,
            can_reply: c.can_reply(),
            is_approved: c.is_approved,
            is_spam: c.is_spam,
            is_edited: c.is_edited,
            like_count: c.like_count,
            is_liked: self.liked.contains(&c.id),
            reply_count: replies.len(),
            replies,
            created_at: c.created_at,
            updated_at: c.updated_at,
            edited_at: c.edited_at,
        }
    }
}

pub struct CommentService;

impl CommentService {
    pub async fn create_comment(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        payload: CreateCommentRequest,
        client: &ClientInfo,
    ) -> AppResult<CommentResponse> {
        policy.authorize(actor, Action::Create, &Resource::Comments)?;

        let target = article::Entity::find()
            .filter(article::Column::PublicId.eq(payload.article))
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("ARTICLE_NOT_FOUND", "Article not found"))?;
        if !target.is_published() {
            return Err(AppError::validation("ARTICLE_NOT_PUBLISHED", "Comments are only allowed on published articles"));
        }
        if !target.allow_comments {
            return Err(AppError::validation("COMMENTS_DISABLED", "Comments are disabled for this article"));
        }

        let (parent_id, depth) = match payload.parent {
            None => (None, 0),
            Some(parent_public_id) => {
                let parent = comment::Entity::find()
                    .filter(comment::Column::PublicId.eq(parent_public_id))
                    .one(db)
                    .await?
                    .ok_or_else(|| AppError::validation("PARENT_NOT_FOUND", "Parent comment not found"))?;
                if parent.article_id != target.id {
                    return Err(AppError::validation(
                        "PARENT_ARTICLE_MISMATCH",
                        "Parent comment belongs to a different article",
                    ));
                }
                (Some(parent.id), reply_depth(&parent)?)
            }
        };

        let auto_approve = policy.is_allowed(actor, Action::Moderate, &Resource::Comments);
        let now = Utc::now();
        let saved = comment::ActiveModel {
            id: NotSet,
            public_id: Set(Uuid::now_v7()),
            article_id: Set(target.id),
            author_id: Set(actor.id),
            parent_id: Set(parent_id),
            depth: Set(depth),
            content: Set(payload.content.trim().to_string()),
            is_approved: Set(auto_approve),
            is_spam: Set(false),
            is_edited: Set(false),
            like_count: Set(0),
            ip_address: Set(Some(client.ip.clone())),
            user_agent: Set(client.user_agent.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            edited_at: Set(None),
        }
        .insert(db)
        .await?;

        tracing::info!(
            "Comment {} created on article {} (approved={})",
            saved.public_id,
            target.public_id,
            auto_approve
        );
        Self::render_one(db, Some(actor), saved).await
    }

    pub async fn get_comment(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        viewer: Option<&CurrentUser>,
        public_id: Uuid,
    ) -> AppResult<CommentResponse> {
        let found = Self::find_visible(db, policy, viewer, public_id).await?;
        Self::render_one(db, viewer, found).await
    }

    pub async fn list_comments(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        viewer: Option<&CurrentUser>,
        params: CommentFilterParams,
    ) -> AppResult<Paginated<CommentResponse>> {
        let (page, limit) = page_window(params.page, params.limit);
        let moderator = viewer.is_some_and(|u| policy.is_allowed(u, Action::Moderate, &Resource::Comments));

        let mut query = comment::Entity::find();
        if moderator {
            if let Some(approved) = params.is_approved {
                query = query.filter(comment::Column::IsApproved.eq(approved));
            }
        } else {
            query = query
                .filter(comment::Column::IsApproved.eq(true))
                .filter(comment::Column::IsSpam.eq(false));
        }
        if let Some(article_id) = params.article {
            query = query.filter(
                comment::Column::ArticleId.in_subquery(
                    article::Entity::find()
                        .select_only()
                        .column(article::Column::Id)
                        .filter(article::Column::PublicId.eq(article_id))
                        .into_query(),
                ),
            );
        }
        if let Some(parent_id) = params.parent {
            query = query.filter(
                comment::Column::ParentId.in_subquery(
                    comment::Entity::find()
                        .select_only()
                        .column(comment::Column::Id)
                        .filter(comment::Column::PublicId.eq(parent_id))
                        .into_query(),
                ),
            );
        }
        if params.roots_only == Some(true) {
            query = query.filter(comment::Column::ParentId.is_null());
        }

        query = match params.ordering.unwrap_or_default() {
            CommentOrdering::CreatedAsc => query.order_by_asc(comment::Column::CreatedAt),
            CommentOrdering::CreatedDesc => query.order_by_desc(comment::Column::CreatedAt),
            CommentOrdering::LikesAsc => query.order_by_asc(comment::Column::LikeCount),
            CommentOrdering::LikesDesc => query.order_by_desc(comment::Column::LikeCount),
        }
        .order_by_asc(comment::Column::Id);

        let paginator = query.paginate(db, limit);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;

        Ok(Paginated {
            items: Self::render_many(db, viewer, rows).await?,
            meta: PaginationMeta::new(total, page, limit),
        })
    }

    /// Approved root comments of an article, each with its approved replies.
    /// Unpublished articles have no public thread.
    pub async fn list_article_comments(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        viewer: Option<&CurrentUser>,
        article_id: Uuid,
    ) -> AppResult<Vec<CommentResponse>> {
        let target = ArticleService::find_visible(db, policy, viewer, article_id).await?;
        if !target.is_published() {
            return Ok(Vec::new());
        }

        let roots = comment::Entity::find()
            .filter(comment::Column::ArticleId.eq(target.id))
            .filter(comment::Column::ParentId.is_null())
            .filter(comment::Column::IsApproved.eq(true))
            .filter(comment::Column::IsSpam.eq(false))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(db)
            .await?;

        Self::render_many(db, viewer, roots).await
    }

    pub async fn update_comment(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        public_id: Uuid,
        payload: UpdateCommentRequest,
    ) -> AppResult<CommentResponse> {
        let existing = Self::find_by_public_id(db, public_id).await?;
        policy.authorize(actor, Action::Update, &Resource::Comment { author_id: existing.author_id })?;

        let txn = db.begin().await?;
        let now = Utc::now();
        let author_id = existing.author_id;
        let mut active: comment::ActiveModel = existing.into();
        active.content = Set(payload.content.trim().to_string());
        active.is_edited = Set(true);
        active.edited_at = Set(Some(now));
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        if author_id != actor.id {
            ModerationService::log_action(&txn, &updated, actor.id, ModerationAction::Edited, None).await?;
        }
        txn.commit().await?;

        Self::render_one(db, Some(actor), updated).await
    }

    /// Removes a comment and, through the foreign key cascade, its replies.
    pub async fn delete_comment(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        public_id: Uuid,
    ) -> AppResult<()> {
        let existing = Self::find_by_public_id(db, public_id).await?;
        policy.authorize(actor, Action::Delete, &Resource::Comment { author_id: existing.author_id })?;

        let txn = db.begin().await?;
        if existing.author_id != actor.id {
            ModerationService::log_action(&txn, &existing, actor.id, ModerationAction::Deleted, None).await?;
        }
        comment::Entity::delete_by_id(existing.id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!("Comment {} deleted by {}", existing.public_id, actor.public_id);
        Ok(())
    }

    pub async fn find_by_public_id<C: ConnectionTrait>(conn: &C, public_id: Uuid) -> AppResult<comment::Model> {
        comment::Entity::find()
            .filter(comment::Column::PublicId.eq(public_id))
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("COMMENT_NOT_FOUND", "Comment not found"))
    }

    /// Approved comments are public; pending or spam ones are visible to
    /// their author and to moderators only.
    pub async fn find_visible(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        viewer: Option<&CurrentUser>,
        public_id: Uuid,
    ) -> AppResult<comment::Model> {
        let found = Self::find_by_public_id(db, public_id).await?;
        if found.is_approved && !found.is_spam {
            return Ok(found);
        }
        let allowed = viewer.is_some_and(|u| {
            u.id == found.author_id || policy.is_allowed(u, Action::Moderate, &Resource::Comments)
        });
        if allowed {
            Ok(found)
        } else {
            Err(AppError::not_found("COMMENT_NOT_FOUND", "Comment not found"))
        }
    }

    pub async fn render_one<C: ConnectionTrait>(
        conn: &C,
        viewer: Option<&CurrentUser>,
        c: comment::Model,
    ) -> AppResult<CommentResponse> {
        let mut rendered = Self::render_many(conn, viewer, vec![c]).await?;
        rendered
            .pop()
            .ok_or_else(|| AppError::internal("Comment rendering produced no output"))
    }

    /// Renders `focus` in order, attaching each comment's approved replies.
    pub async fn render_many<C: ConnectionTrait>(
        conn: &C,
        viewer: Option<&CurrentUser>,
        focus: Vec<comment::Model>,
    ) -> AppResult<Vec<CommentResponse>> {
        if focus.is_empty() {
            return Ok(Vec::new());
        }

        let article_ids: Vec<i64> = focus
            .iter()
            .map(|c| c.article_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let thread = comment::Entity::find()
            .filter(comment::Column::ArticleId.is_in(article_ids.clone()))
            .filter(comment::Column::IsApproved.eq(true))
            .filter(comment::Column::IsSpam.eq(false))
            .filter(comment::Column::ParentId.is_not_null())
            .all(conn)
            .await?;

        let mut public_ids: HashMap<i64, Uuid> = focus
            .iter()
            .chain(thread.iter())
            .map(|c| (c.id, c.public_id))
            .collect();

        let missing_parents: Vec<i64> = focus
            .iter()
            .filter_map(|c| c.parent_id)
            .filter(|p| !public_ids.contains_key(p))
            .collect();
        if !missing_parents.is_empty() {
            let parents: Vec<(i64, Uuid)> = comment::Entity::find()
                .select_only()
                .column(comment::Column::Id)
                .column(comment::Column::PublicId)
                .filter(comment::Column::Id.is_in(missing_parents))
                .into_tuple()
                .all(conn)
                .await?;
            public_ids.extend(parents);
        }

        let author_ids: Vec<i64> = focus
            .iter()
            .chain(thread.iter())
            .map(|c| c.author_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let authors = UserRepository::find_by_ids(conn, author_ids).await?;

        let articles: HashMap<i64, Uuid> = article::Entity::find()
            .select_only()
            .column(article::Column::Id)
            .column(article::Column::PublicId)
            .filter(article::Column::Id.is_in(article_ids))
            .into_tuple::<(i64, Uuid)>()
            .all(conn)
            .await?
            .into_iter()
            .collect();

        let all_ids: Vec<i64> = public_ids.keys().copied().collect();
        let liked = EngagementService::liked_comment_ids(conn, viewer, &all_ids).await?;

        let ctx = RenderContext {
            children: group_children(thread),
            authors,
            articles,
            public_ids,
            liked,
        };
        Ok(focus.iter().map(|c| ctx.render(c)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn node(id: i64, parent: Option<i64>, depth: i32, minute: i64) -> comment::Model {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap() + Duration::minutes(minute);
        comment::Model {
            id,
            public_id: Uuid::now_v7(),
            article_id: 1,
            author_id: 1,
            parent_id: parent,
            depth,
            content: format!("comment {}", id),
            is_approved: true,
            is_spam: false,
            is_edited: false,
            like_count: 0,
            ip_address: None,
            user_agent: None,
            created_at: at,
            updated_at: at,
            edited_at: None,
        }
    }

    #[test]
    fn reply_depth_stops_at_max() {
        assert_eq!(reply_depth(&node(1, None, 0, 0)).unwrap(), 1);
        assert_eq!(reply_depth(&node(2, Some(1), MAX_DEPTH - 1, 0)).unwrap(), MAX_DEPTH);
        let err = reply_depth(&node(3, Some(2), MAX_DEPTH, 0)).unwrap_err();
        assert_eq!(err.code(), "COMMENT_DEPTH_EXCEEDED");
    }

    #[test]
    fn can_reply_matches_depth_limit() {
        assert!(node(1, None, 0, 0).can_reply());
        assert!(!node(1, None, MAX_DEPTH, 0).can_reply());
    }

    #[test]
    fn children_are_grouped_oldest_first() {
        let grouped = group_children(vec![
            node(1, None, 0, 0),
            node(3, Some(1), 1, 5),
            node(2, Some(1), 1, 1),
            node(4, Some(2), 2, 2),
        ]);
        let under_root: Vec<i64> = grouped[&1].iter().map(|c| c.id).collect();
        assert_eq!(under_root, vec![2, 3]);
        assert_eq!(grouped[&2].len(), 1);
        assert!(!grouped.contains_key(&4));
    }
}
