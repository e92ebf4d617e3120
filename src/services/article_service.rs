use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::auth::{Action, PolicyEngine, Resource};
use crate::entities::article::{self, ArticleStatus, Entity as Article};
use crate::entities::{article_tag, comment, tag, user};
use crate::models::article_model::*;
use crate::models::auth_model::CurrentUser;
use crate::models::user_model::full_name;
use crate::services::engagement_service::EngagementService;
use crate::utils::api_response::{page_window, Paginated, PaginationMeta};
use crate::utils::app_error::{is_unique_violation, AppError, AppResult};
use crate::utils::client_info::ClientInfo;
use crate::utils::text_utils::{non_blank, reading_time, slug_or, truncate_chars};

const FEED_SIZE: u64 = 10;
const RELATED_SIZE: u64 = 5;
const META_TITLE_MAX: usize = 60;
const META_DESCRIPTION_MAX: usize = 160;

pub struct ArticleService;

impl ArticleService {
    /// Rows the viewer may list: everything for editors, published plus
    /// their own for other users, published only for anonymous visitors.
    pub fn visibility_filter(policy: &PolicyEngine, viewer: Option<&CurrentUser>) -> Condition {
        let published = article::Column::Status.eq(ArticleStatus::Published);
        match viewer {
            None => Condition::all().add(published),
            Some(u) if policy.is_allowed(u, Action::Read, &Resource::Articles) => Condition::all(),
            Some(u) => Condition::any()
                .add(published)
                .add(article::Column::AuthorId.eq(u.id)),
        }
    }

    pub fn can_view(policy: &PolicyEngine, viewer: Option<&CurrentUser>, a: &article::Model) -> bool {
        a.is_published()
            || viewer.is_some_and(|u| {
                policy.is_allowed(u, Action::Read, &Resource::Article { author_id: a.author_id })
            })
    }

    pub async fn create_article(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        payload: CreateArticleRequest,
    ) -> AppResult<ArticleDetail> {
        policy.authorize(actor, Action::Create, &Resource::Article { author_id: actor.id })?;
        if payload.status.requires_publish_right() {
            policy.authorize(actor, Action::Publish, &Resource::Article { author_id: actor.id })?;
        }
        if payload.status == ArticleStatus::Scheduled && payload.published_at.is_none() {
            return Err(AppError::validation(
                "SCHEDULE_REQUIRES_DATE",
                "Scheduled articles need a published_at date",
            ));
        }

        let txn = db.begin().await?;

        let title = payload.title.trim().to_string();
        let slug = Self::resolve_slug(&txn, payload.slug, &title, None).await?;
        let tag_ids = match payload.tags {
            Some(ids) => Self::resolve_tags(&txn, ids).await?,
            None => Vec::new(),
        };

        let excerpt = non_blank(payload.excerpt);
        let meta_title = non_blank(payload.meta_title).or_else(|| Some(truncate_chars(&title, META_TITLE_MAX)));
        let meta_description = non_blank(payload.meta_description)
            .or_else(|| excerpt.as_deref().map(|e| truncate_chars(e, META_DESCRIPTION_MAX)));
        let published_at = match payload.status {
            ArticleStatus::Published => Some(payload.published_at.unwrap_or_else(Utc::now)),
            _ => payload.published_at,
        };

        let now = Utc::now();
        let saved = article::ActiveModel {
            id: NotSet,
            public_id: Set(Uuid::now_v7()),
            title: Set(title),
            slug: Set(slug),
            excerpt: Set(excerpt),
            content: Set(payload.content),
            status: Set(payload.status),
            meta_title: Set(meta_title),
            meta_description: Set(meta_description),
            og_title: Set(non_blank(payload.og_title)),
            og_description: Set(non_blank(payload.og_description)),
            og_image: Set(non_blank(payload.og_image)),
            featured_image: Set(non_blank(payload.featured_image)),
            featured_image_alt: Set(non_blank(payload.featured_image_alt)),
            view_count: Set(0),
            like_count: Set(0),
            share_count: Set(0),
            allow_comments: Set(payload.allow_comments.unwrap_or(true)),
            is_featured: Set(false),
            is_pinned: Set(false),
            author_id: Set(actor.id),
            published_at: Set(published_at),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(Self::slug_conflict)?;

        Self::replace_tags(&txn, saved.id, tag_ids).await?;
        txn.commit().await?;

        tracing::info!("Article {} created by {} ({:?})", saved.public_id, actor.public_id, saved.status);
        Self::detail(db, Some(actor), saved).await
    }

    /// Detail without recording a view.
    pub async fn get_article(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        viewer: Option<&CurrentUser>,
        public_id: Uuid,
    ) -> AppResult<ArticleDetail> {
        let found = Self::find_visible(db, policy, viewer, public_id).await?;
        Self::detail(db, viewer, found).await
    }

    /// Detail for a reader, counting the view.
    pub async fn retrieve_article(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        viewer: Option<&CurrentUser>,
        public_id: Uuid,
        client: &ClientInfo,
    ) -> AppResult<ArticleDetail> {
        let found = Self::find_visible(db, policy, viewer, public_id).await?;
        let found = Self::count_view(db, viewer, found, client).await?;
        Self::detail(db, viewer, found).await
    }

    /// Public page by slug. Only published articles resolve here.
    pub async fn get_published_by_slug(
        db: &DatabaseConnection,
        viewer: Option<&CurrentUser>,
        slug: &str,
        client: &ClientInfo,
    ) -> AppResult<ArticleDetail> {
        let found = Article::find()
            .filter(article::Column::Slug.eq(slug))
            .filter(article::Column::Status.eq(ArticleStatus::Published))
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("ARTICLE_NOT_FOUND", "Article not found"))?;
        let found = Self::count_view(db, viewer, found, client).await?;
        Self::detail(db, viewer, found).await
    }

    pub async fn list_articles(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        viewer: Option<&CurrentUser>,
        params: ArticleFilterParams,
    ) -> AppResult<Paginated<ArticleSummary>> {
        let query = Article::find().filter(Self::visibility_filter(policy, viewer));
        Self::filtered_page(db, viewer, query, params).await
    }

    /// Published articles only, pinned ones first.
    pub async fn list_published(
        db: &DatabaseConnection,
        viewer: Option<&CurrentUser>,
        mut params: ArticleFilterParams,
    ) -> AppResult<Paginated<ArticleSummary>> {
        params.status = None;
        let query = Article::find()
            .filter(article::Column::Status.eq(ArticleStatus::Published))
            .order_by_desc(article::Column::IsPinned);
        Self::filtered_page(db, viewer, query, params).await
    }

    pub async fn list_feed(
        db: &DatabaseConnection,
        viewer: Option<&CurrentUser>,
        feed: ArticleFeed,
    ) -> AppResult<Vec<ArticleSummary>> {
        let mut query = Article::find().filter(article::Column::Status.eq(ArticleStatus::Published));
        query = match feed {
            ArticleFeed::Featured => query
                .filter(article::Column::IsFeatured.eq(true))
                .order_by_desc(article::Column::PublishedAt),
            ArticleFeed::Pinned => query
                .filter(article::Column::IsPinned.eq(true))
                .order_by_desc(article::Column::PublishedAt),
            ArticleFeed::Popular => query
                .order_by_desc(article::Column::ViewCount)
                .order_by_desc(article::Column::LikeCount),
            ArticleFeed::Recent => query.order_by_desc(article::Column::PublishedAt),
        };

        let rows = query
            .order_by_desc(article::Column::Id)
            .limit(FEED_SIZE)
            .find_also_related(user::Entity)
            .all(db)
            .await?;
        Self::summaries(db, viewer, rows).await
    }

    pub async fn update_article(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        public_id: Uuid,
        payload: UpdateArticleRequest,
    ) -> AppResult<ArticleDetail> {
        let existing = Self::find_by_public_id(db, public_id).await?;
        let owner = Resource::Article { author_id: existing.author_id };
        policy.authorize(actor, Action::Update, &owner)?;

        let next_status = payload.status.unwrap_or(existing.status);
        if next_status != existing.status && next_status.requires_publish_right() {
            policy.authorize(actor, Action::Publish, &owner)?;
        }
        let next_published_at = payload.published_at.or(existing.published_at);
        if next_status == ArticleStatus::Scheduled && next_published_at.is_none() {
            return Err(AppError::validation(
                "SCHEDULE_REQUIRES_DATE",
                "Scheduled articles need a published_at date",
            ));
        }

        let txn = db.begin().await?;
        let article_id = existing.id;
        let slug = match payload.slug {
            Some(s) => Some(Self::resolve_slug(&txn, Some(s), &existing.title, Some(article_id)).await?),
            None => None,
        };
        let tag_ids = match payload.tags {
            Some(ids) => Some(Self::resolve_tags(&txn, ids).await?),
            None => None,
        };

        let mut active: article::ActiveModel = existing.into();
        if let Some(t) = payload.title {
            let t = t.trim().to_string();
            if active.meta_title.as_ref().is_none() {
                active.meta_title = Set(Some(truncate_chars(&t, META_TITLE_MAX)));
            }
            active.title = Set(t);
        }
        if let Some(s) = slug {
            active.slug = Set(s);
        }
        if let Some(e) = payload.excerpt {
            let e = non_blank(Some(e));
            if active.meta_description.as_ref().is_none() {
                active.meta_description = Set(e.as_deref().map(|v| truncate_chars(v, META_DESCRIPTION_MAX)));
            }
            active.excerpt = Set(e);
        }
        if let Some(c) = payload.content {
            active.content = Set(c);
        }
        if let Some(v) = payload.meta_title {
            active.meta_title = Set(non_blank(Some(v)));
        }
        if let Some(v) = payload.meta_description {
            active.meta_description = Set(non_blank(Some(v)));
        }
        if let Some(v) = payload.og_title {
            active.og_title = Set(non_blank(Some(v)));
        }
        if let Some(v) = payload.og_description {
            active.og_description = Set(non_blank(Some(v)));
        }
        if let Some(v) = payload.og_image {
            active.og_image = Set(non_blank(Some(v)));
        }
        if let Some(v) = payload.featured_image {
            active.featured_image = Set(non_blank(Some(v)));
        }
        if let Some(v) = payload.featured_image_alt {
            active.featured_image_alt = Set(non_blank(Some(v)));
        }
        if let Some(v) = payload.allow_comments {
            active.allow_comments = Set(v);
        }

        // First transition to published stamps the publication time.
        let published_at = match (next_status, next_published_at) {
            (ArticleStatus::Published, None) => Some(Utc::now()),
            (_, at) => at,
        };
        active.status = Set(next_status);
        active.published_at = Set(published_at);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&txn).await.map_err(Self::slug_conflict)?;
        if let Some(ids) = tag_ids {
            Self::replace_tags(&txn, article_id, ids).await?;
        }
        txn.commit().await?;

        Self::detail(db, Some(actor), updated).await
    }

    pub async fn delete_article(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        public_id: Uuid,
    ) -> AppResult<()> {
        let existing = Self::find_by_public_id(db, public_id).await?;
        policy.authorize(actor, Action::Delete, &Resource::Article { author_id: existing.author_id })?;

        Article::delete_by_id(existing.id).exec(db).await?;
        tracing::info!("Article {} deleted by {}", existing.public_id, actor.public_id);
        Ok(())
    }

    pub async fn toggle_featured(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        public_id: Uuid,
    ) -> AppResult<ArticleDetail> {
        Self::toggle_flag(db, policy, actor, public_id, article::Column::IsFeatured).await
    }

    pub async fn toggle_pinned(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        public_id: Uuid,
    ) -> AppResult<ArticleDetail> {
        Self::toggle_flag(db, policy, actor, public_id, article::Column::IsPinned).await
    }

    async fn toggle_flag(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        public_id: Uuid,
        flag: article::Column,
    ) -> AppResult<ArticleDetail> {
        let existing = Self::find_by_public_id(db, public_id).await?;
        policy.authorize(actor, Action::Feature, &Resource::Article { author_id: existing.author_id })?;

        Article::update_many()
            .col_expr(flag, Expr::col(flag).not())
            .filter(article::Column::Id.eq(existing.id))
            .exec(db)
            .await?;

        let updated = Self::find_by_public_id(db, public_id).await?;
        Self::detail(db, Some(actor), updated).await
    }

    pub async fn find_by_public_id<C: ConnectionTrait>(conn: &C, public_id: Uuid) -> AppResult<article::Model> {
        Article::find()
            .filter(article::Column::PublicId.eq(public_id))
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("ARTICLE_NOT_FOUND", "Article not found"))
    }

    /// Article lookup that hides what the viewer may not see behind a 404.
    pub async fn find_visible(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        viewer: Option<&CurrentUser>,
        public_id: Uuid,
    ) -> AppResult<article::Model> {
        let found = Self::find_by_public_id(db, public_id).await?;
        if Self::can_view(policy, viewer, &found) {
            Ok(found)
        } else {
            Err(AppError::not_found("ARTICLE_NOT_FOUND", "Article not found"))
        }
    }

    async fn count_view(
        db: &DatabaseConnection,
        viewer: Option<&CurrentUser>,
        found: article::Model,
        client: &ClientInfo,
    ) -> AppResult<article::Model> {
        let txn = db.begin().await?;
        let counted = EngagementService::record_view(&txn, found.id, viewer.map(|u| u.id), client).await?;
        txn.commit().await?;
        if !counted {
            return Ok(found);
        }
        Article::find_by_id(found.id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("ARTICLE_NOT_FOUND", "Article not found"))
    }

    async fn filtered_page(
        db: &DatabaseConnection,
        viewer: Option<&CurrentUser>,
        mut query: Select<article::Entity>,
        params: ArticleFilterParams,
    ) -> AppResult<Paginated<ArticleSummary>> {
        let (page, limit) = page_window(params.page, params.limit);

        if let Some(status) = params.status {
            query = query.filter(article::Column::Status.eq(status));
        }
        if let Some(featured) = params.is_featured {
            query = query.filter(article::Column::IsFeatured.eq(featured));
        }
        if let Some(pinned) = params.is_pinned {
            query = query.filter(article::Column::IsPinned.eq(pinned));
        }
        if let Some(tag_slug) = non_blank(params.tag) {
            let tagged = article_tag::Entity::find()
                .select_only()
                .column(article_tag::Column::ArticleId)
                .inner_join(tag::Entity)
                .filter(tag::Column::Slug.eq(tag_slug))
                .into_query();
            query = query.filter(article::Column::Id.in_subquery(tagged));
        }
        if let Some(username) = non_blank(params.author) {
            let author = user::Entity::find()
                .select_only()
                .column(user::Column::Id)
                .filter(user::Column::Username.eq(username))
                .into_query();
            query = query.filter(article::Column::AuthorId.in_subquery(author));
        }
        if let Some(search) = non_blank(params.search) {
            query = query.filter(
                Condition::any()
                    .add(article::Column::Title.contains(&search))
                    .add(article::Column::Excerpt.contains(&search))
                    .add(article::Column::Content.contains(&search)),
            );
        }

        query = match params.ordering.unwrap_or_default() {
            ArticleOrdering::PublishedAsc => query.order_by_asc(article::Column::PublishedAt),
            ArticleOrdering::PublishedDesc => query.order_by_desc(article::Column::PublishedAt),
            ArticleOrdering::CreatedAsc => query.order_by_asc(article::Column::CreatedAt),
            ArticleOrdering::CreatedDesc => query.order_by_desc(article::Column::CreatedAt),
            ArticleOrdering::ViewsAsc => query.order_by_asc(article::Column::ViewCount),
            ArticleOrdering::ViewsDesc => query.order_by_desc(article::Column::ViewCount),
            ArticleOrdering::LikesAsc => query.order_by_asc(article::Column::LikeCount),
            ArticleOrdering::LikesDesc => query.order_by_desc(article::Column::LikeCount),
            ArticleOrdering::TitleAsc => query.order_by_asc(article::Column::Title),
            ArticleOrdering::TitleDesc => query.order_by_desc(article::Column::Title),
        };
        query = query.order_by_desc(article::Column::Id);

        let paginator = query.find_also_related(user::Entity).paginate(db, limit);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;

        Ok(Paginated {
            items: Self::summaries(db, viewer, rows).await?,
            meta: PaginationMeta::new(total, page, limit),
        })
    }

    /// A concurrent writer can take the slug between the lookup and the write.
    pub fn slug_conflict(err: DbErr) -> AppError {
        if is_unique_violation(&err) {
            AppError::validation("SLUG_TAKEN", "Slug is already in use")
        } else {
            AppError::from(err)
        }
    }

    /// Explicit slugs must be free; derived ones get a numeric suffix.
    async fn resolve_slug<C: ConnectionTrait>(
        conn: &C,
        requested: Option<String>,
        title: &str,
        exclude: Option<i64>,
    ) -> AppResult<String> {
        if let Some(slug) = non_blank(requested) {
            if Self::slug_taken(conn, &slug, exclude).await? {
                return Err(AppError::validation(
                    "SLUG_TAKEN",
                    format!("Slug '{}' is already in use", slug),
                ));
            }
            return Ok(slug);
        }

        let fallback = format!("article-{}", &Uuid::new_v4().simple().to_string()[..8]);
        let base = truncate_chars(&slug_or(title, &fallback), 190);
        let mut candidate = base.clone();
        let mut n = 2;
        while Self::slug_taken(conn, &candidate, exclude).await? {
            candidate = format!("{}-{}", base, n);
            n += 1;
        }
        Ok(candidate)
    }

    async fn slug_taken<C: ConnectionTrait>(conn: &C, slug: &str, exclude: Option<i64>) -> AppResult<bool> {
        let mut query = Article::find().filter(article::Column::Slug.eq(slug));
        if let Some(id) = exclude {
            query = query.filter(article::Column::Id.ne(id));
        }
        Ok(query.count(conn).await? > 0)
    }

    /// Maps tag public ids to row ids; any unknown id fails the request.
    async fn resolve_tags<C: ConnectionTrait>(conn: &C, mut ids: Vec<Uuid>) -> AppResult<Vec<i64>> {
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let found = tag::Entity::find()
            .filter(tag::Column::PublicId.is_in(ids.clone()))
            .all(conn)
            .await?;
        if let Some(missing) = ids.iter().find(|id| !found.iter().any(|t| t.public_id == **id)) {
            return Err(AppError::validation(
                "TAG_NOT_FOUND",
                format!("Tag with ID {} not found", missing),
            ));
        }
        Ok(found.into_iter().map(|t| t.id).collect())
    }

    async fn replace_tags<C: ConnectionTrait>(conn: &C, article_id: i64, tag_ids: Vec<i64>) -> AppResult<()> {
        article_tag::Entity::delete_many()
            .filter(article_tag::Column::ArticleId.eq(article_id))
            .exec(conn)
            .await?;
        if !tag_ids.is_empty() {
            article_tag::Entity::insert_many(tag_ids.into_iter().map(|t| article_tag::link(article_id, t)))
                .exec(conn)
                .await?;
        }
        Ok(())
    }

    async fn load_tags<C: ConnectionTrait>(conn: &C, article_ids: &[i64]) -> AppResult<HashMap<i64, Vec<TagResponse>>> {
        let mut by_article: HashMap<i64, Vec<TagResponse>> = HashMap::new();
        if article_ids.is_empty() {
            return Ok(by_article);
        }
        let rows = article_tag::Entity::find()
            .filter(article_tag::Column::ArticleId.is_in(article_ids.iter().copied()))
            .find_also_related(tag::Entity)
            .all(conn)
            .await?;
        for (link, t) in rows {
            if let Some(t) = t {
                by_article.entry(link.article_id).or_default().push(TagResponse {
                    id: t.public_id,
                    name: t.name,
                    slug: t.slug,
                    color: t.color,
                });
            }
        }
        for tags in by_article.values_mut() {
            tags.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Ok(by_article)
    }

    async fn approved_comment_counts<C: ConnectionTrait>(conn: &C, article_ids: &[i64]) -> AppResult<HashMap<i64, u64>> {
        if article_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(i64, i64)> = comment::Entity::find()
            .select_only()
            .column(comment::Column::ArticleId)
            .column_as(Expr::col(comment::Column::Id).count(), "count")
            .filter(comment::Column::ArticleId.is_in(article_ids.iter().copied()))
            .filter(comment::Column::IsApproved.eq(true))
            .group_by(comment::Column::ArticleId)
            .into_tuple()
            .all(conn)
            .await?;
        Ok(rows.into_iter().map(|(id, n)| (id, n.max(0) as u64)).collect())
    }

    async fn summaries<C: ConnectionTrait>(
        conn: &C,
        viewer: Option<&CurrentUser>,
        rows: Vec<(article::Model, Option<user::Model>)>,
    ) -> AppResult<Vec<ArticleSummary>> {
        let ids: Vec<i64> = rows.iter().map(|(a, _)| a.id).collect();
        let mut tags = Self::load_tags(conn, &ids).await?;
        let comment_counts = Self::approved_comment_counts(conn, &ids).await?;
        let liked = EngagementService::liked_article_ids(conn, viewer, &ids).await?;

        rows.into_iter()
            .map(|(a, author)| {
                let author = author.ok_or_else(|| AppError::internal("Article has no author"))?;
                let article_tags = tags.remove(&a.id).unwrap_or_default();
                let comments = comment_counts.get(&a.id).copied().unwrap_or(0);
                let is_liked = liked.contains(&a.id);
                Ok(Self::summary(&a, &author, article_tags, comments, is_liked))
            })
            .collect()
    }

    fn summary(
        a: &article::Model,
        author: &user::Model,
        tags: Vec<TagResponse>,
        comment_count: u64,
        is_liked: bool,
    ) -> ArticleSummary {
        ArticleSummary {
            id: a.public_id,
            title: a.title.clone(),
            slug: a.slug.clone(),
            excerpt: a.excerpt.clone(),
            status: a.status,
            author: AuthorSummary {
                id: author.public_id,
                username: author.username.clone(),
                full_name: full_name(author),
                avatar: author.avatar.clone(),
            },
            tags,
            featured_image: a.featured_image.clone(),
            featured_image_alt: a.featured_image_alt.clone(),
            view_count: a.view_count,
            like_count: a.like_count,
            share_count: a.share_count,
            comment_count,
            reading_time: reading_time(&a.content),
            is_featured: a.is_featured,
            is_pinned: a.is_pinned,
            is_liked,
            published_at: a.published_at,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }

    async fn detail(db: &DatabaseConnection, viewer: Option<&CurrentUser>, a: article::Model) -> AppResult<ArticleDetail> {
        let author = user::Entity::find_by_id(a.author_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::internal("Article has no author"))?;
        let related = Self::related(db, &a).await?;

        let ids = [a.id];
        let tags = Self::load_tags(db, &ids).await?.remove(&a.id).unwrap_or_default();
        let comments = Self::approved_comment_counts(db, &ids).await?.get(&a.id).copied().unwrap_or(0);
        let is_liked = EngagementService::liked_article_ids(db, viewer, &ids).await?.contains(&a.id);

        Ok(ArticleDetail {
            summary: Self::summary(&a, &author, tags, comments, is_liked),
            seo: SeoFields {
                meta_title: a.meta_title.clone(),
                meta_description: a.meta_description.clone(),
                og_title: a.og_title.clone(),
                og_description: a.og_description.clone(),
                og_image: a.og_image.clone(),
            },
            allow_comments: a.allow_comments,
            content: a.content,
            related,
        })
    }

    /// Published articles sharing a tag, newest first.
    async fn related(db: &DatabaseConnection, a: &article::Model) -> AppResult<Vec<RelatedArticle>> {
        let tag_ids: Vec<i64> = article_tag::Entity::find()
            .select_only()
            .column(article_tag::Column::TagId)
            .filter(article_tag::Column::ArticleId.eq(a.id))
            .into_tuple()
            .all(db)
            .await?;
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sharing = article_tag::Entity::find()
            .select_only()
            .column(article_tag::Column::ArticleId)
            .filter(article_tag::Column::TagId.is_in(tag_ids))
            .into_query();

        let rows = Article::find()
            .filter(article::Column::Status.eq(ArticleStatus::Published))
            .filter(article::Column::Id.ne(a.id))
            .filter(article::Column::Id.in_subquery(sharing))
            .order_by_desc(article::Column::PublishedAt)
            .limit(RELATED_SIZE)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| RelatedArticle {
                id: r.public_id,
                title: r.title,
                slug: r.slug,
                excerpt: r.excerpt,
                published_at: r.published_at,
            })
            .collect())
    }
}
