use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::auth::{Action, PolicyEngine, Resource};
use crate::entities::article::{self, ArticleStatus, Entity as Article};
use crate::entities::user::{self, Role};
use crate::entities::{article_tag, article_view, comment, comment_report, tag};
use crate::models::analytics_model::*;
use crate::models::auth_model::CurrentUser;
use crate::repositories::user_repository::UserRepository;
use crate::services::article_service::ArticleService;
use crate::utils::app_error::AppResult;

const TRAILING_MONTHS: u32 = 12;
const DAILY_WINDOW: i64 = 30;
const TOP_ARTICLES: u64 = 5;
const RECENT_ARTICLES: u64 = 10;
const TOP_TAGS: u64 = 10;
const ACTIVE_AUTHORS: u64 = 10;
const RECENT_COMMENTS: u64 = 5;
const DASHBOARD_RECENT: u64 = 5;

/// Percentage of views that turned into a like or an approved comment.
pub fn engagement_rate(likes: i64, comments: i64, views: i64) -> f64 {
    let rate = (likes + comments) as f64 / views.max(1) as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

/// The last twelve calendar months as `(label, start, end)`, oldest first.
pub fn month_windows(now: DateTime<Utc>) -> Vec<(String, DateTime<Utc>, DateTime<Utc>)> {
    let Some(current) = NaiveDate::from_ymd_opt(now.year(), now.month(), 1) else {
        return Vec::new();
    };
    (0..TRAILING_MONTHS)
        .rev()
        .filter_map(|back| {
            let start = current.checked_sub_months(Months::new(back))?;
            let end = start.checked_add_months(Months::new(1))?;
            Some((
                start.format("%Y-%m").to_string(),
                start.and_hms_opt(0, 0, 0)?.and_utc(),
                end.and_hms_opt(0, 0, 0)?.and_utc(),
            ))
        })
        .collect()
}

/// One entry per day of the trailing window ending today, zero-filled.
pub fn daily_buckets(now: DateTime<Utc>, views: &[DateTime<Utc>]) -> Vec<DailyViews> {
    let today = now.date_naive();
    let mut buckets: BTreeMap<NaiveDate, u64> = (0..DAILY_WINDOW)
        .map(|back| (today - Duration::days(back), 0))
        .collect();
    for at in views {
        if let Some(n) = buckets.get_mut(&at.date_naive()) {
            *n += 1;
        }
    }
    buckets.into_iter().map(|(date, views)| DailyViews { date, views }).collect()
}

#[derive(Debug, FromQueryResult)]
struct TagRow {
    name: String,
    slug: String,
    article_count: i64,
    total_views: Option<i64>,
    total_likes: Option<i64>,
}

pub struct AnalyticsService;

impl AnalyticsService {
    /// Report over the caller's own published articles.
    pub async fn user_analytics(db: &DatabaseConnection, actor: &CurrentUser) -> AppResult<AnalyticsReport> {
        Self::report(db, Some(actor.id), Utc::now()).await
    }

    pub async fn site_analytics(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
    ) -> AppResult<SiteAnalyticsReport> {
        policy.authorize(actor, Action::ViewAnalytics, &Resource::Site)?;

        let report = Self::report(db, None, Utc::now()).await?;
        let total_users = user::Entity::find().count(db).await?;

        let by_role: Vec<(Role, i64)> = user::Entity::find()
            .select_only()
            .column(user::Column::Role)
            .column_as(Expr::col(user::Column::Id).count(), "count")
            .group_by(user::Column::Role)
            .into_tuple()
            .all(db)
            .await?;
        let mut users_by_role: Vec<RoleCount> = by_role
            .into_iter()
            .map(|(role, count)| RoleCount { role, count })
            .collect();
        users_by_role.sort_by(|a, b| a.role.as_str().cmp(b.role.as_str()));

        Ok(SiteAnalyticsReport {
            report,
            total_users,
            users_by_role,
            most_active_authors: Self::most_active_authors(db).await?,
        })
    }

    pub async fn article_analytics(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        public_id: Uuid,
    ) -> AppResult<ArticleAnalytics> {
        Self::article_analytics_at(db, policy, actor, public_id, Utc::now()).await
    }

    pub async fn article_analytics_at(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
        public_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<ArticleAnalytics> {
        let target = ArticleService::find_by_public_id(db, public_id).await?;
        policy.authorize(actor, Action::ViewAnalytics, &Resource::Article { author_id: target.author_id })?;

        let since = (now.date_naive() - Duration::days(DAILY_WINDOW - 1))
            .and_hms_opt(0, 0, 0)
            .map(|d| d.and_utc())
            .unwrap_or(now);
        let view_times: Vec<DateTime<Utc>> = article_view::Entity::find()
            .select_only()
            .column(article_view::Column::CreatedAt)
            .filter(article_view::Column::ArticleId.eq(target.id))
            .filter(article_view::Column::CreatedAt.gte(since))
            .into_tuple()
            .all(db)
            .await?;

        let unique_ips = article_view::Entity::find()
            .select_only()
            .column(article_view::Column::IpAddress)
            .distinct()
            .filter(article_view::Column::ArticleId.eq(target.id))
            .count(db)
            .await?;
        let unique_users = article_view::Entity::find()
            .select_only()
            .column(article_view::Column::UserId)
            .distinct()
            .filter(article_view::Column::ArticleId.eq(target.id))
            .filter(article_view::Column::UserId.is_not_null())
            .count(db)
            .await?;

        let approved = comment::Entity::find()
            .filter(comment::Column::ArticleId.eq(target.id))
            .filter(comment::Column::IsApproved.eq(true));
        let comment_count = approved.clone().count(db).await?;
        let recent_comments = approved
            .order_by_desc(comment::Column::CreatedAt)
            .limit(RECENT_COMMENTS)
            .find_also_related(user::Entity)
            .all(db)
            .await?
            .into_iter()
            .map(|(c, author)| RecentComment {
                id: c.public_id,
                author: author.map(|u| u.username).unwrap_or_default(),
                content: c.content,
                created_at: c.created_at,
            })
            .collect();

        Ok(ArticleAnalytics {
            id: target.public_id,
            title: target.title,
            view_count: target.view_count,
            like_count: target.like_count,
            share_count: target.share_count,
            comment_count,
            engagement_rate: engagement_rate(target.like_count as i64, comment_count as i64, target.view_count as i64),
            unique_ips,
            unique_users,
            daily_views: daily_buckets(now, &view_times),
            recent_comments,
        })
    }

    pub async fn dashboard(
        db: &DatabaseConnection,
        policy: &PolicyEngine,
        actor: &CurrentUser,
    ) -> AppResult<DashboardResponse> {
        let my_stats = Self::totals(db, Some(actor.id)).await?;
        let my_drafts = Article::find()
            .filter(article::Column::AuthorId.eq(actor.id))
            .filter(article::Column::Status.eq(ArticleStatus::Draft))
            .count(db)
            .await?;
        let recent_articles = Article::find()
            .filter(article::Column::AuthorId.eq(actor.id))
            .order_by_desc(article::Column::CreatedAt)
            .limit(DASHBOARD_RECENT)
            .all(db)
            .await?
            .into_iter()
            .map(Self::top_article)
            .collect();

        let moderation = if policy.is_allowed(actor, Action::Moderate, &Resource::Comments) {
            Some(Self::moderation_backlog(db).await?)
        } else {
            None
        };
        let site = if policy.is_allowed(actor, Action::ViewAnalytics, &Resource::Site) {
            Some(Self::totals(db, None).await?)
        } else {
            None
        };

        Ok(DashboardResponse {
            role: actor.role,
            my_stats,
            my_drafts,
            recent_articles,
            moderation,
            site,
        })
    }

    pub async fn moderation_backlog(db: &DatabaseConnection) -> AppResult<ModerationBacklog> {
        let pending_comments = comment::Entity::find()
            .filter(comment::Column::IsApproved.eq(false))
            .filter(comment::Column::IsSpam.eq(false))
            .count(db)
            .await?;
        let spam_comments = comment::Entity::find()
            .filter(comment::Column::IsSpam.eq(true))
            .count(db)
            .await?;
        let open_reports = comment_report::Entity::find()
            .filter(comment_report::Column::IsResolved.eq(false))
            .count(db)
            .await?;
        Ok(ModerationBacklog {
            pending_comments,
            spam_comments,
            open_reports,
        })
    }

    /// Shared report body; `author` narrows it to one user's articles.
    pub async fn report(db: &DatabaseConnection, author: Option<i64>, now: DateTime<Utc>) -> AppResult<AnalyticsReport> {
        let totals = Self::totals(db, author).await?;

        let articles_last_30_days = Self::published(author)
            .filter(article::Column::PublishedAt.gte(now - Duration::days(DAILY_WINDOW)))
            .count(db)
            .await?;

        let top_articles = Self::published(author)
            .order_by_desc(article::Column::ViewCount)
            .order_by_desc(article::Column::Id)
            .limit(TOP_ARTICLES)
            .all(db)
            .await?
            .into_iter()
            .map(Self::top_article)
            .collect();
        let recent_articles = Self::published(author)
            .order_by_desc(article::Column::PublishedAt)
            .order_by_desc(article::Column::Id)
            .limit(RECENT_ARTICLES)
            .all(db)
            .await?
            .into_iter()
            .map(Self::top_article)
            .collect();

        let mut monthly = Vec::with_capacity(TRAILING_MONTHS as usize);
        for (month, start, end) in month_windows(now) {
            let in_month = Self::published(author)
                .filter(article::Column::PublishedAt.gte(start))
                .filter(article::Column::PublishedAt.lt(end));
            let articles = in_month.clone().count(db).await?;
            let (views, likes, _) = Self::sums(db, in_month).await?;
            monthly.push(MonthlyBucket {
                month,
                articles,
                views,
                likes,
            });
        }

        Ok(AnalyticsReport {
            totals,
            articles_last_30_days,
            monthly,
            top_articles,
            recent_articles,
            top_tags: Self::top_tags(db, author).await?,
        })
    }

    async fn totals(db: &DatabaseConnection, author: Option<i64>) -> AppResult<Totals> {
        let articles = Self::published(author).count(db).await?;
        let (views, likes, shares) = Self::sums(db, Self::published(author)).await?;

        let article_ids = Self::published(author)
            .select_only()
            .column(article::Column::Id)
            .into_query();
        let comments = comment::Entity::find()
            .filter(comment::Column::IsApproved.eq(true))
            .filter(comment::Column::ArticleId.in_subquery(article_ids))
            .count(db)
            .await?;

        Ok(Totals {
            articles,
            views,
            likes,
            shares,
            comments,
            engagement_rate: engagement_rate(likes, comments as i64, views),
        })
    }

    fn published(author: Option<i64>) -> Select<article::Entity> {
        let query = Article::find().filter(article::Column::Status.eq(ArticleStatus::Published));
        match author {
            Some(id) => query.filter(article::Column::AuthorId.eq(id)),
            None => query,
        }
    }

    /// (views, likes, shares) summed over the selected articles.
    async fn sums(db: &DatabaseConnection, query: Select<article::Entity>) -> AppResult<(i64, i64, i64)> {
        let row: Option<(Option<i64>, Option<i64>, Option<i64>)> = query
            .select_only()
            .column_as(Expr::col(article::Column::ViewCount).sum(), "views")
            .column_as(Expr::col(article::Column::LikeCount).sum(), "likes")
            .column_as(Expr::col(article::Column::ShareCount).sum(), "shares")
            .into_tuple()
            .one(db)
            .await?;
        let (views, likes, shares) = row.unwrap_or_default();
        Ok((views.unwrap_or(0), likes.unwrap_or(0), shares.unwrap_or(0)))
    }

    /// Tags ranked by how many of the selected published articles carry them.
    async fn top_tags(db: &DatabaseConnection, author: Option<i64>) -> AppResult<Vec<TagStat>> {
        let mut query = article_tag::Entity::find()
            .select_only()
            .column(tag::Column::Name)
            .column(tag::Column::Slug)
            .column_as(Expr::col((article_tag::Entity, article_tag::Column::ArticleId)).count(), "article_count")
            .column_as(Expr::col((article::Entity, article::Column::ViewCount)).sum(), "total_views")
            .column_as(Expr::col((article::Entity, article::Column::LikeCount)).sum(), "total_likes")
            .inner_join(tag::Entity)
            .inner_join(article::Entity)
            .filter(article::Column::Status.eq(ArticleStatus::Published));
        if let Some(id) = author {
            query = query.filter(article::Column::AuthorId.eq(id));
        }

        let rows = query
            .group_by(tag::Column::Id)
            .group_by(tag::Column::Name)
            .group_by(tag::Column::Slug)
            .order_by(Expr::cust("article_count"), Order::Desc)
            .order_by_asc(tag::Column::Name)
            .limit(TOP_TAGS)
            .into_model::<TagRow>()
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| TagStat {
                name: r.name,
                slug: r.slug,
                article_count: r.article_count,
                total_views: r.total_views.unwrap_or(0),
                total_likes: r.total_likes.unwrap_or(0),
            })
            .collect())
    }

    async fn most_active_authors(db: &DatabaseConnection) -> AppResult<Vec<ActiveAuthor>> {
        let ranked: Vec<(i64, i64)> = Self::published(None)
            .select_only()
            .column(article::Column::AuthorId)
            .column_as(Expr::col(article::Column::Id).count(), "published")
            .group_by(article::Column::AuthorId)
            .order_by(Expr::cust("published"), Order::Desc)
            .order_by_asc(article::Column::AuthorId)
            .limit(ACTIVE_AUTHORS)
            .into_tuple()
            .all(db)
            .await?;

        let users = UserRepository::find_by_ids(db, ranked.iter().map(|(id, _)| *id).collect()).await?;
        Ok(ranked
            .into_iter()
            .filter_map(|(id, published_articles)| {
                users.get(&id).map(|u| ActiveAuthor {
                    id: u.public_id,
                    username: u.username.clone(),
                    published_articles,
                })
            })
            .collect())
    }

    fn top_article(a: article::Model) -> TopArticle {
        TopArticle {
            id: a.public_id,
            title: a.title,
            slug: a.slug,
            view_count: a.view_count,
            like_count: a.like_count,
            published_at: a.published_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn engagement_rate_rounds_to_two_decimals() {
        assert_eq!(engagement_rate(10, 5, 100), 15.0);
        assert_eq!(engagement_rate(1, 0, 3), 33.33);
        assert_eq!(engagement_rate(2, 1, 0), 300.0);
    }

    #[test]
    fn month_windows_are_calendar_months_ending_now() {
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap();
        let windows = month_windows(now);
        assert_eq!(windows.len(), 12);
        assert_eq!(windows[0].0, "2025-04");
        assert_eq!(windows[11].0, "2026-03");
        assert_eq!(windows[10].1, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(windows[10].2, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn daily_buckets_zero_fill_and_drop_outside_window() {
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 8, 0, 0).unwrap();
        let views = vec![
            Utc.with_ymd_and_hms(2026, 5, 10, 1, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 5, 10, 7, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 4, 20, 7, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        ];
        let buckets = daily_buckets(now, &views);
        assert_eq!(buckets.len(), 30);
        assert_eq!(buckets.last().map(|b| b.views), Some(2));
        assert_eq!(buckets.iter().map(|b| b.views).sum::<u64>(), 3);
        assert_eq!(buckets[0].date, NaiveDate::from_ymd_opt(2026, 4, 11).unwrap());
    }
}
