use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::user::Role;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Totals {
    pub articles: u64,
    pub views: i64,
    pub likes: i64,
    pub shares: i64,
    pub comments: u64,
    /// (likes + comments) / views * 100, two decimals.
    pub engagement_rate: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MonthlyBucket {
    /// `YYYY-MM`
    pub month: String,
    pub articles: u64,
    pub views: i64,
    pub likes: i64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TopArticle {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub view_count: i32,
    pub like_count: i32,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TagStat {
    pub name: String,
    pub slug: String,
    pub article_count: i64,
    pub total_views: i64,
    pub total_likes: i64,
}

/// Aggregates over published articles, optionally restricted to one author.
#[derive(Debug, Serialize)]
pub struct AnalyticsReport {
    pub totals: Totals,
    pub articles_last_30_days: u64,
    pub monthly: Vec<MonthlyBucket>,
    pub top_articles: Vec<TopArticle>,
    pub recent_articles: Vec<TopArticle>,
    pub top_tags: Vec<TagStat>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RoleCount {
    pub role: Role,
    pub count: i64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ActiveAuthor {
    pub id: Uuid,
    pub username: String,
    pub published_articles: i64,
}

#[derive(Debug, Serialize)]
pub struct SiteAnalyticsReport {
    #[serde(flatten)]
    pub report: AnalyticsReport,
    pub total_users: u64,
    pub users_by_role: Vec<RoleCount>,
    pub most_active_authors: Vec<ActiveAuthor>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DailyViews {
    pub date: NaiveDate,
    pub views: u64,
}

#[derive(Debug, Serialize)]
pub struct RecentComment {
    pub id: Uuid,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ArticleAnalytics {
    pub id: Uuid,
    pub title: String,
    pub view_count: i32,
    pub like_count: i32,
    pub share_count: i32,
    pub comment_count: u64,
    pub engagement_rate: f64,
    pub unique_ips: u64,
    pub unique_users: u64,
    pub daily_views: Vec<DailyViews>,
    pub recent_comments: Vec<RecentComment>,
}

#[derive(Debug, Serialize)]
pub struct ModerationBacklog {
    pub pending_comments: u64,
    pub spam_comments: u64,
    pub open_reports: u64,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub role: Role,
    pub my_stats: Totals,
    pub my_drafts: u64,
    pub recent_articles: Vec<TopArticle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation: Option<ModerationBacklog>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site: Option<Totals>,
}
