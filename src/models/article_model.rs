use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::article::ArticleStatus;

#[derive(Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validator_utils::validate_required"))]
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: String,

    #[validate(custom(function = "crate::utils::validator_utils::validate_slug"))]
    #[validate(length(max = 200))]
    pub slug: Option<String>,
    pub excerpt: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "crate::utils::validator_utils::validate_required"))]
    pub content: String,

    #[serde(default = "default_status")]
    pub status: ArticleStatus,

    /// Tag public ids.
    pub tags: Option<Vec<Uuid>>,

    #[validate(length(max = 60))]
    pub meta_title: Option<String>,
    #[validate(length(max = 160))]
    pub meta_description: Option<String>,
    #[validate(length(max = 60))]
    pub og_title: Option<String>,
    #[validate(length(max = 160))]
    pub og_description: Option<String>,
    #[validate(url)]
    pub og_image: Option<String>,
    #[validate(url)]
    pub featured_image: Option<String>,
    #[validate(length(max = 200))]
    pub featured_image_alt: Option<String>,

    pub allow_comments: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
}

fn default_status() -> ArticleStatus {
    ArticleStatus::Draft
}

#[derive(Deserialize, Validate, Default)]
pub struct UpdateArticleRequest {
    #[validate(custom(function = "crate::utils::validator_utils::validate_required"))]
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(custom(function = "crate::utils::validator_utils::validate_slug"))]
    #[validate(length(max = 200))]
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    #[validate(custom(function = "crate::utils::validator_utils::validate_required"))]
    pub content: Option<String>,
    pub status: Option<ArticleStatus>,
    pub tags: Option<Vec<Uuid>>,
    #[validate(length(max = 60))]
    pub meta_title: Option<String>,
    #[validate(length(max = 160))]
    pub meta_description: Option<String>,
    #[validate(length(max = 60))]
    pub og_title: Option<String>,
    #[validate(length(max = 160))]
    pub og_description: Option<String>,
    #[validate(url)]
    pub og_image: Option<String>,
    #[validate(url)]
    pub featured_image: Option<String>,
    #[validate(length(max = 200))]
    pub featured_image_alt: Option<String>,
    pub allow_comments: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Clone)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct TagDetailResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: String,
    pub is_active: bool,
    /// Published articles carrying this tag.
    pub article_count: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Validate)]
pub struct CreateTagRequest {
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validator_utils::validate_required"))]
    #[validate(length(max = 50, message = "Tag name must be at most 50 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = "crate::utils::validator_utils::validate_hex_color"))]
    pub color: Option<String>,
}

#[derive(Deserialize, Validate, Default)]
pub struct UpdateTagRequest {
    #[validate(custom(function = "crate::utils::validator_utils::validate_required"))]
    #[validate(length(max = 50))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "crate::utils::validator_utils::validate_hex_color"))]
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Clone)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ArticleSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub status: ArticleStatus,
    pub author: AuthorSummary,
    pub tags: Vec<TagResponse>,
    pub featured_image: Option<String>,
    pub featured_image_alt: Option<String>,
    pub view_count: i32,
    pub like_count: i32,
    pub share_count: i32,
    pub comment_count: u64,
    pub reading_time: u32,
    pub is_featured: bool,
    pub is_pinned: bool,
    /// Whether the requesting user has liked the article.
    pub is_liked: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SeoFields {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub summary: ArticleSummary,
    pub content: String,
    pub allow_comments: bool,
    pub seo: SeoFields,
    pub related: Vec<RelatedArticle>,
}

#[derive(Debug, Serialize)]
pub struct RelatedArticle {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum ArticleOrdering {
    #[serde(rename = "published_at")]
    PublishedAsc,
    #[default]
    #[serde(rename = "-published_at")]
    PublishedDesc,
    #[serde(rename = "created_at")]
    CreatedAsc,
    #[serde(rename = "-created_at")]
    CreatedDesc,
    #[serde(rename = "view_count")]
    ViewsAsc,
    #[serde(rename = "-view_count")]
    ViewsDesc,
    #[serde(rename = "like_count")]
    LikesAsc,
    #[serde(rename = "-like_count")]
    LikesDesc,
    #[serde(rename = "title")]
    TitleAsc,
    #[serde(rename = "-title")]
    TitleDesc,
}

#[derive(Deserialize, Validate, Default)]
pub struct ArticleFilterParams {
    #[validate(range(min = 1))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
    pub status: Option<ArticleStatus>,
    /// Tag slug.
    pub tag: Option<String>,
    /// Author username.
    pub author: Option<String>,
    pub is_featured: Option<bool>,
    pub is_pinned: Option<bool>,
    pub search: Option<String>,
    pub ordering: Option<ArticleOrdering>,
}

/// Curated article lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleFeed {
    Featured,
    Pinned,
    Popular,
    Recent,
}

#[derive(Debug, Serialize)]
pub struct LikeToggleResponse {
    pub liked: bool,
    pub like_count: i32,
}

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub share_count: i32,
}
