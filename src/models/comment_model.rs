use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::comment_moderation_log::ModerationAction;
use crate::entities::comment_report::ReportReason;

#[derive(Deserialize, Validate)]
pub struct CreateCommentRequest {
    /// Article public id.
    pub article: Uuid,
    /// Parent comment public id, absent for a root comment.
    pub parent: Option<Uuid>,
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validator_utils::validate_required"))]
    #[validate(length(max = 10000, message = "Comment is too long"))]
    pub content: String,
}

#[derive(Deserialize, Validate)]
pub struct UpdateCommentRequest {
    #[serde(default)]
    #[validate(custom(function = "crate::utils::validator_utils::validate_required"))]
    #[validate(length(max = 10000, message = "Comment is too long"))]
    pub content: String,
}

#[derive(Deserialize, Validate)]
pub struct ReportCommentRequest {
    pub reason: ReportReason,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

#[derive(Deserialize, Validate, Default)]
pub struct ModerationRequest {
    #[validate(length(max = 2000))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum CommentOrdering {
    #[default]
    #[serde(rename = "created_at")]
    CreatedAsc,
    #[serde(rename = "-created_at")]
    CreatedDesc,
    #[serde(rename = "like_count")]
    LikesAsc,
    #[serde(rename = "-like_count")]
    LikesDesc,
}

#[derive(Deserialize, Validate, Default)]
pub struct CommentFilterParams {
    #[validate(range(min = 1))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
    /// Article public id.
    pub article: Option<Uuid>,
    /// Parent public id.
    pub parent: Option<Uuid>,
    /// Only root comments.
    pub roots_only: Option<bool>,
    /// Honoured for moderators only.
    pub is_approved: Option<bool>,
    pub ordering: Option<CommentOrdering>,
}

#[derive(Debug, Serialize, Clone)]
pub struct CommentAuthor {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub article: Uuid,
    pub parent: Option<Uuid>,
    pub author: CommentAuthor,
    pub content: String,
    pub depth: i32,
    pub can_reply: bool,
    pub is_approved: bool,
    pub is_spam: bool,
    pub is_edited: bool,
    pub like_count: i32,
    pub is_liked: bool,
    pub reply_count: usize,
    pub replies: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CommentLikeResponse {
    pub liked: bool,
    pub like_count: i32,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub id: Uuid,
    pub comment: Uuid,
    pub reporter: String,
    pub reason: ReportReason,
    pub description: Option<String>,
    pub is_resolved: bool,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Paging for the pending and spam queues.
#[derive(Deserialize, Validate, Default)]
pub struct QueueParams {
    #[validate(range(min = 1))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
}

#[derive(Deserialize, Validate, Default)]
pub struct ReportFilterParams {
    #[validate(range(min = 1))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
    pub is_resolved: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ModerationLogResponse {
    pub comment: Uuid,
    pub moderator: String,
    pub action: ModerationAction,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
