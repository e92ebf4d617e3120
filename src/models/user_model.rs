use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::user::{self, Role};

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub website: Option<String>,
    pub twitter: Option<String>,
    pub github: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pub fn full_name(user: &user::Model) -> String {
    let name = [user.first_name.as_deref(), user.last_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        user.username.clone()
    } else {
        name
    }
}

impl From<&user::Model> for UserResponse {
    fn from(u: &user::Model) -> Self {
        Self {
            id: u.public_id,
            username: u.username.clone(),
            email: u.email.clone(),
            role: u.role,
            is_active: u.is_active,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            full_name: full_name(u),
            bio: u.bio.clone(),
            avatar: u.avatar.clone(),
            website: u.website.clone(),
            twitter: u.twitter.clone(),
            github: u.github.clone(),
            last_login_at: u.last_login_at,
            created_at: u.created_at,
        }
    }
}

/// Public profile with authoring stats. Email is never exposed here.
#[derive(Debug, Serialize)]
pub struct PublicUserResponse {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub website: Option<String>,
    pub twitter: Option<String>,
    pub github: Option<String>,
    pub published_article_count: u64,
    pub approved_comment_count: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Validate, Default)]
pub struct UpdateProfileRequest {
    #[validate(custom(function = "crate::utils::validator_utils::validate_username"))]
    pub username: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    #[validate(length(max = 2000))]
    pub bio: Option<String>,
    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar: Option<String>,
    #[validate(url(message = "Website must be a valid URL"))]
    pub website: Option<String>,
    #[validate(length(max = 50))]
    pub twitter: Option<String>,
    #[validate(length(max = 50))]
    pub github: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

#[derive(Deserialize, Validate, Default)]
pub struct UserFilterParams {
    #[validate(range(min = 1))]
    pub page: Option<u64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}
