pub mod analytics_service;
pub mod article_service;
pub mod auth_service;
pub mod comment_service;
pub mod engagement_service;
pub mod moderation_service;
pub mod tag_service;
pub mod user_service;
