pub mod analytics_model;
pub mod article_model;
pub mod auth_model;
pub mod comment_model;
pub mod user_model;
