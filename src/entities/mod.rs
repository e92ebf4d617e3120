pub mod article;
pub mod article_like;
pub mod article_tag;
pub mod article_view;
pub mod comment;
pub mod comment_like;
pub mod comment_moderation_log;
pub mod comment_report;
pub mod tag;
pub mod token_blacklist;
pub mod user;
