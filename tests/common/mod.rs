#![allow(dead_code)]

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use tsuzuri::auth::PolicyEngine;
use tsuzuri::entities::article::ArticleStatus;
use tsuzuri::entities::user::Role;
use tsuzuri::models::article_model::{ArticleDetail, CreateArticleRequest};
use tsuzuri::models::auth_model::CurrentUser;
use tsuzuri::repositories::user_repository::{NewUser, UserRepository};
use tsuzuri::services::article_service::ArticleService;
use tsuzuri::utils::client_info::ClientInfo;
use tsuzuri::utils::jwt_utils::JwtUtils;

pub struct TestApp {
    pub db: DatabaseConnection,
    pub policy: PolicyEngine,
    pub jwt: JwtUtils,
}

pub async fn setup() -> anyhow::Result<TestApp> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await?;
    Migrator::up(&db, None).await?;

    Ok(TestApp {
        db,
        policy: PolicyEngine::new().await?,
        jwt: JwtUtils::new("test-secret", 15, 7),
    })
}

impl TestApp {
    pub async fn user(&self, username: &str, role: Role) -> anyhow::Result<CurrentUser> {
        let created = UserRepository::create(
            &self.db,
            NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: "not-a-real-hash".to_string(),
                role,
                first_name: None,
                last_name: None,
            },
        )
        .await?;
        Ok(CurrentUser::from(&created))
    }

    pub async fn article(
        &self,
        author: &CurrentUser,
        title: &str,
        status: ArticleStatus,
    ) -> anyhow::Result<ArticleDetail> {
        let detail = ArticleService::create_article(&self.db, &self.policy, author, new_article(title, status)).await?;
        Ok(detail)
    }
}

pub fn new_article(title: &str, status: ArticleStatus) -> CreateArticleRequest {
    CreateArticleRequest {
        title: title.to_string(),
        slug: None,
        excerpt: Some(format!("About {}", title)),
        content: "Some words for the body of the article".to_string(),
        status,
        tags: None,
        meta_title: None,
        meta_description: None,
        og_title: None,
        og_description: None,
        og_image: None,
        featured_image: None,
        featured_image_alt: None,
        allow_comments: None,
        published_at: None,
    }
}

pub fn client(ip: &str) -> ClientInfo {
    ClientInfo::new(ip, Some("test-agent"))
}
