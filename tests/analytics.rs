mod common;

use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use tsuzuri::entities::article::{self, ArticleStatus};
use tsuzuri::entities::user::Role;
use tsuzuri::models::article_model::CreateTagRequest;
use tsuzuri::models::comment_model::CreateCommentRequest;
use tsuzuri::services::analytics_service::AnalyticsService;
use tsuzuri::services::article_service::ArticleService;
use tsuzuri::services::comment_service::CommentService;
use tsuzuri::services::tag_service::TagService;
use uuid::Uuid;

use common::{client, new_article, setup, TestApp};

async fn set_counters(app: &TestApp, id: Uuid, views: i32, likes: i32) -> anyhow::Result<()> {
    article::Entity::update_many()
        .col_expr(article::Column::ViewCount, Expr::value(views))
        .col_expr(article::Column::LikeCount, Expr::value(likes))
        .filter(article::Column::PublicId.eq(id))
        .exec(&app.db)
        .await?;
    Ok(())
}

#[tokio::test]
async fn article_engagement_rate() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let post = app.article(&editor, "Measured", ArticleStatus::Published).await?;
    let id = post.summary.id;

    for n in 0..5 {
        CommentService::create_comment(
            &app.db,
            &app.policy,
            &editor,
            CreateCommentRequest {
                article: id,
                parent: None,
                content: format!("note {}", n),
            },
            &client("10.0.0.9"),
        )
        .await?;
    }
    ArticleService::retrieve_article(&app.db, &app.policy, None, id, &client("10.0.0.1")).await?;
    ArticleService::retrieve_article(&app.db, &app.policy, Some(&editor), id, &client("10.0.0.1")).await?;
    set_counters(&app, id, 100, 10).await?;

    let stats = AnalyticsService::article_analytics(&app.db, &app.policy, &editor, id).await?;
    assert_eq!(stats.comment_count, 5);
    assert_eq!(stats.engagement_rate, 15.0);
    assert_eq!(stats.unique_ips, 1);
    assert_eq!(stats.unique_users, 1);
    assert_eq!(stats.daily_views.len(), 30);
    assert_eq!(stats.daily_views.last().map(|d| d.views), Some(2));
    assert_eq!(stats.recent_comments.len(), 5);
    Ok(())
}

#[tokio::test]
async fn article_analytics_is_for_owners_and_editors() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let reader = app.user("reader", Role::Reader).await?;
    let post = app.article(&editor, "Private numbers", ArticleStatus::Published).await?;

    let err = AnalyticsService::article_analytics(&app.db, &app.policy, &reader, post.summary.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "PERMISSION_DENIED");
    Ok(())
}

#[tokio::test]
async fn site_analytics_needs_admin() -> anyhow::Result<()> {
    let app = setup().await?;
    let admin = app.user("admin", Role::Admin).await?;
    let editor = app.user("editor", Role::Editor).await?;
    app.user("reader", Role::Reader).await?;
    let post = app.article(&editor, "Counted", ArticleStatus::Published).await?;
    app.article(&editor, "Not counted", ArticleStatus::Draft).await?;
    set_counters(&app, post.summary.id, 40, 4).await?;

    let err = AnalyticsService::site_analytics(&app.db, &app.policy, &editor).await.unwrap_err();
    assert_eq!(err.code(), "PERMISSION_DENIED");

    let site = AnalyticsService::site_analytics(&app.db, &app.policy, &admin).await?;
    assert_eq!(site.total_users, 3);
    assert_eq!(site.users_by_role.iter().map(|r| r.count).sum::<i64>(), 3);
    assert_eq!(site.report.totals.articles, 1);
    assert_eq!(site.report.totals.views, 40);
    assert_eq!(site.report.totals.engagement_rate, 10.0);
    assert_eq!(site.report.monthly.len(), 12);
    assert_eq!(site.most_active_authors[0].username, "editor");
    assert_eq!(site.most_active_authors[0].published_articles, 1);
    Ok(())
}

#[tokio::test]
async fn user_report_covers_only_their_articles() -> anyhow::Result<()> {
    let app = setup().await?;
    let mine = app.user("mine", Role::Editor).await?;
    let other = app.user("other", Role::Editor).await?;
    let a = app.article(&mine, "One", ArticleStatus::Published).await?;
    app.article(&mine, "Two", ArticleStatus::Published).await?;
    app.article(&other, "Three", ArticleStatus::Published).await?;
    set_counters(&app, a.summary.id, 7, 1).await?;

    let report = AnalyticsService::report(&app.db, Some(mine.id), Utc::now()).await?;
    assert_eq!(report.totals.articles, 2);
    assert_eq!(report.totals.views, 7);
    assert_eq!(report.articles_last_30_days, 2);
    assert_eq!(report.top_articles[0].id, a.summary.id);
    assert_eq!(report.monthly.last().map(|m| m.articles), Some(2));

    let later = AnalyticsService::report(&app.db, Some(mine.id), Utc::now() + Duration::days(60)).await?;
    assert_eq!(later.articles_last_30_days, 0);
    Ok(())
}

#[tokio::test]
async fn tag_ranking_and_monthly_sums() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let mut tag_ids = Vec::new();
    for name in ["Axum", "Rust"] {
        let tag = TagService::create_tag(
            &app.db,
            &app.policy,
            &editor,
            CreateTagRequest {
                name: name.into(),
                description: None,
                color: None,
            },
        )
        .await?;
        tag_ids.push(tag.id);
    }
    let (axum, rust) = (tag_ids[0], tag_ids[1]);

    let tagged = |title: &str, status: ArticleStatus, tags: Vec<Uuid>| {
        let mut req = new_article(title, status);
        req.tags = Some(tags);
        req
    };
    let only_rust = ArticleService::create_article(
        &app.db,
        &app.policy,
        &editor,
        tagged("Ownership", ArticleStatus::Published, vec![rust]),
    )
    .await?;
    let both = ArticleService::create_article(
        &app.db,
        &app.policy,
        &editor,
        tagged("Extractors", ArticleStatus::Published, vec![rust, axum]),
    )
    .await?;
    let draft = ArticleService::create_article(
        &app.db,
        &app.policy,
        &editor,
        tagged("Unfinished", ArticleStatus::Draft, vec![rust, axum]),
    )
    .await?;
    set_counters(&app, only_rust.summary.id, 10, 2).await?;
    set_counters(&app, both.summary.id, 30, 5).await?;
    set_counters(&app, draft.summary.id, 1000, 100).await?;

    let report = AnalyticsService::report(&app.db, Some(editor.id), Utc::now()).await?;

    // more articles ranks first even though the name sorts later
    let ranked: Vec<(&str, i64, i64, i64)> = report
        .top_tags
        .iter()
        .map(|t| (t.name.as_str(), t.article_count, t.total_views, t.total_likes))
        .collect();
    assert_eq!(ranked, vec![("Rust", 2, 40, 7), ("Axum", 1, 30, 5)]);
    assert_eq!(report.top_tags[0].slug, "rust");

    let current = report.monthly.last().cloned();
    assert_eq!(current.as_ref().map(|m| m.articles), Some(2));
    assert_eq!(current.as_ref().map(|m| m.views), Some(40));
    assert_eq!(current.as_ref().map(|m| m.likes), Some(7));
    Ok(())
}

#[tokio::test]
async fn dashboard_sections_follow_role() -> anyhow::Result<()> {
    let app = setup().await?;
    let admin = app.user("admin", Role::Admin).await?;
    let editor = app.user("editor", Role::Editor).await?;
    let reader = app.user("reader", Role::Reader).await?;
    app.article(&editor, "Draft one", ArticleStatus::Draft).await?;
    let post = app.article(&editor, "Live", ArticleStatus::Published).await?;
    CommentService::create_comment(
        &app.db,
        &app.policy,
        &reader,
        CreateCommentRequest {
            article: post.summary.id,
            parent: None,
            content: "awaiting review".into(),
        },
        &client("10.0.0.1"),
    )
    .await?;

    let mine = AnalyticsService::dashboard(&app.db, &app.policy, &reader).await?;
    assert!(mine.moderation.is_none());
    assert!(mine.site.is_none());

    let desk = AnalyticsService::dashboard(&app.db, &app.policy, &editor).await?;
    assert_eq!(desk.my_drafts, 1);
    assert_eq!(desk.recent_articles.len(), 2);
    assert_eq!(desk.moderation.as_ref().map(|m| m.pending_comments), Some(1));
    assert!(desk.site.is_none());

    let top = AnalyticsService::dashboard(&app.db, &app.policy, &admin).await?;
    assert!(top.moderation.is_some());
    assert_eq!(top.site.map(|s| s.articles), Some(1));
    Ok(())
}
