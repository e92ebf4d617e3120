mod common;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::{NotSet, Set}, EntityTrait, PaginatorTrait};

use tsuzuri::entities::article_view;
use tsuzuri::entities::article::ArticleStatus;
use tsuzuri::entities::user::Role;
use tsuzuri::models::comment_model::CreateCommentRequest;
use tsuzuri::services::article_service::ArticleService;
use tsuzuri::services::comment_service::CommentService;
use tsuzuri::services::engagement_service::EngagementService;

use common::{client, setup};

#[tokio::test]
async fn like_toggle_round_trips() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let reader = app.user("reader", Role::Reader).await?;
    let post = app.article(&editor, "Likeable", ArticleStatus::Published).await?;

    let first = EngagementService::toggle_article_like(&app.db, &app.policy, &reader, post.summary.id).await?;
    assert!(first.liked);
    assert_eq!(first.like_count, 1);

    let detail = ArticleService::get_article(&app.db, &app.policy, Some(&reader), post.summary.id).await?;
    assert!(detail.summary.is_liked);

    let second = EngagementService::toggle_article_like(&app.db, &app.policy, &reader, post.summary.id).await?;
    assert!(!second.liked);
    assert_eq!(second.like_count, 0);
    Ok(())
}

#[tokio::test]
async fn views_count_once_per_visitor() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let post = app.article(&editor, "Viewed", ArticleStatus::Published).await?;
    let id = post.summary.id;

    for ip in ["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.1"] {
        ArticleService::retrieve_article(&app.db, &app.policy, None, id, &client(ip)).await?;
    }
    let detail = ArticleService::get_article(&app.db, &app.policy, None, id).await?;
    assert_eq!(detail.summary.view_count, 3);

    // same address, but now signed in
    let seen = ArticleService::retrieve_article(&app.db, &app.policy, Some(&editor), id, &client("10.0.0.1")).await?;
    assert_eq!(seen.summary.view_count, 4);

    let model = ArticleService::find_by_public_id(&app.db, id).await?;
    let again = EngagementService::record_view(&app.db, model.id, Some(editor.id), &client("10.0.0.1")).await?;
    assert!(!again);
    Ok(())
}

#[tokio::test]
async fn duplicate_view_rows_are_rejected_by_the_visitor_index() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let post = app.article(&editor, "Viewed", ArticleStatus::Published).await?;
    let model = ArticleService::find_by_public_id(&app.db, post.summary.id).await?;

    let visitor = client("10.0.0.9");
    assert!(EngagementService::record_view(&app.db, model.id, None, &visitor).await?);
    assert!(!EngagementService::record_view(&app.db, model.id, None, &visitor).await?);

    // a second writer that skipped the upsert still cannot add a row
    let raw = article_view::ActiveModel {
        id: NotSet,
        article_id: Set(model.id),
        user_id: Set(None),
        ip_address: Set("10.0.0.9".into()),
        visitor_key: Set(article_view::visitor_key(None, "10.0.0.9")),
        user_agent: Set(None),
        created_at: Set(Utc::now()),
    };
    assert!(raw.insert(&app.db).await.is_err());

    assert_eq!(article_view::Entity::find().count(&app.db).await?, 1);
    let stored = ArticleService::find_by_public_id(&app.db, post.summary.id).await?;
    assert_eq!(stored.view_count, 1);
    Ok(())
}

#[tokio::test]
async fn shares_need_a_published_article() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let post = app.article(&editor, "Shareable", ArticleStatus::Published).await?;
    let draft = app.article(&editor, "Hidden", ArticleStatus::Draft).await?;

    EngagementService::share_article(&app.db, &app.policy, None, post.summary.id).await?;
    let shared = EngagementService::share_article(&app.db, &app.policy, None, post.summary.id).await?;
    assert_eq!(shared.share_count, 2);

    let err = EngagementService::share_article(&app.db, &app.policy, Some(&editor), draft.summary.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ARTICLE_NOT_PUBLISHED");

    let err = EngagementService::share_article(&app.db, &app.policy, None, draft.summary.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ARTICLE_NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn comment_likes_are_strict_and_togglable() -> anyhow::Result<()> {
    let app = setup().await?;
    let editor = app.user("editor", Role::Editor).await?;
    let reader = app.user("reader", Role::Reader).await?;
    let post = app.article(&editor, "Discussed", ArticleStatus::Published).await?;
    let c = CommentService::create_comment(
        &app.db,
        &app.policy,
        &editor,
        CreateCommentRequest {
            article: post.summary.id,
            parent: None,
            content: "pinned note".into(),
        },
        &client("10.0.0.1"),
    )
    .await?;

    let err = EngagementService::unlike_comment(&app.db, &app.policy, &reader, c.id).await.unwrap_err();
    assert_eq!(err.code(), "NOT_LIKED");

    let liked = EngagementService::like_comment(&app.db, &app.policy, &reader, c.id).await?;
    assert!(liked.liked);
    assert_eq!(liked.like_count, 1);

    let err = EngagementService::like_comment(&app.db, &app.policy, &reader, c.id).await.unwrap_err();
    assert_eq!(err.code(), "ALREADY_LIKED");

    let seen = CommentService::get_comment(&app.db, &app.policy, Some(&reader), c.id).await?;
    assert!(seen.is_liked);
    assert_eq!(seen.like_count, 1);

    let toggled = EngagementService::toggle_comment_like(&app.db, &app.policy, &reader, c.id).await?;
    assert!(!toggled.liked);
    assert_eq!(toggled.like_count, 0);

    let back = EngagementService::toggle_comment_like(&app.db, &app.policy, &reader, c.id).await?;
    assert!(back.liked);
    assert_eq!(back.like_count, 1);
    let off = EngagementService::toggle_comment_like(&app.db, &app.policy, &reader, c.id).await?;
    assert!(!off.liked);
    assert_eq!(off.like_count, 0);

    let err = EngagementService::unlike_comment(&app.db, &app.policy, &reader, c.id).await.unwrap_err();
    assert_eq!(err.code(), "NOT_LIKED");
    Ok(())
}
